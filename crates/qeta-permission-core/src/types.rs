// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core vocabulary for permission checks.
//!
//! - [`Action`]: the operation being attempted
//! - [`ResourceType`]: which kind of Qeta resource the permission targets
//! - [`Permission`]: a named `(action, resource type)` pair from the catalog
//! - [`Identity`]: the already-authenticated caller

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operations a permission can authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Create,
	Read,
	Update,
	Delete,
}

impl Action {
	/// Create and read are granted to every caller by the default policy.
	pub fn is_open(self) -> bool {
		matches!(self, Action::Create | Action::Read)
	}

	/// Update and delete require ownership of the resource.
	pub fn is_mutating(self) -> bool {
		matches!(self, Action::Update | Action::Delete)
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Action::Create => "create",
			Action::Read => "read",
			Action::Update => "update",
			Action::Delete => "delete",
		};
		f.write_str(s)
	}
}

/// Resource types protected by the permission engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceType {
	#[serde(rename = "qeta-post")]
	Post,
	#[serde(rename = "qeta-answer")]
	Answer,
	#[serde(rename = "qeta-comment")]
	Comment,
	#[serde(rename = "qeta-collection")]
	Collection,
	#[serde(rename = "qeta-tag")]
	Tag,
}

impl ResourceType {
	pub const ALL: [ResourceType; 5] = [
		ResourceType::Post,
		ResourceType::Answer,
		ResourceType::Comment,
		ResourceType::Collection,
		ResourceType::Tag,
	];

	/// Resource type string used by the permission framework.
	pub fn as_str(self) -> &'static str {
		match self {
			ResourceType::Post => "qeta-post",
			ResourceType::Answer => "qeta-answer",
			ResourceType::Comment => "qeta-comment",
			ResourceType::Collection => "qeta-collection",
			ResourceType::Tag => "qeta-tag",
		}
	}

	/// Segment used in `<namespace>:<type>:<id>` resource refs.
	pub fn ref_segment(self) -> &'static str {
		match self {
			ResourceType::Post => "post",
			ResourceType::Answer => "answer",
			ResourceType::Comment => "comment",
			ResourceType::Collection => "collection",
			ResourceType::Tag => "tag",
		}
	}

	/// Inverse of [`ResourceType::ref_segment`].
	pub fn from_ref_segment(segment: &str) -> Option<Self> {
		ResourceType::ALL
			.into_iter()
			.find(|rt| rt.ref_segment() == segment)
	}
}

impl fmt::Display for ResourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A permission registered in the [`crate::PermissionCatalog`].
///
/// Permissions without a resource type are basic permissions: they are not
/// checked against a particular resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
	pub name: String,
	pub action: Action,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub resource_type: Option<ResourceType>,
}

impl Permission {
	/// Creates a basic permission.
	pub fn basic(name: impl Into<String>, action: Action) -> Self {
		Self {
			name: name.into(),
			action,
			resource_type: None,
		}
	}

	/// Creates a permission scoped to a resource type.
	pub fn resource(name: impl Into<String>, action: Action, resource_type: ResourceType) -> Self {
		Self {
			name: name.into(),
			action,
			resource_type: Some(resource_type),
		}
	}
}

/// Opaque reference to an actor, e.g. `user:default/alice`.
///
/// Equality is exact string equality; no normalization happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorRef(String);

impl ActorRef {
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ActorRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ActorRef {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for ActorRef {
	fn from(value: String) -> Self {
		Self(value)
	}
}

/// Authenticated caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
	pub actor_ref: ActorRef,
	/// Group and ownership references the actor belongs to.
	#[serde(default)]
	pub ownership_refs: Vec<String>,
}

impl Identity {
	/// Creates an identity with no ownership references.
	pub fn new(actor_ref: impl Into<ActorRef>) -> Self {
		Self {
			actor_ref: actor_ref.into(),
			ownership_refs: Vec::new(),
		}
	}

	/// Builder: add an ownership reference.
	pub fn with_ownership_ref(mut self, ownership_ref: impl Into<String>) -> Self {
		self.ownership_refs.push(ownership_ref.into());
		self
	}

	/// The actor ref followed by every ownership ref.
	pub fn refs(&self) -> impl Iterator<Item = &str> {
		std::iter::once(self.actor_ref.as_str()).chain(self.ownership_refs.iter().map(String::as_str))
	}
}

/// Input to [`crate::PermissionPolicy::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyQuery {
	pub permission: Permission,
	pub identity: Option<Identity>,
}

impl PolicyQuery {
	pub fn new(permission: Permission, identity: Option<Identity>) -> Self {
		Self {
			permission,
			identity,
		}
	}

	/// Query for a caller without an identity.
	pub fn anonymous(permission: Permission) -> Self {
		Self::new(permission, None)
	}
}
