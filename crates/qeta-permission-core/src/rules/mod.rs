// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission rules: named, parameterized predicates over a resource.
//!
//! A rule has two faces:
//!
//! 1. [`PermissionRule::apply`] evaluates it against a loaded [`Resource`]
//! 2. [`PermissionRule::to_query`] projects it into a [`QueryFragment`] using
//!    only its parameters, so a data layer can filter without loading rows
//!
//! Each rule declares a concrete `Params` type. Parameters travel as JSON
//! inside [`crate::Condition`] and are checked against that type when a
//! condition is built through the [`RuleRegistry`].

pub mod builtin;
mod registry;

pub use builtin::{
	AuthorParams, EntityParams, HasEntities, HasTags, HasType, IsAuthor, TagParams, TypeParams,
	HAS_ENTITIES, HAS_TAGS, HAS_TYPE, IS_AUTHOR,
};
pub use registry::{RuleMetadata, RuleRegistry, RuleRegistryBuilder};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PermissionError, Result};
use crate::query::QueryFragment;
use crate::resource::Resource;
use crate::types::ResourceType;

/// A pure predicate over a single resource type.
pub trait PermissionRule: Send + Sync + 'static {
	type Params: Serialize + DeserializeOwned;

	fn name(&self) -> &'static str;

	fn description(&self) -> &'static str;

	fn resource_type(&self) -> ResourceType;

	/// Evaluates the rule. Called only with resources of
	/// [`PermissionRule::resource_type`].
	fn apply(&self, resource: &Resource, params: &Self::Params) -> bool;

	fn to_query(&self, params: &Self::Params) -> QueryFragment;
}

/// Object-safe view of a [`PermissionRule`] working on JSON parameters.
pub(crate) trait ErasedRule: Send + Sync {
	fn name(&self) -> &'static str;
	fn description(&self) -> &'static str;
	fn resource_type(&self) -> ResourceType;
	fn validate(&self, params: &Value) -> Result<()>;
	fn apply(&self, resource: &Resource, params: &Value) -> Result<bool>;
	fn to_query(&self, params: &Value) -> Result<QueryFragment>;
}

impl<R: PermissionRule> ErasedRule for R {
	fn name(&self) -> &'static str {
		PermissionRule::name(self)
	}

	fn description(&self) -> &'static str {
		PermissionRule::description(self)
	}

	fn resource_type(&self) -> ResourceType {
		PermissionRule::resource_type(self)
	}

	fn validate(&self, params: &Value) -> Result<()> {
		decode_params::<R>(self, params).map(|_| ())
	}

	fn apply(&self, resource: &Resource, params: &Value) -> Result<bool> {
		let params = decode_params::<R>(self, params)?;
		Ok(PermissionRule::apply(self, resource, &params))
	}

	fn to_query(&self, params: &Value) -> Result<QueryFragment> {
		let params = decode_params::<R>(self, params)?;
		Ok(PermissionRule::to_query(self, &params))
	}
}

fn decode_params<R: PermissionRule>(rule: &R, params: &Value) -> Result<R::Params> {
	R::Params::deserialize(params).map_err(|e| PermissionError::InvalidParams {
		rule: PermissionRule::name(rule).to_string(),
		message: e.to_string(),
	})
}
