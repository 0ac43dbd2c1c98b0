// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The permission catalog: every permission the policy knows about.

use std::collections::HashMap;

use crate::error::{PermissionError, Result};
use crate::types::{Action, Permission, ResourceType};

/// Permission names shipped with Qeta.
pub mod names {
	pub const POST_READ: &str = "qeta.post.read";
	pub const POST_CREATE: &str = "qeta.post.create";
	pub const POST_EDIT: &str = "qeta.post.edit";
	pub const POST_DELETE: &str = "qeta.post.delete";

	pub const ANSWER_READ: &str = "qeta.answer.read";
	pub const ANSWER_CREATE: &str = "qeta.answer.create";
	pub const ANSWER_EDIT: &str = "qeta.answer.edit";
	pub const ANSWER_DELETE: &str = "qeta.answer.delete";

	pub const COMMENT_READ: &str = "qeta.comment.read";
	pub const COMMENT_CREATE: &str = "qeta.comment.create";
	pub const COMMENT_EDIT: &str = "qeta.comment.edit";
	pub const COMMENT_DELETE: &str = "qeta.comment.delete";

	pub const COLLECTION_READ: &str = "qeta.collection.read";
	pub const COLLECTION_CREATE: &str = "qeta.collection.create";
	pub const COLLECTION_EDIT: &str = "qeta.collection.edit";
	pub const COLLECTION_DELETE: &str = "qeta.collection.delete";

	pub const TAG_READ: &str = "qeta.tag.read";
	pub const TAG_CREATE: &str = "qeta.tag.create";
	pub const TAG_EDIT: &str = "qeta.tag.edit";
	pub const TAG_DELETE: &str = "qeta.tag.delete";
}

/// The default Qeta permissions.
///
/// `*.create` permissions are basic: there is no resource to check yet.
/// `*.edit` maps to [`Action::Update`].
pub fn qeta_permissions() -> Vec<Permission> {
	let mut permissions = Vec::with_capacity(ResourceType::ALL.len() * 4);
	for resource_type in ResourceType::ALL {
		let segment = resource_type.ref_segment();
		permissions.push(Permission::resource(
			format!("qeta.{segment}.read"),
			Action::Read,
			resource_type,
		));
		permissions.push(Permission::basic(
			format!("qeta.{segment}.create"),
			Action::Create,
		));
		permissions.push(Permission::resource(
			format!("qeta.{segment}.edit"),
			Action::Update,
			resource_type,
		));
		permissions.push(Permission::resource(
			format!("qeta.{segment}.delete"),
			Action::Delete,
			resource_type,
		));
	}
	permissions
}

/// Registered permissions, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct PermissionCatalog {
	permissions: HashMap<String, Permission>,
}

impl PermissionCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Catalog holding [`qeta_permissions`].
	pub fn qeta() -> Result<Self> {
		let mut catalog = Self::new();
		for permission in qeta_permissions() {
			catalog.register(permission)?;
		}
		Ok(catalog)
	}

	/// Adds a permission. Names must be unique.
	pub fn register(&mut self, permission: Permission) -> Result<()> {
		if self.permissions.contains_key(&permission.name) {
			return Err(PermissionError::DuplicatePermission(permission.name));
		}
		self.permissions.insert(permission.name.clone(), permission);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&Permission> {
		self.permissions.get(name)
	}

	/// Looks up a permission a policy author refers to by name.
	pub fn require(&self, name: &str) -> Result<&Permission> {
		self.get(name)
			.ok_or_else(|| PermissionError::UnknownPermission(name.to_string()))
	}

	/// True if `permission` is registered with exactly these attributes.
	pub fn contains(&self, permission: &Permission) -> bool {
		self.get(&permission.name) == Some(permission)
	}

	pub fn len(&self) -> usize {
		self.permissions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.permissions.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Permission> {
		self.permissions.values()
	}
}
