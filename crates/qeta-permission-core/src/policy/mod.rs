// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The default Qeta permission policy.

mod engine;
mod extension;

pub use engine::{PermissionPolicy, PermissionPolicyBuilder};
pub use extension::{Combine, ConditionProvider};

use std::collections::HashSet;

/// Tunables for [`PermissionPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
	/// Actor and group refs that bypass every other check.
	pub moderators: HashSet<String>,
	/// Whether callers without an identity may create and read.
	pub allow_anonymous: bool,
}

impl Default for PolicyConfig {
	fn default() -> Self {
		Self {
			moderators: HashSet::new(),
			allow_anonymous: true,
		}
	}
}

impl PolicyConfig {
	/// Builder: add a moderator ref.
	pub fn with_moderator(mut self, moderator: impl Into<String>) -> Self {
		self.moderators.insert(moderator.into());
		self
	}

	/// Builder: set anonymous access.
	pub fn with_anonymous_access(mut self, allow: bool) -> Self {
		self.allow_anonymous = allow;
		self
	}
}
