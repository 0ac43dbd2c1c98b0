// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer merged across sources.

use serde::{Deserialize, Serialize};

use super::PermissionConfig;

pub const DEFAULT_NAMESPACE: &str = "qeta";
pub const DEFAULT_RESOLVE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PermissionConfigLayer {
	pub namespace: Option<String>,
	pub moderators: Option<Vec<String>>,
	pub allow_anonymous: Option<bool>,
	pub resolve_timeout_secs: Option<u64>,
}

impl PermissionConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.namespace.is_some() {
			self.namespace = other.namespace;
		}
		if other.moderators.is_some() {
			self.moderators = other.moderators;
		}
		if other.allow_anonymous.is_some() {
			self.allow_anonymous = other.allow_anonymous;
		}
		if other.resolve_timeout_secs.is_some() {
			self.resolve_timeout_secs = other.resolve_timeout_secs;
		}
	}

	pub fn finalize(self) -> PermissionConfig {
		PermissionConfig {
			namespace: self
				.namespace
				.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
			moderators: self.moderators.unwrap_or_default(),
			allow_anonymous: self.allow_anonymous.unwrap_or(true),
			resolve_timeout_secs: self
				.resolve_timeout_secs
				.unwrap_or(DEFAULT_RESOLVE_TIMEOUT_SECS),
		}
	}
}
