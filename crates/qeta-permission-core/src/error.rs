// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the permission engine.
//!
//! Denials are never errors. Everything here is either a configuration
//! mistake caught at startup or a programming error surfaced at runtime.

use thiserror::Error;

use crate::types::ResourceType;

/// Result type for permission engine operations.
pub type Result<T> = std::result::Result<T, PermissionError>;

/// Errors raised by the rule registry, condition algebra and catalog.
#[derive(Debug, Error)]
pub enum PermissionError {
	#[error("rule `{name}` is already registered for {resource_type}")]
	DuplicateRule {
		resource_type: ResourceType,
		name: String,
	},

	#[error("permission `{0}` is already registered")]
	DuplicatePermission(String),

	#[error("unknown permission `{0}`")]
	UnknownPermission(String),

	#[error("permission `{0}` is not scoped to a resource type")]
	BasicPermission(String),

	#[error("conditions mix resource types {expected} and {found}")]
	MixedResourceType {
		expected: ResourceType,
		found: ResourceType,
	},

	#[error("conditional decision requires at least one condition")]
	EmptyConditions,

	#[error("invalid params for rule `{rule}`: {message}")]
	InvalidParams { rule: String, message: String },

	#[error("unknown rule `{name}` for {resource_type}")]
	UnknownRule {
		resource_type: ResourceType,
		name: String,
	},

	#[error("expected a {expected} resource, got {found}")]
	ResourceTypeMismatch {
		expected: ResourceType,
		found: ResourceType,
	},

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl PermissionError {
	/// Returns true for errors that indicate a broken policy setup and should
	/// abort startup.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			PermissionError::DuplicateRule { .. }
				| PermissionError::DuplicatePermission(_)
				| PermissionError::UnknownPermission(_)
				| PermissionError::BasicPermission(_)
				| PermissionError::MixedResourceType { .. }
				| PermissionError::EmptyConditions
				| PermissionError::InvalidParams { .. }
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn duplicate_rule_is_configuration_error() {
		let err = PermissionError::DuplicateRule {
			resource_type: ResourceType::Post,
			name: "isAuthor".to_string(),
		};
		assert!(err.is_configuration());
		assert_eq!(
			err.to_string(),
			"rule `isAuthor` is already registered for qeta-post"
		);
	}

	#[test]
	fn unknown_rule_is_not_configuration_error() {
		let err = PermissionError::UnknownRule {
			resource_type: ResourceType::Comment,
			name: "hasTags".to_string(),
		};
		assert!(!err.is_configuration());
	}
}
