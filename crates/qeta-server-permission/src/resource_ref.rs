// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Parsing of `<namespace>:<type>:<id>` resource refs.

use std::fmt;
use std::str::FromStr;

use qeta_permission_core::ResourceType;
use thiserror::Error;

/// Why a resource ref could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefParseError {
	#[error("resource ref `{0}` must have the form <namespace>:<type>:<id>")]
	Malformed(String),

	#[error("unknown resource type `{0}`")]
	UnknownType(String),

	#[error("invalid resource id `{0}`")]
	InvalidId(String),
}

/// A parsed resource reference, e.g. `qeta:post:42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
	pub namespace: String,
	pub resource_type: ResourceType,
	pub id: i64,
}

impl ResourceRef {
	pub fn new(namespace: impl Into<String>, resource_type: ResourceType, id: i64) -> Self {
		Self {
			namespace: namespace.into(),
			resource_type,
			id,
		}
	}
}

impl FromStr for ResourceRef {
	type Err = RefParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut parts = s.splitn(3, ':');
		let (Some(namespace), Some(segment), Some(id)) = (parts.next(), parts.next(), parts.next())
		else {
			return Err(RefParseError::Malformed(s.to_string()));
		};
		if namespace.is_empty() || segment.is_empty() || id.is_empty() {
			return Err(RefParseError::Malformed(s.to_string()));
		}

		let resource_type = ResourceType::from_ref_segment(segment)
			.ok_or_else(|| RefParseError::UnknownType(segment.to_string()))?;
		let id = id
			.parse::<i64>()
			.ok()
			.filter(|id| *id > 0)
			.ok_or_else(|| RefParseError::InvalidId(id.to_string()))?;

		Ok(Self {
			namespace: namespace.to_string(),
			resource_type,
			id,
		})
	}
}

impl fmt::Display for ResourceRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{}:{}:{}",
			self.namespace,
			self.resource_type.ref_segment(),
			self.id
		)
	}
}
