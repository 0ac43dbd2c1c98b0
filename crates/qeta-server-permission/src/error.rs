// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for resource resolution and condition application.

use std::time::Duration;

use qeta_permission_core::PermissionError;
use thiserror::Error;

use crate::store::RecordKind;

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors reported by a [`crate::ResourceStore`].
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("resource store unavailable: {0}")]
	Unavailable(String),

	#[error("resource store error: {0}")]
	Internal(String),
}

/// Errors that fail a whole resolution batch.
#[derive(Debug, Error)]
pub enum ResolveError {
	#[error(transparent)]
	Store(#[from] StoreError),

	#[error("resource resolution timed out after {0:?}")]
	Timeout(Duration),

	#[error("store returned {returned} rows for {requested} {kind} ids")]
	StoreContract {
		kind: RecordKind,
		requested: usize,
		returned: usize,
	},

	#[error(transparent)]
	Permission(#[from] PermissionError),
}
