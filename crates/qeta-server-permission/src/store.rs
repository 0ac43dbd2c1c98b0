// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Storage seam for loading resources by id.

use std::fmt;

use async_trait::async_trait;
use qeta_permission_core::{Resource, ResourceType};

use crate::error::StoreError;

/// A table the store can be queried against.
///
/// Comments live in two tables (post comments and answer comments), so
/// there is one more record kind than resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordKind {
	Post,
	Answer,
	PostComment,
	AnswerComment,
	Collection,
	Tag,
}

impl RecordKind {
	/// Record kinds that can hold a resource of the given type, in lookup
	/// priority order.
	pub fn for_resource_type(resource_type: ResourceType) -> &'static [RecordKind] {
		match resource_type {
			ResourceType::Post => &[RecordKind::Post],
			ResourceType::Answer => &[RecordKind::Answer],
			ResourceType::Comment => &[RecordKind::PostComment, RecordKind::AnswerComment],
			ResourceType::Collection => &[RecordKind::Collection],
			ResourceType::Tag => &[RecordKind::Tag],
		}
	}

	pub fn resource_type(self) -> ResourceType {
		match self {
			RecordKind::Post => ResourceType::Post,
			RecordKind::Answer => ResourceType::Answer,
			RecordKind::PostComment | RecordKind::AnswerComment => ResourceType::Comment,
			RecordKind::Collection => ResourceType::Collection,
			RecordKind::Tag => ResourceType::Tag,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			RecordKind::Post => "post",
			RecordKind::Answer => "answer",
			RecordKind::PostComment => "post_comment",
			RecordKind::AnswerComment => "answer_comment",
			RecordKind::Collection => "collection",
			RecordKind::Tag => "tag",
		}
	}
}

impl fmt::Display for RecordKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Batch lookup of resources by id.
///
/// Implementations must return exactly one entry per requested id, in the
/// same order, with `None` for ids that do not exist.
#[async_trait]
pub trait ResourceStore: Send + Sync {
	async fn get_by_ids(
		&self,
		kind: RecordKind,
		ids: &[i64],
	) -> Result<Vec<Option<Resource>>, StoreError>;
}
