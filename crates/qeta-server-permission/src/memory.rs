// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory resource store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use qeta_permission_core::{CommentTarget, Resource};

use crate::error::StoreError;
use crate::store::{RecordKind, ResourceStore};

/// A thread-safe [`ResourceStore`] holding resources in memory.
///
/// Stores built with [`InMemoryResourceStore::recording`] also log every
/// `get_by_ids` call so callers can observe batching.
#[derive(Clone, Default)]
pub struct InMemoryResourceStore {
	inner: Arc<InMemoryInner>,
}

#[derive(Default)]
struct InMemoryInner {
	records: RwLock<HashMap<(RecordKind, i64), Resource>>,
	record_calls: bool,
	calls: RwLock<Vec<(RecordKind, Vec<i64>)>>,
}

impl InMemoryResourceStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// A store that logs every `get_by_ids` call.
	pub fn recording() -> Self {
		Self {
			inner: Arc::new(InMemoryInner {
				record_calls: true,
				..Default::default()
			}),
		}
	}

	/// Inserts or replaces a resource. Comments are filed under the table
	/// matching their target.
	pub fn insert(&self, resource: impl Into<Resource>) {
		let resource = resource.into();
		let key = (Self::record_kind(&resource), resource.id());
		self.inner.records.write().insert(key, resource);
	}

	pub fn remove(&self, kind: RecordKind, id: i64) -> Option<Resource> {
		self.inner.records.write().remove(&(kind, id))
	}

	pub fn len(&self) -> usize {
		self.inner.records.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.records.read().is_empty()
	}

	/// Recorded `get_by_ids` calls, in call order. Always empty unless the
	/// store was built with [`InMemoryResourceStore::recording`].
	pub fn calls(&self) -> Vec<(RecordKind, Vec<i64>)> {
		self.inner.calls.read().clone()
	}

	/// Drains the recorded calls.
	pub fn take_calls(&self) -> Vec<(RecordKind, Vec<i64>)> {
		std::mem::take(&mut *self.inner.calls.write())
	}

	fn record_kind(resource: &Resource) -> RecordKind {
		match resource {
			Resource::Post(_) => RecordKind::Post,
			Resource::Answer(_) => RecordKind::Answer,
			Resource::Comment(c) => match c.target {
				CommentTarget::Post(_) => RecordKind::PostComment,
				CommentTarget::Answer(_) => RecordKind::AnswerComment,
			},
			Resource::Collection(_) => RecordKind::Collection,
			Resource::Tag(_) => RecordKind::Tag,
		}
	}
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
	async fn get_by_ids(
		&self,
		kind: RecordKind,
		ids: &[i64],
	) -> Result<Vec<Option<Resource>>, StoreError> {
		if self.inner.record_calls {
			self.inner.calls.write().push((kind, ids.to_vec()));
		}

		let records = self.inner.records.read();
		Ok(ids
			.iter()
			.map(|id| records.get(&(kind, *id)).cloned())
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use qeta_permission_core::{Comment, Post, Tag};

	use super::*;

	#[tokio::test]
	async fn returns_one_entry_per_id() {
		let store = InMemoryResourceStore::new();
		store.insert(Post::new(1, "user:default/alice"));
		store.insert(Post::new(3, "user:default/bob"));

		let rows = store
			.get_by_ids(RecordKind::Post, &[3, 2, 1])
			.await
			.unwrap();
		assert_eq!(rows.len(), 3);
		assert_eq!(rows[0].as_ref().map(Resource::id), Some(3));
		assert!(rows[1].is_none());
		assert_eq!(rows[2].as_ref().map(Resource::id), Some(1));
	}

	#[tokio::test]
	async fn files_comments_by_target() {
		let store = InMemoryResourceStore::new();
		store.insert(Comment {
			id: 5,
			author: "user:default/alice".into(),
			target: CommentTarget::Answer(9),
		});

		let post_comments = store
			.get_by_ids(RecordKind::PostComment, &[5])
			.await
			.unwrap();
		assert!(post_comments[0].is_none());

		let answer_comments = store
			.get_by_ids(RecordKind::AnswerComment, &[5])
			.await
			.unwrap();
		assert!(answer_comments[0].is_some());
	}

	#[tokio::test]
	async fn recording_store_logs_calls() {
		let store = InMemoryResourceStore::recording();
		store.insert(Tag {
			id: 1,
			tag: "rust".to_string(),
			description: None,
		});

		store.get_by_ids(RecordKind::Tag, &[1, 2]).await.unwrap();
		assert_eq!(store.calls(), vec![(RecordKind::Tag, vec![1, 2])]);

		assert_eq!(store.take_calls(), vec![(RecordKind::Tag, vec![1, 2])]);
		assert!(store.calls().is_empty());
	}

	#[tokio::test]
	async fn default_store_does_not_log_calls() {
		let store = InMemoryResourceStore::new();
		for _ in 0..3 {
			store.get_by_ids(RecordKind::Post, &[1]).await.unwrap();
		}
		assert!(store.calls().is_empty());
	}

	#[test]
	fn insert_replaces_and_remove_deletes() {
		let store = InMemoryResourceStore::new();
		store.insert(Post::new(1, "user:default/alice"));
		store.insert(Post::new(1, "user:default/bob"));
		assert_eq!(store.len(), 1);

		let removed = store.remove(RecordKind::Post, 1);
		assert!(matches!(removed, Some(Resource::Post(p)) if p.author.as_str() == "user:default/bob"));
		assert!(store.is_empty());
	}
}
