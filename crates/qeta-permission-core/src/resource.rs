// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource snapshots evaluated by permission rules.
//!
//! Snapshots are loaded on demand for a single check or batch and are never
//! cached by the engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{ActorRef, ResourceType};

/// Kind of post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostType {
	Question,
	Article,
	Link,
}

impl PostType {
	pub fn as_str(self) -> &'static str {
		match self {
			PostType::Question => "question",
			PostType::Article => "article",
			PostType::Link => "link",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
	pub id: i64,
	pub author: ActorRef,
	#[serde(default)]
	pub tags: BTreeSet<String>,
	#[serde(default)]
	pub entities: BTreeSet<String>,
	#[serde(rename = "type")]
	pub post_type: PostType,
}

/// Tags and entities of the post an answer belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentPost {
	#[serde(default)]
	pub tags: BTreeSet<String>,
	#[serde(default)]
	pub entities: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
	pub id: i64,
	pub post_id: i64,
	pub author: ActorRef,
	pub post: ParentPost,
}

/// What a comment is attached to. Post and answer comments are stored
/// separately but resolve to the same resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentTarget {
	Post(i64),
	Answer(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
	pub id: i64,
	pub author: ActorRef,
	pub target: CommentTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
	pub id: i64,
	pub owner: ActorRef,
	#[serde(default)]
	pub tags: BTreeSet<String>,
	#[serde(default)]
	pub entities: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
	pub id: i64,
	pub tag: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}

/// A typed resource snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resource {
	Post(Post),
	Answer(Answer),
	Comment(Comment),
	Collection(Collection),
	Tag(Tag),
}

impl Resource {
	pub fn resource_type(&self) -> ResourceType {
		match self {
			Resource::Post(_) => ResourceType::Post,
			Resource::Answer(_) => ResourceType::Answer,
			Resource::Comment(_) => ResourceType::Comment,
			Resource::Collection(_) => ResourceType::Collection,
			Resource::Tag(_) => ResourceType::Tag,
		}
	}

	pub fn id(&self) -> i64 {
		match self {
			Resource::Post(p) => p.id,
			Resource::Answer(a) => a.id,
			Resource::Comment(c) => c.id,
			Resource::Collection(c) => c.id,
			Resource::Tag(t) => t.id,
		}
	}
}

impl Post {
	/// Creates a question with no tags or entities.
	pub fn new(id: i64, author: impl Into<ActorRef>) -> Self {
		Self {
			id,
			author: author.into(),
			tags: BTreeSet::new(),
			entities: BTreeSet::new(),
			post_type: PostType::Question,
		}
	}

	/// Builder: add a tag.
	pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
		self.tags.insert(tag.into());
		self
	}

	/// Builder: add an entity ref.
	pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
		self.entities.insert(entity.into());
		self
	}

	/// Builder: set the post type.
	pub fn with_type(mut self, post_type: PostType) -> Self {
		self.post_type = post_type;
		self
	}

	/// Tags and entities as seen by this post's answers.
	pub fn as_parent(&self) -> ParentPost {
		ParentPost {
			tags: self.tags.clone(),
			entities: self.entities.clone(),
		}
	}
}

impl From<Post> for Resource {
	fn from(value: Post) -> Self {
		Resource::Post(value)
	}
}

impl From<Answer> for Resource {
	fn from(value: Answer) -> Self {
		Resource::Answer(value)
	}
}

impl From<Comment> for Resource {
	fn from(value: Comment) -> Self {
		Resource::Comment(value)
	}
}

impl From<Collection> for Resource {
	fn from(value: Collection) -> Self {
		Resource::Collection(value)
	}
}

impl From<Tag> for Resource {
	fn from(value: Tag) -> Self {
		Resource::Tag(value)
	}
}
