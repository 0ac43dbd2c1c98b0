// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Built-in rules shared by every Qeta resource type.
//!
//! Answers do not carry tags or entities of their own. `hasTags` and
//! `hasEntities` on an answer test the parent post's values.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::PermissionRule;
use crate::condition::{Condition, ConditionTree};
use crate::error::Result;
use crate::query::QueryFragment;
use crate::resource::{PostType, Resource};
use crate::types::{ActorRef, ResourceType};

pub const IS_AUTHOR: &str = "isAuthor";
pub const HAS_TAGS: &str = "hasTags";
pub const HAS_ENTITIES: &str = "hasEntities";
pub const HAS_TYPE: &str = "hasType";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthorParams {
	pub actor_ref: ActorRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagParams {
	pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntityParams {
	pub entity_refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeParams {
	#[serde(rename = "type")]
	pub post_type: PostType,
}

/// Allows the resource's author (a collection's owner).
#[derive(Debug, Clone, Copy)]
pub struct IsAuthor {
	resource_type: ResourceType,
}

impl IsAuthor {
	pub fn new(resource_type: ResourceType) -> Self {
		Self { resource_type }
	}
}

impl PermissionRule for IsAuthor {
	type Params = AuthorParams;

	fn name(&self) -> &'static str {
		IS_AUTHOR
	}

	fn description(&self) -> &'static str {
		"Allow authors of the resource"
	}

	fn resource_type(&self) -> ResourceType {
		self.resource_type
	}

	fn apply(&self, resource: &Resource, params: &AuthorParams) -> bool {
		let author = match resource {
			Resource::Post(post) => &post.author,
			Resource::Answer(answer) => &answer.author,
			Resource::Comment(comment) => &comment.author,
			Resource::Collection(collection) => &collection.owner,
			Resource::Tag(_) => return false,
		};
		*author == params.actor_ref
	}

	fn to_query(&self, params: &AuthorParams) -> QueryFragment {
		let property = match self.resource_type {
			ResourceType::Collection => "owner",
			_ => "author",
		};
		QueryFragment::new(property, [params.actor_ref.to_string()])
	}
}

/// Allows resources carrying every listed tag.
#[derive(Debug, Clone, Copy)]
pub struct HasTags {
	resource_type: ResourceType,
}

impl HasTags {
	pub fn new(resource_type: ResourceType) -> Self {
		Self { resource_type }
	}
}

impl PermissionRule for HasTags {
	type Params = TagParams;

	fn name(&self) -> &'static str {
		HAS_TAGS
	}

	fn description(&self) -> &'static str {
		"Allow resources with all of the given tags"
	}

	fn resource_type(&self) -> ResourceType {
		self.resource_type
	}

	fn apply(&self, resource: &Resource, params: &TagParams) -> bool {
		match resource {
			Resource::Post(post) => contains_all(&post.tags, &params.tags),
			Resource::Answer(answer) => contains_all(&answer.post.tags, &params.tags),
			Resource::Collection(collection) => contains_all(&collection.tags, &params.tags),
			Resource::Tag(tag) => params.tags.iter().all(|t| *t == tag.tag),
			Resource::Comment(_) => params.tags.is_empty(),
		}
	}

	fn to_query(&self, params: &TagParams) -> QueryFragment {
		let property = match self.resource_type {
			ResourceType::Answer => "post.tags",
			ResourceType::Tag => "tag",
			_ => "tags",
		};
		QueryFragment::new(property, params.tags.iter().cloned())
	}
}

/// Allows resources attached to every listed entity.
#[derive(Debug, Clone, Copy)]
pub struct HasEntities {
	resource_type: ResourceType,
}

impl HasEntities {
	pub fn new(resource_type: ResourceType) -> Self {
		Self { resource_type }
	}
}

impl PermissionRule for HasEntities {
	type Params = EntityParams;

	fn name(&self) -> &'static str {
		HAS_ENTITIES
	}

	fn description(&self) -> &'static str {
		"Allow resources attached to all of the given entities"
	}

	fn resource_type(&self) -> ResourceType {
		self.resource_type
	}

	fn apply(&self, resource: &Resource, params: &EntityParams) -> bool {
		match resource {
			Resource::Post(post) => contains_all(&post.entities, &params.entity_refs),
			Resource::Answer(answer) => contains_all(&answer.post.entities, &params.entity_refs),
			Resource::Collection(collection) => {
				contains_all(&collection.entities, &params.entity_refs)
			}
			Resource::Comment(_) | Resource::Tag(_) => params.entity_refs.is_empty(),
		}
	}

	fn to_query(&self, params: &EntityParams) -> QueryFragment {
		let property = match self.resource_type {
			ResourceType::Answer => "post.entities",
			_ => "entities",
		};
		QueryFragment::new(property, params.entity_refs.iter().cloned())
	}
}

/// Allows posts of the given type.
#[derive(Debug, Clone, Copy, Default)]
pub struct HasType;

impl PermissionRule for HasType {
	type Params = TypeParams;

	fn name(&self) -> &'static str {
		HAS_TYPE
	}

	fn description(&self) -> &'static str {
		"Allow posts of the given type"
	}

	fn resource_type(&self) -> ResourceType {
		ResourceType::Post
	}

	fn apply(&self, resource: &Resource, params: &TypeParams) -> bool {
		matches!(resource, Resource::Post(post) if post.post_type == params.post_type)
	}

	fn to_query(&self, params: &TypeParams) -> QueryFragment {
		QueryFragment::new("type", [params.post_type.as_str().to_string()])
	}
}

fn contains_all(have: &BTreeSet<String>, wanted: &[String]) -> bool {
	wanted.iter().all(|w| have.contains(w))
}

/// `isAuthor` bound to `actor`.
pub fn is_author(resource_type: ResourceType, actor: &ActorRef) -> Result<ConditionTree> {
	let params = AuthorParams {
		actor_ref: actor.clone(),
	};
	Ok(ConditionTree::leaf(Condition::bind(
		resource_type,
		IS_AUTHOR,
		&params,
	)?))
}

/// `hasTags` bound to `tags`.
pub fn has_tags<I, S>(resource_type: ResourceType, tags: I) -> Result<ConditionTree>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let params = TagParams {
		tags: tags.into_iter().map(Into::into).collect(),
	};
	Ok(ConditionTree::leaf(Condition::bind(
		resource_type,
		HAS_TAGS,
		&params,
	)?))
}

/// `hasEntities` bound to `entity_refs`.
pub fn has_entities<I, S>(resource_type: ResourceType, entity_refs: I) -> Result<ConditionTree>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let params = EntityParams {
		entity_refs: entity_refs.into_iter().map(Into::into).collect(),
	};
	Ok(ConditionTree::leaf(Condition::bind(
		resource_type,
		HAS_ENTITIES,
		&params,
	)?))
}

/// `hasType` bound to `post_type`.
pub fn has_type(post_type: PostType) -> Result<ConditionTree> {
	Ok(ConditionTree::leaf(Condition::bind(
		ResourceType::Post,
		HAS_TYPE,
		&TypeParams { post_type },
	)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resource::{Answer, Collection, Comment, CommentTarget, Post, Tag};

	const ALICE: &str = "user:default/alice";
	const BOB: &str = "user:default/bob";

	fn post() -> Resource {
		Post::new(1, ALICE)
			.with_tag("rust")
			.with_tag("async")
			.with_entity("component:default/api")
			.into()
	}

	fn answer() -> Resource {
		let parent = Post::new(1, ALICE).with_tag("rust").with_entity("system:default/core");
		Answer {
			id: 10,
			post_id: 1,
			author: BOB.into(),
			post: parent.as_parent(),
		}
		.into()
	}

	fn tags(values: &[&str]) -> TagParams {
		TagParams {
			tags: values.iter().map(|s| s.to_string()).collect(),
		}
	}

	fn entities(values: &[&str]) -> EntityParams {
		EntityParams {
			entity_refs: values.iter().map(|s| s.to_string()).collect(),
		}
	}

	mod is_author {
		use super::*;

		#[test]
		fn matches_exact_author() {
			let rule = IsAuthor::new(ResourceType::Post);
			let params = AuthorParams {
				actor_ref: ALICE.into(),
			};
			assert!(rule.apply(&post(), &params));
		}

		#[test]
		fn rejects_other_actor() {
			let rule = IsAuthor::new(ResourceType::Post);
			let params = AuthorParams {
				actor_ref: BOB.into(),
			};
			assert!(!rule.apply(&post(), &params));
		}

		#[test]
		fn comment_and_collection_use_their_owner() {
			let comment: Resource = Comment {
				id: 3,
				author: BOB.into(),
				target: CommentTarget::Post(1),
			}
			.into();
			let collection: Resource = Collection {
				id: 4,
				owner: BOB.into(),
				tags: BTreeSet::new(),
				entities: BTreeSet::new(),
			}
			.into();
			let params = AuthorParams {
				actor_ref: BOB.into(),
			};
			assert!(IsAuthor::new(ResourceType::Comment).apply(&comment, &params));
			assert!(IsAuthor::new(ResourceType::Collection).apply(&collection, &params));
		}

		#[test]
		fn projects_owner_for_collections() {
			let params = AuthorParams {
				actor_ref: ALICE.into(),
			};
			let fragment = IsAuthor::new(ResourceType::Collection).to_query(&params);
			assert_eq!(fragment.property, "owner");
			assert_eq!(fragment.values, vec![ALICE.to_string()]);

			let fragment = IsAuthor::new(ResourceType::Post).to_query(&params);
			assert_eq!(fragment.property, "author");
		}
	}

	mod has_tags {
		use super::*;

		#[test]
		fn requires_every_tag() {
			let rule = HasTags::new(ResourceType::Post);
			assert!(rule.apply(&post(), &tags(&["rust"])));
			assert!(rule.apply(&post(), &tags(&["rust", "async"])));
			assert!(!rule.apply(&post(), &tags(&["rust", "go"])));
		}

		#[test]
		fn empty_list_is_vacuously_true() {
			let rule = HasTags::new(ResourceType::Post);
			assert!(rule.apply(&post(), &tags(&[])));
			assert!(HasTags::new(ResourceType::Answer).apply(&answer(), &tags(&[])));
		}

		#[test]
		fn answer_uses_parent_post_tags() {
			let rule = HasTags::new(ResourceType::Answer);
			assert!(rule.apply(&answer(), &tags(&["rust"])));
			assert!(!rule.apply(&answer(), &tags(&["async"])));
			assert_eq!(rule.to_query(&tags(&["rust"])).property, "post.tags");
		}

		#[test]
		fn tag_matches_its_own_name() {
			let tag: Resource = Tag {
				id: 1,
				tag: "rust".to_string(),
				description: None,
			}
			.into();
			let rule = HasTags::new(ResourceType::Tag);
			assert!(rule.apply(&tag, &tags(&["rust"])));
			assert!(!rule.apply(&tag, &tags(&["rust", "go"])));
		}
	}

	mod has_entities {
		use super::*;

		#[test]
		fn requires_every_entity() {
			let rule = HasEntities::new(ResourceType::Post);
			assert!(rule.apply(&post(), &entities(&["component:default/api"])));
			assert!(!rule.apply(&post(), &entities(&["component:default/web"])));
			assert!(rule.apply(&post(), &entities(&[])));
		}

		#[test]
		fn answer_uses_parent_post_entities() {
			let rule = HasEntities::new(ResourceType::Answer);
			assert!(rule.apply(&answer(), &entities(&["system:default/core"])));
			assert_eq!(
				rule.to_query(&entities(&["system:default/core"])).property,
				"post.entities"
			);
		}
	}

	#[test]
	fn has_type_matches_post_type() {
		let article: Resource = Post::new(2, ALICE).with_type(PostType::Article).into();
		let rule = HasType;
		assert!(rule.apply(
			&article,
			&TypeParams {
				post_type: PostType::Article
			}
		));
		assert!(!rule.apply(
			&article,
			&TypeParams {
				post_type: PostType::Question
			}
		));
		let fragment = rule.to_query(&TypeParams {
			post_type: PostType::Link,
		});
		assert_eq!(fragment.property, "type");
		assert_eq!(fragment.values, vec!["link".to_string()]);
	}

	#[test]
	fn params_use_camel_case_on_the_wire() {
		let value = serde_json::to_value(AuthorParams {
			actor_ref: ALICE.into(),
		})
		.unwrap();
		assert_eq!(value, serde_json::json!({ "actorRef": ALICE }));

		let value = serde_json::to_value(entities(&["a"])).unwrap();
		assert_eq!(value, serde_json::json!({ "entityRefs": ["a"] }));
	}
}
