// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Query pushdown for conditional decisions.
//!
//! Instead of loading each row and evaluating a [`ConditionTree`] in memory,
//! a data layer can fold the tree into a filter. Leaves become
//! [`QueryFragment`]s; the AND/OR shape is kept as-is. How fragments map to
//! SQL or any other query language is up to the consumer.

use serde::{Deserialize, Serialize};

use crate::condition::ConditionTree;
use crate::error::Result;
use crate::rules::RuleRegistry;

/// A single `property IN values` style filter produced by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFragment {
	pub property: String,
	pub values: Vec<String>,
}

impl QueryFragment {
	pub fn new<I>(property: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = String>,
	{
		Self {
			property: property.into(),
			values: values.into_iter().collect(),
		}
	}
}

/// Filter tree mirroring a [`ConditionTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryFilter {
	Fragment(QueryFragment),
	AllOf(Vec<QueryFilter>),
	AnyOf(Vec<QueryFilter>),
}

/// Projects every leaf of `tree` through its rule's `to_query`.
pub fn to_query_filter(tree: &ConditionTree, registry: &RuleRegistry) -> Result<QueryFilter> {
	match tree {
		ConditionTree::Leaf(condition) => registry
			.to_query(condition.resource_type, &condition.rule, &condition.params)
			.map(QueryFilter::Fragment),
		ConditionTree::AllOf(children) => children
			.iter()
			.map(|child| to_query_filter(child, registry))
			.collect::<Result<Vec<_>>>()
			.map(QueryFilter::AllOf),
		ConditionTree::AnyOf(children) => children
			.iter()
			.map(|child| to_query_filter(child, registry))
			.collect::<Result<Vec<_>>>()
			.map(QueryFilter::AnyOf),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::PermissionError;
	use crate::rules::builtin::{has_entities, has_tags, is_author};
	use crate::types::{ActorRef, ResourceType};

	#[test]
	fn preserves_tree_shape() {
		let registry = RuleRegistry::qeta().unwrap();
		let tree = ConditionTree::any_of(vec![
			is_author(ResourceType::Answer, &ActorRef::new("user:default/alice")).unwrap(),
			ConditionTree::all_of(vec![
				has_tags(ResourceType::Answer, ["rust"]).unwrap(),
				has_entities(ResourceType::Answer, ["component:default/api"]).unwrap(),
			])
			.unwrap(),
		])
		.unwrap();

		let filter = to_query_filter(&tree, &registry).unwrap();
		assert_eq!(
			filter,
			QueryFilter::AnyOf(vec![
				QueryFilter::Fragment(QueryFragment::new(
					"author",
					["user:default/alice".to_string()]
				)),
				QueryFilter::AllOf(vec![
					QueryFilter::Fragment(QueryFragment::new("post.tags", ["rust".to_string()])),
					QueryFilter::Fragment(QueryFragment::new(
						"post.entities",
						["component:default/api".to_string()]
					)),
				]),
			])
		);
	}

	#[test]
	fn unknown_rule_fails_projection() {
		let registry = RuleRegistry::qeta().unwrap();
		let tree = has_tags(ResourceType::Comment, ["rust"]).unwrap();
		let err = to_query_filter(&tree, &registry).unwrap_err();
		assert!(matches!(err, PermissionError::UnknownRule { .. }));
	}
}
