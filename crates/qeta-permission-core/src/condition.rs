// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Condition trees and policy decisions.
//!
//! A [`ConditionTree`] is an AND/OR tree of bound rule invocations. Every leaf
//! in a tree targets the same [`ResourceType`]; the builders enforce this.
//!
//! Empty nodes have fixed meaning: `AllOf([])` is true and `AnyOf([])` is
//! false. A [`PolicyDecision::Conditional`] never carries a tree without
//! leaves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PermissionError, Result};
use crate::resource::Resource;
use crate::rules::RuleRegistry;
use crate::types::ResourceType;

/// A single rule bound to its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
	pub rule: String,
	pub resource_type: ResourceType,
	pub params: Value,
}

impl Condition {
	/// Binds typed parameters to a rule name.
	///
	/// The rule is not looked up here; use [`RuleRegistry::condition`] or
	/// [`RuleRegistry::validate`] to check names and parameters.
	pub fn bind<P: Serialize>(
		resource_type: ResourceType,
		rule: impl Into<String>,
		params: &P,
	) -> Result<Self> {
		Ok(Self {
			rule: rule.into(),
			resource_type,
			params: serde_json::to_value(params)?,
		})
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionTree {
	Leaf(Condition),
	AllOf(Vec<ConditionTree>),
	AnyOf(Vec<ConditionTree>),
}

impl ConditionTree {
	pub fn leaf(condition: Condition) -> Self {
		ConditionTree::Leaf(condition)
	}

	/// Conjunction of `children`. Fails if the children target different
	/// resource types.
	pub fn all_of(children: Vec<ConditionTree>) -> Result<Self> {
		common_resource_type(&children)?;
		Ok(ConditionTree::AllOf(children))
	}

	/// Disjunction of `children`. Fails if the children target different
	/// resource types.
	pub fn any_of(children: Vec<ConditionTree>) -> Result<Self> {
		common_resource_type(&children)?;
		Ok(ConditionTree::AnyOf(children))
	}

	/// Iterates over every leaf condition, depth first.
	pub fn leaves(&self) -> Box<dyn Iterator<Item = &Condition> + '_> {
		match self {
			ConditionTree::Leaf(condition) => Box::new(std::iter::once(condition)),
			ConditionTree::AllOf(children) | ConditionTree::AnyOf(children) => {
				Box::new(children.iter().flat_map(|child| child.leaves()))
			}
		}
	}

	pub fn has_leaves(&self) -> bool {
		self.leaves().next().is_some()
	}

	/// The resource type shared by all leaves, or `None` for a tree without
	/// leaves.
	pub fn resource_type(&self) -> Result<Option<ResourceType>> {
		let mut found: Option<ResourceType> = None;
		for condition in self.leaves() {
			match found {
				None => found = Some(condition.resource_type),
				Some(expected) if expected != condition.resource_type => {
					return Err(PermissionError::MixedResourceType {
						expected,
						found: condition.resource_type,
					});
				}
				Some(_) => {}
			}
		}
		Ok(found)
	}

	/// Evaluates the tree against a loaded resource.
	///
	/// Stops at the first false child of an `AllOf` and the first true child
	/// of an `AnyOf`.
	pub fn evaluate(&self, resource: &Resource, registry: &RuleRegistry) -> Result<bool> {
		match self {
			ConditionTree::Leaf(condition) => registry.apply(
				condition.resource_type,
				&condition.rule,
				resource,
				&condition.params,
			),
			ConditionTree::AllOf(children) => {
				for child in children {
					if !child.evaluate(resource, registry)? {
						return Ok(false);
					}
				}
				Ok(true)
			}
			ConditionTree::AnyOf(children) => {
				for child in children {
					if child.evaluate(resource, registry)? {
						return Ok(true);
					}
				}
				Ok(false)
			}
		}
	}
}

fn common_resource_type(children: &[ConditionTree]) -> Result<Option<ResourceType>> {
	let mut found: Option<ResourceType> = None;
	for child in children {
		let Some(child_type) = child.resource_type()? else {
			continue;
		};
		match found {
			None => found = Some(child_type),
			Some(expected) if expected != child_type => {
				return Err(PermissionError::MixedResourceType {
					expected,
					found: child_type,
				});
			}
			Some(_) => {}
		}
	}
	Ok(found)
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyDecision {
	Allow,
	Deny,
	#[serde(rename_all = "camelCase")]
	Conditional {
		resource_type: ResourceType,
		conditions: ConditionTree,
	},
}

impl PolicyDecision {
	/// Wraps a tree as a conditional decision.
	///
	/// The tree must contain at least one leaf, and all of its leaves must
	/// target `resource_type`.
	pub fn conditional(resource_type: ResourceType, conditions: ConditionTree) -> Result<Self> {
		match conditions.resource_type()? {
			None => Err(PermissionError::EmptyConditions),
			Some(found) if found != resource_type => Err(PermissionError::MixedResourceType {
				expected: resource_type,
				found,
			}),
			Some(_) => Ok(PolicyDecision::Conditional {
				resource_type,
				conditions,
			}),
		}
	}

	pub fn is_allow(&self) -> bool {
		matches!(self, PolicyDecision::Allow)
	}

	pub fn is_deny(&self) -> bool {
		matches!(self, PolicyDecision::Deny)
	}

	pub fn is_conditional(&self) -> bool {
		matches!(self, PolicyDecision::Conditional { .. })
	}
}
