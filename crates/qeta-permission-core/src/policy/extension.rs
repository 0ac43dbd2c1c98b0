// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy extensions: caller-supplied conditions combined with the defaults.
//!
//! An extension is registered per `(resource type, action)`. It contributes a
//! list of condition trees for the current identity, and its author picks
//! whether they widen ([`Combine::Union`]) or narrow ([`Combine::Intersect`])
//! the default outcome.

use crate::condition::{ConditionTree, PolicyDecision};
use crate::error::Result;
use crate::types::{Identity, ResourceType};

/// How extension conditions join the default outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
	/// `AnyOf(default, extra...)`.
	Union,
	/// `AllOf(default, extra...)`.
	Intersect,
}

/// Produces additional conditions for an identity.
pub trait ConditionProvider: Send + Sync {
	fn conditions(&self, identity: &Identity) -> Result<Vec<ConditionTree>>;
}

impl<F> ConditionProvider for F
where
	F: Fn(&Identity) -> Result<Vec<ConditionTree>> + Send + Sync,
{
	fn conditions(&self, identity: &Identity) -> Result<Vec<ConditionTree>> {
		self(identity)
	}
}

pub(crate) struct Extension {
	pub(crate) combine: Combine,
	pub(crate) provider: Box<dyn ConditionProvider>,
}

/// Intermediate result before it becomes a [`PolicyDecision`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
	Allow,
	Deny,
	Conditions(ConditionTree),
}

impl Outcome {
	/// Reduces a tree to a constant where it has no leaves: an empty `AllOf`
	/// is true, an empty `AnyOf` is false.
	pub(crate) fn fold(tree: ConditionTree) -> Outcome {
		match tree {
			ConditionTree::Leaf(_) => Outcome::Conditions(tree),
			ConditionTree::AllOf(children) => {
				let mut kept = Vec::with_capacity(children.len());
				for child in children {
					match Outcome::fold(child) {
						Outcome::Allow => {}
						Outcome::Deny => return Outcome::Deny,
						Outcome::Conditions(child) => kept.push(child),
					}
				}
				if kept.is_empty() {
					Outcome::Allow
				} else {
					Outcome::Conditions(ConditionTree::AllOf(kept))
				}
			}
			ConditionTree::AnyOf(children) => {
				let mut kept = Vec::with_capacity(children.len());
				for child in children {
					match Outcome::fold(child) {
						Outcome::Allow => return Outcome::Allow,
						Outcome::Deny => {}
						Outcome::Conditions(child) => kept.push(child),
					}
				}
				if kept.is_empty() {
					Outcome::Deny
				} else {
					Outcome::Conditions(ConditionTree::AnyOf(kept))
				}
			}
		}
	}

	/// Joins `extra` onto this outcome.
	///
	/// Leafless trees in `extra` count as their constant value. An empty
	/// `extra` leaves the outcome untouched.
	pub(crate) fn combine(self, combine: Combine, extra: Vec<ConditionTree>) -> Result<Outcome> {
		let mut trees = Vec::with_capacity(extra.len());
		for tree in extra {
			match (combine, Outcome::fold(tree)) {
				(Combine::Union, Outcome::Allow) => return Ok(Outcome::Allow),
				(Combine::Intersect, Outcome::Deny) => return Ok(Outcome::Deny),
				(_, Outcome::Allow | Outcome::Deny) => {}
				(_, Outcome::Conditions(tree)) => trees.push(tree),
			}
		}
		if trees.is_empty() {
			return Ok(self);
		}
		let extra = trees;
		let outcome = match (combine, self) {
			(Combine::Union, Outcome::Allow) => Outcome::Allow,
			(Combine::Union, Outcome::Deny) => Outcome::Conditions(ConditionTree::any_of(extra)?),
			(Combine::Union, Outcome::Conditions(ConditionTree::AnyOf(mut children))) => {
				children.extend(extra);
				Outcome::Conditions(ConditionTree::any_of(children)?)
			}
			(Combine::Union, Outcome::Conditions(tree)) => {
				let mut children = vec![tree];
				children.extend(extra);
				Outcome::Conditions(ConditionTree::any_of(children)?)
			}
			(Combine::Intersect, Outcome::Allow) => {
				Outcome::Conditions(ConditionTree::all_of(extra)?)
			}
			(Combine::Intersect, Outcome::Deny) => Outcome::Deny,
			(Combine::Intersect, Outcome::Conditions(tree)) => {
				let mut children = vec![tree];
				children.extend(extra);
				Outcome::Conditions(ConditionTree::all_of(children)?)
			}
		};
		Ok(outcome)
	}

	pub(crate) fn into_decision(self, resource_type: ResourceType) -> Result<PolicyDecision> {
		match self {
			Outcome::Allow => Ok(PolicyDecision::Allow),
			Outcome::Deny => Ok(PolicyDecision::Deny),
			Outcome::Conditions(tree) => PolicyDecision::conditional(resource_type, tree),
		}
	}
}
