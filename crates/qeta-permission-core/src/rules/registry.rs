// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::builtin::{HasEntities, HasTags, HasType, IsAuthor};
use super::{ErasedRule, PermissionRule};
use crate::condition::{Condition, ConditionTree};
use crate::error::{PermissionError, Result};
use crate::query::QueryFragment;
use crate::resource::Resource;
use crate::types::ResourceType;

/// Name and description of a registered rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetadata {
	pub name: &'static str,
	pub description: &'static str,
	pub resource_type: ResourceType,
}

/// Collects rules before freezing them into a [`RuleRegistry`].
#[derive(Default)]
pub struct RuleRegistryBuilder {
	rules: RuleMap,
}

type RuleMap = HashMap<ResourceType, HashMap<&'static str, Box<dyn ErasedRule>>>;

impl RuleRegistryBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts from the built-in Qeta rule set.
	pub fn with_qeta_rules() -> Result<Self> {
		let mut builder = Self::new();
		builder
			.register(IsAuthor::new(ResourceType::Post))?
			.register(HasTags::new(ResourceType::Post))?
			.register(HasEntities::new(ResourceType::Post))?
			.register(HasType)?
			.register(IsAuthor::new(ResourceType::Answer))?
			.register(HasTags::new(ResourceType::Answer))?
			.register(HasEntities::new(ResourceType::Answer))?
			.register(IsAuthor::new(ResourceType::Comment))?
			.register(IsAuthor::new(ResourceType::Collection))?
			.register(HasTags::new(ResourceType::Collection))?
			.register(HasEntities::new(ResourceType::Collection))?
			.register(HasTags::new(ResourceType::Tag))?;
		Ok(builder)
	}

	/// Adds a rule. Fails if a rule with the same name is already registered
	/// for the rule's resource type.
	pub fn register<R: PermissionRule>(&mut self, rule: R) -> Result<&mut Self> {
		let resource_type = PermissionRule::resource_type(&rule);
		let name = PermissionRule::name(&rule);
		let rules = self.rules.entry(resource_type).or_default();
		if rules.contains_key(name) {
			return Err(PermissionError::DuplicateRule {
				resource_type,
				name: name.to_string(),
			});
		}
		rules.insert(name, Box::new(rule));
		Ok(self)
	}

	pub fn build(self) -> RuleRegistry {
		RuleRegistry { rules: self.rules }
	}
}

/// Immutable set of rules, keyed by `(resource type, rule name)`.
///
/// Safe to share across concurrent requests once built.
pub struct RuleRegistry {
	rules: RuleMap,
}

impl fmt::Debug for RuleRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut keys: Vec<(ResourceType, &str)> = self
			.rules
			.iter()
			.flat_map(|(rt, rules)| rules.keys().map(move |name| (*rt, *name)))
			.collect();
		keys.sort();
		f.debug_struct("RuleRegistry").field("rules", &keys).finish()
	}
}

impl RuleRegistry {
	pub fn builder() -> RuleRegistryBuilder {
		RuleRegistryBuilder::new()
	}

	/// Registry holding only the built-in Qeta rules.
	pub fn qeta() -> Result<Self> {
		Ok(RuleRegistryBuilder::with_qeta_rules()?.build())
	}

	fn lookup(&self, resource_type: ResourceType, name: &str) -> Result<&dyn ErasedRule> {
		self.rules
			.get(&resource_type)
			.and_then(|rules| rules.get(name))
			.map(|rule| rule.as_ref())
			.ok_or_else(|| PermissionError::UnknownRule {
				resource_type,
				name: name.to_string(),
			})
	}

	pub fn contains(&self, resource_type: ResourceType, name: &str) -> bool {
		self.lookup(resource_type, name).is_ok()
	}

	/// Rules available for a resource type, sorted by name.
	pub fn rules_for(&self, resource_type: ResourceType) -> Vec<RuleMetadata> {
		let mut rules: Vec<RuleMetadata> = self
			.rules
			.get(&resource_type)
			.into_iter()
			.flat_map(|rules| rules.values())
			.map(|rule| RuleMetadata {
				name: rule.name(),
				description: rule.description(),
				resource_type: rule.resource_type(),
			})
			.collect();
		rules.sort_by_key(|m| m.name);
		rules
	}

	/// Builds a leaf condition, checking that the rule exists and that
	/// `params` match its parameter type.
	pub fn condition(
		&self,
		resource_type: ResourceType,
		name: &str,
		params: Value,
	) -> Result<ConditionTree> {
		self.lookup(resource_type, name)?.validate(&params)?;
		Ok(ConditionTree::leaf(Condition {
			rule: name.to_string(),
			resource_type,
			params,
		}))
	}

	/// Checks every leaf of `tree` against the registry.
	pub fn validate(&self, tree: &ConditionTree) -> Result<()> {
		tree.leaves().try_for_each(|condition| {
			self.lookup(condition.resource_type, &condition.rule)?
				.validate(&condition.params)
		})
	}

	pub fn apply(
		&self,
		resource_type: ResourceType,
		name: &str,
		resource: &Resource,
		params: &Value,
	) -> Result<bool> {
		let rule = self.lookup(resource_type, name)?;
		let found = resource.resource_type();
		if found != resource_type {
			return Err(PermissionError::ResourceTypeMismatch {
				expected: resource_type,
				found,
			});
		}
		rule.apply(resource, params)
	}

	pub fn to_query(
		&self,
		resource_type: ResourceType,
		name: &str,
		params: &Value,
	) -> Result<QueryFragment> {
		self.lookup(resource_type, name)?.to_query(params)
	}
}
