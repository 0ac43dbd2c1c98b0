// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Applies conditional decisions to concrete resources.

use std::sync::Arc;

use qeta_permission_core::{
	ConditionTree, PermissionError, PolicyDecision, ResourceType, RuleRegistry,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::resolver::ResourceResolver;

/// A conditional decision to check against one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyConditionsRequest {
	pub resource_ref: String,
	pub resource_type: ResourceType,
	pub conditions: ConditionTree,
}

/// Final answer for a single resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizeResult {
	Allow,
	Deny,
}

impl AuthorizeResult {
	pub fn is_allow(self) -> bool {
		matches!(self, AuthorizeResult::Allow)
	}
}

impl From<bool> for AuthorizeResult {
	fn from(allowed: bool) -> Self {
		if allowed {
			AuthorizeResult::Allow
		} else {
			AuthorizeResult::Deny
		}
	}
}

/// Resolves resources and evaluates condition trees against them.
#[derive(Clone)]
pub struct ConditionApplier {
	resolver: ResourceResolver,
	registry: Arc<RuleRegistry>,
}

impl ConditionApplier {
	pub fn new(resolver: ResourceResolver, registry: Arc<RuleRegistry>) -> Self {
		Self { resolver, registry }
	}

	pub fn resolver(&self) -> &ResourceResolver {
		&self.resolver
	}

	/// Evaluates each request against its resource. All refs are resolved in
	/// one batch.
	///
	/// Missing resources, resources of a different type than requested and
	/// trees without leaves are denied. A tree whose leaves target another
	/// resource type, or name unknown rules, fails the batch.
	#[instrument(level = "debug", skip(self, requests), fields(requests = requests.len()))]
	pub async fn apply(&self, requests: &[ApplyConditionsRequest]) -> Result<Vec<AuthorizeResult>> {
		let mut evaluable = Vec::with_capacity(requests.len());
		for request in requests {
			evaluable.push(self.check(request)?);
		}

		let refs: Vec<String> = requests.iter().map(|r| r.resource_ref.clone()).collect();
		let resources = self.resolver.resolve(&refs).await?;

		let mut results = Vec::with_capacity(requests.len());
		for ((request, resource), evaluable) in requests.iter().zip(resources).zip(evaluable) {
			let result = match resource {
				_ if !evaluable => AuthorizeResult::Deny,
				Some(resource) if resource.resource_type() == request.resource_type => {
					AuthorizeResult::from(request.conditions.evaluate(&resource, &self.registry)?)
				}
				Some(resource) => {
					debug!(
						resource_ref = %request.resource_ref,
						expected = %request.resource_type,
						found = %resource.resource_type(),
						"resource type mismatch"
					);
					AuthorizeResult::Deny
				}
				None => {
					debug!(resource_ref = %request.resource_ref, "resource not found");
					AuthorizeResult::Deny
				}
			};
			results.push(result);
		}
		Ok(results)
	}

	/// Returns false for a tree without leaves.
	fn check(&self, request: &ApplyConditionsRequest) -> Result<bool> {
		match request.conditions.resource_type()? {
			None => {
				debug!(resource_ref = %request.resource_ref, "conditions have no rules, denying");
				Ok(false)
			}
			Some(found) if found != request.resource_type => {
				Err(PermissionError::MixedResourceType {
					expected: request.resource_type,
					found,
				}
				.into())
			}
			Some(_) => {
				self.registry.validate(&request.conditions)?;
				Ok(true)
			}
		}
	}

	/// Turns a policy decision into a final answer for one resource.
	/// Definitive decisions never touch the store.
	pub async fn authorize(
		&self,
		decision: &PolicyDecision,
		resource_ref: &str,
	) -> Result<AuthorizeResult> {
		match decision {
			PolicyDecision::Allow => Ok(AuthorizeResult::Allow),
			PolicyDecision::Deny => Ok(AuthorizeResult::Deny),
			PolicyDecision::Conditional {
				resource_type,
				conditions,
			} => {
				let request = ApplyConditionsRequest {
					resource_ref: resource_ref.to_string(),
					resource_type: *resource_type,
					conditions: conditions.clone(),
				};
				let mut results = self.apply(std::slice::from_ref(&request)).await?;
				Ok(results.pop().unwrap_or(AuthorizeResult::Deny))
			}
		}
	}
}
