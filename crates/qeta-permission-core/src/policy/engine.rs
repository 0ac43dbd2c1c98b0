// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy decision engine.
//!
//! [`PermissionPolicy::decide`] runs an ordered procedure; each step only
//! runs if the previous one did not decide:
//!
//! 1. **Catalog check**: unregistered permissions are denied
//! 2. **Anonymous callers**: create/read allowed when anonymous access is
//!    open, everything else denied
//! 3. **Moderators**: allowed unconditionally
//! 4. **Create/read**: allowed
//! 5. **Update/delete**: authors only, returned as a conditional decision.
//!    Tags are the exception: any caller may update, nobody may delete.
//!
//! Registered extensions then widen or narrow steps 4 and 5. The engine never
//! returns an error; anything unexpected is logged and denied.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, instrument, warn};

use super::extension::{Combine, ConditionProvider, Extension, Outcome};
use super::PolicyConfig;
use crate::catalog::PermissionCatalog;
use crate::condition::{ConditionTree, PolicyDecision};
use crate::error::{PermissionError, Result};
use crate::rules::builtin::is_author;
use crate::rules::RuleRegistry;
use crate::types::{Action, Identity, Permission, PolicyQuery, ResourceType};

/// Assembles a [`PermissionPolicy`] at startup.
pub struct PermissionPolicyBuilder {
	config: PolicyConfig,
	catalog: PermissionCatalog,
	registry: Arc<RuleRegistry>,
	extensions: HashMap<(ResourceType, Action), Vec<Extension>>,
}

impl PermissionPolicyBuilder {
	pub fn new(config: PolicyConfig, catalog: PermissionCatalog, registry: Arc<RuleRegistry>) -> Self {
		Self {
			config,
			catalog,
			registry,
			extensions: HashMap::new(),
		}
	}

	/// Adds conditions for `action` on `resource_type`.
	pub fn extend<P>(
		mut self,
		resource_type: ResourceType,
		action: Action,
		combine: Combine,
		provider: P,
	) -> Self
	where
		P: ConditionProvider + 'static,
	{
		self.extensions
			.entry((resource_type, action))
			.or_default()
			.push(Extension {
				combine,
				provider: Box::new(provider),
			});
		self
	}

	/// Like [`PermissionPolicyBuilder::extend`], addressing the target by
	/// permission name.
	pub fn extend_permission<P>(self, name: &str, combine: Combine, provider: P) -> Result<Self>
	where
		P: ConditionProvider + 'static,
	{
		let permission = self.catalog.require(name)?;
		let resource_type = permission
			.resource_type
			.ok_or_else(|| PermissionError::BasicPermission(name.to_string()))?;
		let action = permission.action;
		Ok(self.extend(resource_type, action, combine, provider))
	}

	pub fn build(self) -> PermissionPolicy {
		PermissionPolicy {
			config: self.config,
			catalog: self.catalog,
			registry: self.registry,
			extensions: self.extensions,
		}
	}
}

/// The Qeta permission policy.
///
/// Immutable once built; share it behind an `Arc`.
pub struct PermissionPolicy {
	config: PolicyConfig,
	catalog: PermissionCatalog,
	registry: Arc<RuleRegistry>,
	extensions: HashMap<(ResourceType, Action), Vec<Extension>>,
}

impl PermissionPolicy {
	pub fn builder(
		config: PolicyConfig,
		catalog: PermissionCatalog,
		registry: Arc<RuleRegistry>,
	) -> PermissionPolicyBuilder {
		PermissionPolicyBuilder::new(config, catalog, registry)
	}

	/// Policy with the default Qeta catalog and rules.
	pub fn qeta(config: PolicyConfig) -> Result<Self> {
		Ok(Self::builder(
			config,
			PermissionCatalog::qeta()?,
			Arc::new(RuleRegistry::qeta()?),
		)
		.build())
	}

	pub fn config(&self) -> &PolicyConfig {
		&self.config
	}

	pub fn catalog(&self) -> &PermissionCatalog {
		&self.catalog
	}

	pub fn registry(&self) -> &Arc<RuleRegistry> {
		&self.registry
	}

	/// Decides a single permission request.
	#[instrument(
		level = "debug",
		skip(self, query),
		fields(
			permission = %query.permission.name,
			action = %query.permission.action,
			actor = query.identity.as_ref().map(|i| i.actor_ref.as_str()),
		)
	)]
	pub fn decide(&self, query: &PolicyQuery) -> PolicyDecision {
		let permission = &query.permission;
		if !self.catalog.contains(permission) {
			warn!(
				permission = %permission.name,
				"permission is not registered in the catalog, denying"
			);
			return PolicyDecision::Deny;
		}

		let Some(identity) = &query.identity else {
			return if self.config.allow_anonymous && permission.action.is_open() {
				PolicyDecision::Allow
			} else {
				PolicyDecision::Deny
			};
		};

		if self.is_moderator(identity) {
			return PolicyDecision::Allow;
		}

		match self.evaluate(permission, identity) {
			Ok(decision) => decision,
			Err(e) => {
				error!(
					permission = %permission.name,
					error = %e,
					"failed to build policy decision, denying"
				);
				PolicyDecision::Deny
			}
		}
	}

	/// True if the actor or one of its ownership refs is a moderator.
	pub fn is_moderator(&self, identity: &Identity) -> bool {
		identity
			.refs()
			.any(|r| self.config.moderators.contains(r))
	}

	fn evaluate(&self, permission: &Permission, identity: &Identity) -> Result<PolicyDecision> {
		let Some(resource_type) = permission.resource_type else {
			return Ok(if permission.action.is_open() {
				PolicyDecision::Allow
			} else {
				PolicyDecision::Deny
			});
		};

		let mut outcome = default_outcome(resource_type, permission.action, identity)?;
		if let Some(extensions) = self.extensions.get(&(resource_type, permission.action)) {
			for extension in extensions {
				let extra = extension.provider.conditions(identity)?;
				for tree in &extra {
					self.registry.validate(tree)?;
				}
				outcome = outcome.combine(extension.combine, extra)?;
			}
		}
		outcome.into_decision(resource_type)
	}
}

fn default_outcome(resource_type: ResourceType, action: Action, identity: &Identity) -> Result<Outcome> {
	let outcome = match (resource_type, action) {
		(_, Action::Create | Action::Read) => Outcome::Allow,
		(ResourceType::Tag, Action::Update) => Outcome::Allow,
		(ResourceType::Tag, Action::Delete) => Outcome::Deny,
		(
			ResourceType::Post | ResourceType::Answer | ResourceType::Collection | ResourceType::Comment,
			Action::Update | Action::Delete,
		) => Outcome::Conditions(author_only(resource_type, identity)?),
	};
	Ok(outcome)
}

fn author_only(resource_type: ResourceType, identity: &Identity) -> Result<ConditionTree> {
	ConditionTree::any_of(vec![is_author(resource_type, &identity.actor_ref)?])
}


#[cfg(test)]
mod proptest_tests {
	use proptest::prelude::*;

	use super::*;
	use crate::resource::{Post, Resource};

	fn any_permission() -> impl Strategy<Value = Permission> {
		let permissions: Vec<Permission> = PermissionCatalog::qeta()
			.map(|c| c.iter().cloned().collect())
			.unwrap_or_default();
		proptest::sample::select(permissions)
	}

	proptest! {
		#[test]
		fn moderator_override_is_absolute(
			permission in any_permission(),
			moderator in "user:default/[a-z]{1,12}",
		) {
			let policy = PermissionPolicy::qeta(PolicyConfig::default().with_moderator(moderator.clone())).unwrap();
			let query = PolicyQuery::new(permission, Some(Identity::new(moderator)));
			prop_assert_eq!(policy.decide(&query), PolicyDecision::Allow);
		}

		#[test]
		fn missing_actor_never_mutates(permission in any_permission(), open in any::<bool>()) {
			let policy = PermissionPolicy::qeta(PolicyConfig::default().with_anonymous_access(open)).unwrap();
			let decision = policy.decide(&PolicyQuery::anonymous(permission.clone()));
			if permission.action.is_mutating() {
				prop_assert_eq!(decision, PolicyDecision::Deny);
			} else {
				prop_assert_eq!(decision.is_allow(), open);
			}
		}

		#[test]
		fn only_the_author_may_edit_posts(
			author in "user:default/[a-z]{1,12}",
			actor in "user:default/[a-z]{1,12}",
		) {
			let policy = PermissionPolicy::qeta(PolicyConfig::default()).unwrap();
			let post: Resource = Post::new(1, author.as_str()).into();
			let permission = policy.catalog().require(crate::catalog::names::POST_EDIT).unwrap().clone();
			let decision = policy.decide(&PolicyQuery::new(permission, Some(Identity::new(actor.as_str()))));
			let PolicyDecision::Conditional { conditions, .. } = decision else {
				return Err(TestCaseError::fail("expected a conditional decision"));
			};
			prop_assert_eq!(conditions.evaluate(&post, policy.registry()).unwrap(), author == actor);
		}
	}
}
