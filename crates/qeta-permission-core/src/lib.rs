// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization decision engine for Qeta posts, answers, comments,
//! collections and tags.
//!
//! The engine answers "may this caller perform this action?" with one of
//! three outcomes:
//!
//! - `Allow` / `Deny` when the answer does not depend on the resource
//! - `Conditional` with an AND/OR tree of rule invocations when it does
//!
//! A conditional decision is either evaluated against a loaded resource
//! ([`ConditionTree::evaluate`]) or folded into a data-layer filter
//! ([`to_query_filter`]). The engine never loads resources itself; see
//! `qeta-server-permission` for resolution.
//!
//! # Architecture
//!
//! - `types` - Actions, resource types, permissions, identities
//! - `resource` - Typed resource snapshots
//! - `rules` - Rule trait, built-in rules and the rule registry
//! - `condition` - Condition trees and policy decisions
//! - `query` - Query pushdown projection
//! - `catalog` - Registered permissions
//! - `policy` - The ordered decision procedure and its extension hook
//!
//! # Example
//!
//! ```
//! use qeta_permission_core::{
//!     catalog::names, Identity, PermissionPolicy, PolicyConfig, PolicyQuery, Post, Resource,
//! };
//!
//! let policy = PermissionPolicy::qeta(PolicyConfig::default()).unwrap();
//! let permission = policy.catalog().require(names::POST_EDIT).unwrap().clone();
//! let query = PolicyQuery::new(permission, Some(Identity::new("user:default/alice")));
//!
//! let post: Resource = Post::new(1, "user:default/alice").into();
//! let decision = policy.decide(&query);
//! if let qeta_permission_core::PolicyDecision::Conditional { conditions, .. } = decision {
//!     assert!(conditions.evaluate(&post, policy.registry()).unwrap());
//! }
//! ```

pub mod catalog;
pub mod condition;
pub mod error;
pub mod policy;
pub mod query;
pub mod resource;
pub mod rules;
pub mod types;

pub use catalog::PermissionCatalog;
pub use condition::{Condition, ConditionTree, PolicyDecision};
pub use error::{PermissionError, Result};
pub use policy::{
	Combine, ConditionProvider, PermissionPolicy, PermissionPolicyBuilder, PolicyConfig,
};
pub use query::{to_query_filter, QueryFilter, QueryFragment};
pub use resource::{
	Answer, Collection, Comment, CommentTarget, ParentPost, Post, PostType, Resource, Tag,
};
pub use rules::{PermissionRule, RuleMetadata, RuleRegistry, RuleRegistryBuilder};
pub use types::{Action, ActorRef, Identity, Permission, PolicyQuery, ResourceType};
