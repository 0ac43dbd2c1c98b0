// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end authorization tests: policy decision, resource resolution and
//! condition application wired together over an in-memory store.

use std::sync::Arc;

use qeta_permission_core::catalog::names;
use qeta_permission_core::rules::builtin;
use qeta_permission_core::{
	Action, Answer, Combine, ConditionTree, Identity, PermissionCatalog, PermissionPolicy,
	PolicyDecision, PolicyQuery, Post, Resource, ResourceType, RuleRegistry, Tag,
};
use qeta_server_permission::{
	ApplyConditionsRequest, AuthorizeResult, ConditionApplier, InMemoryResourceStore,
	PermissionConfig, RecordKind, ResourceResolver,
};

const ALICE: &str = "user:default/alice";
const BOB: &str = "user:default/bob";
const CAROL: &str = "user:default/carol";

struct TestApp {
	policy: PermissionPolicy,
	store: InMemoryResourceStore,
	applier: ConditionApplier,
}

impl TestApp {
	fn new(config: PermissionConfig) -> Self {
		let policy = config.build_policy().unwrap();
		Self::with_policy(config, policy)
	}

	fn with_policy(config: PermissionConfig, policy: PermissionPolicy) -> Self {
		let store = InMemoryResourceStore::recording();
		store.insert(
			Post::new(1, ALICE)
				.with_tag("rust")
				.with_entity("group:default/platform"),
		);
		store.insert(Post::new(2, BOB));
		store.insert(Post::new(5, CAROL).with_tag("rust"));
		let parent = Post::new(1, ALICE).with_tag("rust").as_parent();
		store.insert(Answer {
			id: 10,
			post_id: 1,
			author: BOB.into(),
			post: parent,
		});
		store.insert(Tag {
			id: 3,
			tag: "rust".to_string(),
			description: Some("The Rust language".to_string()),
		});

		let resolver = ResourceResolver::from_config(Arc::new(store.clone()), &config);
		let applier = ConditionApplier::new(resolver, policy.registry().clone());
		Self {
			policy,
			store,
			applier,
		}
	}

	fn query(&self, actor: Option<&str>, permission: &str) -> PolicyQuery {
		let permission = self.policy.catalog().require(permission).unwrap().clone();
		PolicyQuery::new(permission, actor.map(Identity::new))
	}

	async fn authorize(
		&self,
		actor: Option<&str>,
		permission: &str,
		resource_ref: &str,
	) -> AuthorizeResult {
		let decision = self.policy.decide(&self.query(actor, permission));
		self.applier.authorize(&decision, resource_ref).await.unwrap()
	}
}

fn default_app() -> TestApp {
	TestApp::new(PermissionConfig::default())
}

fn moderated_app() -> TestApp {
	TestApp::new(PermissionConfig {
		moderators: vec![CAROL.to_string()],
		..Default::default()
	})
}

// ============================================================================
// Author-only mutation
// ============================================================================

#[tokio::test]
async fn author_may_update_own_post() {
	let app = default_app();

	let decision = app.policy.decide(&app.query(Some(ALICE), names::POST_EDIT));
	let PolicyDecision::Conditional {
		resource_type,
		conditions,
	} = &decision
	else {
		panic!("expected conditional decision, got {decision:?}");
	};
	assert_eq!(*resource_type, ResourceType::Post);

	let post = app
		.applier
		.resolver()
		.resolve_one("qeta:post:1")
		.await
		.unwrap()
		.unwrap();
	assert!(conditions.evaluate(&post, app.policy.registry()).unwrap());

	assert_eq!(
		app.authorize(Some(ALICE), names::POST_EDIT, "qeta:post:1").await,
		AuthorizeResult::Allow
	);
}

#[tokio::test]
async fn non_author_may_not_delete_post() {
	let app = default_app();

	let decision = app.policy.decide(&app.query(Some(BOB), names::POST_DELETE));
	assert!(decision.is_conditional());
	assert_eq!(
		app.authorize(Some(BOB), names::POST_DELETE, "qeta:post:1").await,
		AuthorizeResult::Deny
	);
}

#[tokio::test]
async fn answer_author_may_edit_answer_but_post_author_may_not() {
	let app = default_app();

	assert_eq!(
		app.authorize(Some(BOB), names::ANSWER_EDIT, "qeta:answer:10").await,
		AuthorizeResult::Allow
	);
	assert_eq!(
		app.authorize(Some(ALICE), names::ANSWER_EDIT, "qeta:answer:10").await,
		AuthorizeResult::Deny
	);
}

#[tokio::test]
async fn missing_resource_is_denied() {
	let app = default_app();
	assert_eq!(
		app.authorize(Some(ALICE), names::POST_EDIT, "qeta:post:404").await,
		AuthorizeResult::Deny
	);
	assert_eq!(
		app.authorize(Some(ALICE), names::POST_EDIT, "elsewhere:post:1").await,
		AuthorizeResult::Deny
	);
}

// ============================================================================
// Moderators
// ============================================================================

#[tokio::test]
async fn moderator_may_delete_any_post() {
	let app = moderated_app();

	for post in ["qeta:post:1", "qeta:post:2"] {
		let decision = app.policy.decide(&app.query(Some(CAROL), names::POST_DELETE));
		assert_eq!(decision, PolicyDecision::Allow);
		assert_eq!(
			app.authorize(Some(CAROL), names::POST_DELETE, post).await,
			AuthorizeResult::Allow
		);
	}
	assert!(app.store.calls().is_empty());
}

#[tokio::test]
async fn moderator_may_delete_tags() {
	let app = moderated_app();
	assert_eq!(
		app.authorize(Some(CAROL), names::TAG_DELETE, "qeta:tag:3").await,
		AuthorizeResult::Allow
	);
	assert_eq!(
		app.authorize(Some(ALICE), names::TAG_DELETE, "qeta:tag:3").await,
		AuthorizeResult::Deny
	);
}

// ============================================================================
// Anonymous access
// ============================================================================

#[tokio::test]
async fn anonymous_may_read_but_not_update() {
	let app = default_app();

	assert_eq!(
		app.policy.decide(&app.query(None, names::POST_READ)),
		PolicyDecision::Allow
	);
	assert_eq!(
		app.policy.decide(&app.query(None, names::POST_EDIT)),
		PolicyDecision::Deny
	);
	assert_eq!(
		app.authorize(None, names::POST_EDIT, "qeta:post:1").await,
		AuthorizeResult::Deny
	);
}

#[tokio::test]
async fn anonymous_read_can_be_disabled() {
	let app = TestApp::new(PermissionConfig {
		allow_anonymous: false,
		..Default::default()
	});
	assert_eq!(
		app.policy.decide(&app.query(None, names::POST_READ)),
		PolicyDecision::Deny
	);
}

// ============================================================================
// Extensions
// ============================================================================

fn entity_owner_app() -> TestApp {
	let config = PermissionConfig::default();
	let catalog = PermissionCatalog::qeta().unwrap();
	let registry = Arc::new(RuleRegistry::qeta().unwrap());
	let policy = PermissionPolicy::builder(config.policy_config(), catalog, registry)
		.extend(
			ResourceType::Post,
			Action::Update,
			Combine::Union,
			|identity: &Identity| -> qeta_permission_core::Result<Vec<ConditionTree>> {
				if identity.ownership_refs.is_empty() {
					return Ok(Vec::new());
				}
				Ok(vec![builtin::has_entities(
					ResourceType::Post,
					identity.ownership_refs.iter().cloned(),
				)?])
			},
		)
		.build();
	TestApp::with_policy(config, policy)
}

#[tokio::test]
async fn entity_owner_may_edit_post_through_extension() {
	let app = entity_owner_app();
	let member = Identity::new(BOB).with_ownership_ref("group:default/platform");
	let permission = app.policy.catalog().require(names::POST_EDIT).unwrap().clone();

	let decision = app
		.policy
		.decide(&PolicyQuery::new(permission, Some(member)));
	assert_eq!(
		app.applier.authorize(&decision, "qeta:post:1").await.unwrap(),
		AuthorizeResult::Allow
	);
	assert_eq!(
		app.applier.authorize(&decision, "qeta:post:2").await.unwrap(),
		AuthorizeResult::Allow
	);
	// Neither the author nor tied to the platform group.
	assert_eq!(
		app.applier.authorize(&decision, "qeta:post:5").await.unwrap(),
		AuthorizeResult::Deny
	);

	// Without ownership refs the extension contributes nothing.
	assert_eq!(
		app.authorize(Some(BOB), names::POST_EDIT, "qeta:post:1").await,
		AuthorizeResult::Deny
	);
}

// ============================================================================
// Batch application
// ============================================================================

#[tokio::test]
async fn batch_apply_resolves_once_per_kind() {
	let app = default_app();
	let alice_is_author = builtin::is_author(ResourceType::Post, &ALICE.into()).unwrap();
	let rust_tag = builtin::has_tags(ResourceType::Tag, ["rust"]).unwrap();

	let requests = vec![
		ApplyConditionsRequest {
			resource_ref: "qeta:post:1".to_string(),
			resource_type: ResourceType::Post,
			conditions: alice_is_author.clone(),
		},
		ApplyConditionsRequest {
			resource_ref: "qeta:post:2".to_string(),
			resource_type: ResourceType::Post,
			conditions: alice_is_author,
		},
		ApplyConditionsRequest {
			resource_ref: "qeta:tag:3".to_string(),
			resource_type: ResourceType::Tag,
			conditions: rust_tag,
		},
	];

	let results = app.applier.apply(&requests).await.unwrap();
	assert_eq!(
		results,
		vec![
			AuthorizeResult::Allow,
			AuthorizeResult::Deny,
			AuthorizeResult::Allow
		]
	);

	let mut calls = app.store.calls();
	calls.sort();
	assert_eq!(
		calls,
		vec![(RecordKind::Post, vec![1, 2]), (RecordKind::Tag, vec![3])]
	);
}

#[tokio::test]
async fn resolved_resources_round_trip_through_json() {
	let app = default_app();
	let resolved = app
		.applier
		.resolver()
		.resolve(&["qeta:answer:10".to_string()])
		.await
		.unwrap();
	let answer = resolved[0].clone().unwrap();

	let json = serde_json::to_value(&answer).unwrap();
	assert_eq!(json["kind"], "answer");
	let back: Resource = serde_json::from_value(json).unwrap();
	assert_eq!(back, answer);
}
