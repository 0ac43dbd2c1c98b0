// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Batched resolution of resource refs into resource snapshots.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use qeta_permission_core::{Resource, ResourceType};
use tracing::{debug, instrument, warn};

use crate::config::PermissionConfig;
use crate::error::{ResolveError, Result};
use crate::resource_ref::ResourceRef;
use crate::store::{RecordKind, ResourceStore};

pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Turns `<namespace>:<type>:<id>` refs into resources.
///
/// Each call issues at most one store query per record kind, regardless of
/// how many refs (or duplicates) it contains.
#[derive(Clone)]
pub struct ResourceResolver {
	store: Arc<dyn ResourceStore>,
	namespace: String,
	timeout: Duration,
}

impl ResourceResolver {
	pub fn new(store: Arc<dyn ResourceStore>, namespace: impl Into<String>) -> Self {
		Self {
			store,
			namespace: namespace.into(),
			timeout: DEFAULT_RESOLVE_TIMEOUT,
		}
	}

	pub fn from_config(store: Arc<dyn ResourceStore>, config: &PermissionConfig) -> Self {
		Self::new(store, config.namespace.clone()).with_timeout(config.resolve_timeout())
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Resolves refs to resources, one output per input in the same order.
	///
	/// Refs that do not parse, belong to another namespace or do not exist
	/// resolve to `None`. Any store failure fails the whole batch.
	#[instrument(
		level = "debug",
		skip(self, refs),
		fields(refs = refs.len(), namespace = %self.namespace)
	)]
	pub async fn resolve(&self, refs: &[String]) -> Result<Vec<Option<Resource>>> {
		match tokio::time::timeout(self.timeout, self.resolve_batch(refs)).await {
			Ok(result) => result,
			Err(_) => {
				warn!(timeout = ?self.timeout, "resource resolution timed out");
				Err(ResolveError::Timeout(self.timeout))
			}
		}
	}

	/// Resolves a single ref.
	pub async fn resolve_one(&self, resource_ref: &str) -> Result<Option<Resource>> {
		let mut resolved = self.resolve(&[resource_ref.to_string()]).await?;
		Ok(resolved.pop().flatten())
	}

	fn parse(&self, raw: &str) -> Option<ResourceRef> {
		match raw.parse::<ResourceRef>() {
			Ok(parsed) if parsed.namespace == self.namespace => Some(parsed),
			Ok(parsed) => {
				debug!(resource_ref = raw, namespace = %parsed.namespace, "ignoring ref from another namespace");
				None
			}
			Err(e) => {
				debug!(resource_ref = raw, error = %e, "ignoring unparseable ref");
				None
			}
		}
	}

	async fn resolve_batch(&self, refs: &[String]) -> Result<Vec<Option<Resource>>> {
		let parsed: Vec<Option<ResourceRef>> = refs.iter().map(|raw| self.parse(raw)).collect();

		let mut wanted: BTreeMap<ResourceType, BTreeSet<i64>> = BTreeMap::new();
		for r in parsed.iter().flatten() {
			wanted.entry(r.resource_type).or_default().insert(r.id);
		}

		let queries: Vec<(RecordKind, Vec<i64>)> = wanted
			.into_iter()
			.flat_map(|(resource_type, ids)| {
				let ids: Vec<i64> = ids.into_iter().collect();
				RecordKind::for_resource_type(resource_type)
					.iter()
					.map(move |kind| (*kind, ids.clone()))
			})
			.collect();

		let results = try_join_all(
			queries
				.iter()
				.map(|(kind, ids)| self.fetch(*kind, ids)),
		)
		.await?;

		// Queries are in priority order, so the first hit for a key wins.
		let mut found: HashMap<(ResourceType, i64), Resource> = HashMap::new();
		for rows in results {
			for resource in rows {
				found
					.entry((resource.resource_type(), resource.id()))
					.or_insert(resource);
			}
		}

		Ok(parsed
			.into_iter()
			.map(|r| r.and_then(|r| found.get(&(r.resource_type, r.id)).cloned()))
			.collect())
	}

	async fn fetch(&self, kind: RecordKind, ids: &[i64]) -> Result<Vec<Resource>> {
		let rows = self.store.get_by_ids(kind, ids).await?;
		if rows.len() != ids.len() {
			return Err(ResolveError::StoreContract {
				kind,
				requested: ids.len(),
				returned: rows.len(),
			});
		}

		debug!(%kind, requested = ids.len(), found = rows.iter().flatten().count(), "fetched resources");

		Ok(rows
			.into_iter()
			.flatten()
			.filter(|resource| resource.resource_type() == kind.resource_type())
			.collect())
	}
}
