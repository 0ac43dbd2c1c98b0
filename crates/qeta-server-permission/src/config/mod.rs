// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for the permission engine.
//!
//! Sources are applied in precedence order: built-in defaults, then
//! `/etc/qeta/permission.toml` (if present), then `QETA_PERMISSION_*`
//! environment variables.

pub mod error;
pub mod layer;
pub mod sources;

use std::time::Duration;

pub use error::ConfigError;
pub use layer::PermissionConfigLayer;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use qeta_permission_core::{PermissionPolicy, PolicyConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PermissionConfig {
	/// Namespace accepted in resource refs.
	pub namespace: String,
	/// Actor or ownership refs granted full access.
	pub moderators: Vec<String>,
	pub allow_anonymous: bool,
	pub resolve_timeout_secs: u64,
}

impl Default for PermissionConfig {
	fn default() -> Self {
		PermissionConfigLayer::default().finalize()
	}
}

impl PermissionConfig {
	pub fn resolve_timeout(&self) -> Duration {
		Duration::from_secs(self.resolve_timeout_secs)
	}

	pub fn policy_config(&self) -> PolicyConfig {
		self.moderators
			.iter()
			.fold(PolicyConfig::default(), |config, moderator| {
				config.with_moderator(moderator.clone())
			})
			.with_anonymous_access(self.allow_anonymous)
	}

	/// Builds the Qeta policy with this configuration.
	pub fn build_policy(&self) -> Result<PermissionPolicy, ConfigError> {
		Ok(PermissionPolicy::qeta(self.policy_config())?)
	}
}

pub fn load_config() -> Result<PermissionConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<PermissionConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

pub fn load_from_sources(
	mut sources: Vec<Box<dyn ConfigSource>>,
) -> Result<PermissionConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = PermissionConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: PermissionConfigLayer) -> Result<PermissionConfig, ConfigError> {
	let config = layer.finalize();
	validate_config(&config)?;

	info!(
		namespace = %config.namespace,
		moderators = config.moderators.len(),
		allow_anonymous = config.allow_anonymous,
		resolve_timeout_secs = config.resolve_timeout_secs,
		"Permission configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &PermissionConfig) -> Result<(), ConfigError> {
	if config.namespace.is_empty() || config.namespace.contains(':') {
		return Err(ConfigError::Validation(format!(
			"namespace '{}' must be non-empty and must not contain ':'",
			config.namespace
		)));
	}
	if config.resolve_timeout_secs == 0 {
		return Err(ConfigError::Validation(
			"resolve_timeout_secs must be greater than zero".to_string(),
		));
	}
	Ok(())
}
