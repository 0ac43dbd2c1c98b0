// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use super::error::ConfigError;
use super::layer::PermissionConfigLayer;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/qeta/permission.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<PermissionConfigLayer, ConfigError>;
}

pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<PermissionConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(PermissionConfigLayer::default())
	}
}

/// TOML file source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<PermissionConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(PermissionConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: PermissionConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: QETA_PERMISSION_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<PermissionConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_vars(|name| std::env::var(name).ok())
	}
}

fn layer_from_vars(
	lookup: impl Fn(&str) -> Option<String>,
) -> Result<PermissionConfigLayer, ConfigError> {
	let vars = EnvVars(lookup);
	Ok(PermissionConfigLayer {
		namespace: vars.string("QETA_PERMISSION_NAMESPACE"),
		moderators: vars.list("QETA_PERMISSION_MODERATORS"),
		allow_anonymous: vars.bool("QETA_PERMISSION_ALLOW_ANONYMOUS"),
		resolve_timeout_secs: vars.u64("QETA_PERMISSION_RESOLVE_TIMEOUT_SECS")?,
	})
}

/// Typed reads over a variable lookup. Empty values count as unset.
struct EnvVars<F>(F);

impl<F: Fn(&str) -> Option<String>> EnvVars<F> {
	fn string(&self, name: &str) -> Option<String> {
		(self.0)(name).filter(|s| !s.is_empty())
	}

	fn bool(&self, name: &str) -> Option<bool> {
		self.string(name)
			.map(|v| v.eq_ignore_ascii_case("true") || v == "1")
	}

	fn u64(&self, name: &str) -> Result<Option<u64>, ConfigError> {
		match self.string(name) {
			Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
				key: name.to_string(),
				message: format!("invalid u64 value '{v}'"),
			}),
			None => Ok(None),
		}
	}

	/// Comma-separated list; blank entries are dropped.
	fn list(&self, name: &str) -> Option<Vec<String>> {
		self.string(name).map(|v| {
			v.split(',')
				.map(str::trim)
				.filter(|s| !s.is_empty())
				.map(String::from)
				.collect()
		})
	}
}
