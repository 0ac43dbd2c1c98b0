// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server-side plumbing for the Qeta permission engine.
//!
//! - `resource_ref` - Parsing of `<namespace>:<type>:<id>` refs
//! - `store` - The [`ResourceStore`] trait the resolver reads through
//! - `memory` - An in-memory store
//! - `resolver` - Batched, time-bounded resource resolution
//! - `apply` - Evaluation of conditional decisions against resolved resources
//! - `config` - Layered configuration (defaults, TOML, environment)

pub mod apply;
pub mod config;
pub mod error;
pub mod memory;
pub mod resolver;
pub mod resource_ref;
pub mod store;

pub use apply::{ApplyConditionsRequest, AuthorizeResult, ConditionApplier};
pub use config::{load_config, load_config_with_file, ConfigError, PermissionConfig};
pub use error::{ResolveError, Result, StoreError};
pub use memory::InMemoryResourceStore;
pub use resolver::ResourceResolver;
pub use resource_ref::{RefParseError, ResourceRef};
pub use store::{RecordKind, ResourceStore};
