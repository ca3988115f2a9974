// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! # PPL Metadata Client
//!
//! HTTP implementation of [`ppl_autocomplete::MetadataGateway`] for
//! OpenSearch-compatible clusters: index listing, field mappings, and
//! top-value sampling for autocomplete.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ppl_autocomplete::AutocompleteEngine;
//! use ppl_metadata_client::client::MetadataClient;
//!
//! #[tokio::main]
//! async fn main() -> ppl_metadata_client::error::Result<()> {
//!     let client = MetadataClient::with_basic("http://localhost:9200", "admin", "admin")?;
//!     let engine = AutocompleteEngine::new(Arc::new(client));
//!     let batch = engine.get_items("search source=").await;
//!     println!("{} index suggestions", batch.items.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`client`]: Authentication, timeouts, and HTTP transport.
//! - [`config`]: Serializable connection settings.
//! - [`metadata`]: Index, mapping and value-sampling endpoints.
//! - [`types`]: Transport-level wire types (error bodies, cluster info).
//! - [`error`]: Error types and the crate-level `Result` alias.

pub mod client;
pub mod config;
pub mod error;
pub mod metadata;
pub mod types;

pub use client::{Auth, MetadataClient};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
