// SPDX-License-Identifier: PMPL-1.0-or-later
//! PPL Autocomplete
//!
//! Incremental autocomplete for the pipe-delimited query language PPL
//! (`search source=logs | where status = "ok" | stats count() by host`).
//!
//! For every keystroke the engine tokenizes the query, classifies the grammar
//! position of the token being typed, and proposes keywords, index names,
//! field names or sampled field values for that position. Backend metadata is
//! fetched lazily through a [`MetadataGateway`] and cached per session.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ppl_autocomplete::{AutocompleteEngine, MetadataGateway};
//!
//! async fn complete(gateway: Arc<dyn MetadataGateway>) {
//!     let engine = AutocompleteEngine::new(gateway);
//!     let batch = engine.get_items("search source=").await;
//!     for item in &batch.items {
//!         println!("{}", item.label);
//!     }
//! }
//! ```

pub mod cache;
pub mod candidates;
pub mod classifier;
pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod grammar;
pub mod metadata;
pub mod session;
pub mod tokenizer;

pub use cache::{IndexFields, MetadataCache};
pub use candidates::{generate, Suggestion, SuggestionMeta};
pub use classifier::{classify, Classification, Position};
pub use config::AutocompleteConfig;
pub use editor::{QueryChangeCallback, QueryEditor};
pub use engine::{AutocompleteEngine, Selection, SuggestionBatch};
pub use error::{AutocompleteError, Result};
pub use gateway::{FetchKey, MetadataGateway, MetadataRequest};
pub use metadata::{
    AggregationResponse, Bucket, FieldDescriptor, FieldType, IndexEntry, MappingResponse,
    SampledValue,
};
pub use session::{ActiveField, ClauseState, SessionState};
pub use tokenizer::{tokenize, Tokens};
