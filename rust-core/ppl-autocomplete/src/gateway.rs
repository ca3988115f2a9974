// SPDX-License-Identifier: PMPL-1.0-or-later
//! The metadata gateway: the engine's only I/O boundary.

use async_trait::async_trait;

use crate::error::Result;
use crate::metadata::{AggregationResponse, FieldType, IndexEntry, MappingResponse};

/// Backend operations the engine depends on.
///
/// Implementations own transport concerns (authentication, retries,
/// timeouts). The engine tolerates any of these failing or being slow.
#[async_trait]
pub trait MetadataGateway: Send + Sync {
    /// List all indices, system indices included.
    async fn fetch_indices(&self) -> Result<Vec<IndexEntry>>;

    /// Fetch the mapping of a single index.
    async fn fetch_fields(&self, index: &str) -> Result<MappingResponse>;

    /// Run the `top_tags` terms aggregation over `field` in `index`.
    async fn fetch_aggregated_values(&self, index: &str, field: &str)
        -> Result<AggregationResponse>;
}

/// Metadata the classifier found missing for the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataRequest {
    /// The index list (fetched once per session).
    Indices,
    /// The field list of one index.
    Fields { index: String },
    /// A fresh sample of values for one field. Never cached.
    Values {
        index: String,
        field: String,
        field_type: FieldType,
    },
}

/// Single-flight key: at most one outstanding fetch per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchKey {
    Indices,
    Fields(String),
}

impl MetadataRequest {
    /// The single-flight key of a cached resource. Value samples have none:
    /// every `where` value position fetches its own.
    pub fn fetch_key(&self) -> Option<FetchKey> {
        match self {
            MetadataRequest::Indices => Some(FetchKey::Indices),
            MetadataRequest::Fields { index } => Some(FetchKey::Fields(index.clone())),
            MetadataRequest::Values { .. } => None,
        }
    }
}
