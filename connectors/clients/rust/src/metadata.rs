// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Metadata endpoints used by autocomplete, and the [`MetadataGateway`]
//! implementation that lets an engine run against a live cluster.

use async_trait::async_trait;
use tracing::debug;

use ppl_autocomplete::metadata::value_sample_query;
use ppl_autocomplete::{
    AggregationResponse, AutocompleteError, IndexEntry, MappingResponse, MetadataGateway,
};

use crate::client::MetadataClient;
use crate::error::Result;

impl MetadataClient {
    /// List every index visible to the credentials.
    ///
    /// Sends `GET /_cat/indices?format=json`. System indices are included;
    /// hiding them is the engine's concern.
    pub async fn list_indices(&self) -> Result<Vec<IndexEntry>> {
        self.get(self.url("/_cat/indices?format=json")?).await
    }

    /// Fetch the mapping of `index`.
    ///
    /// Sends `GET /{index}/_mapping`.
    pub async fn get_mapping(&self, index: &str) -> Result<MappingResponse> {
        self.get(self.index_url(index, "_mapping")?).await
    }

    /// Sample the most frequent values of `field` in `index`.
    ///
    /// Sends `POST /{index}/_search` with a `top_tags` terms aggregation of
    /// [`value_sample_size`](MetadataClient::value_sample_size) buckets.
    pub async fn sample_values(&self, index: &str, field: &str) -> Result<AggregationResponse> {
        let url = self.index_url(index, "_search")?;
        let body = value_sample_query(field, self.value_sample_size());
        debug!(index = %index, field = %field, "sampling field values");
        self.post(url, &body).await
    }
}

#[async_trait]
impl MetadataGateway for MetadataClient {
    async fn fetch_indices(&self) -> ppl_autocomplete::Result<Vec<IndexEntry>> {
        self.list_indices().await.map_err(AutocompleteError::gateway)
    }

    async fn fetch_fields(&self, index: &str) -> ppl_autocomplete::Result<MappingResponse> {
        self.get_mapping(index).await.map_err(AutocompleteError::gateway)
    }

    async fn fetch_aggregated_values(
        &self,
        index: &str,
        field: &str,
    ) -> ppl_autocomplete::Result<AggregationResponse> {
        self.sample_values(index, field)
            .await
            .map_err(AutocompleteError::gateway)
    }
}
