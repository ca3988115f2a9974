// SPDX-License-Identifier: PMPL-1.0-or-later
//! Shared fixtures: an in-memory gateway that counts calls and can be slowed
//! down or switched into failure mode.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use ppl_autocomplete::{
    AggregationResponse, AutocompleteEngine, AutocompleteError, Bucket, IndexEntry,
    MappingResponse, MetadataGateway, Result,
};

#[derive(Default)]
pub struct FakeGateway {
    indices: Vec<String>,
    mappings: HashMap<String, Value>,
    buckets: HashMap<String, Vec<Bucket>>,
    delay: Duration,
    failing: AtomicBool,
    pub index_calls: AtomicUsize,
    pub field_calls: AtomicUsize,
    pub value_calls: AtomicUsize,
}

impl FakeGateway {
    /// Gateway with `logs`, `logs-2023`, `metrics` and the hidden `.kibana`.
    pub fn populated() -> Self {
        let mut mappings = HashMap::new();
        mappings.insert(
            "logs".to_string(),
            json!({
                "status": { "type": "keyword" },
                "bytes": { "type": "integer" },
                "latency": { "type": "float" },
                "active": { "type": "boolean" },
                "location": { "type": "geo_point" },
                "host": { "properties": { "name": { "type": "text" } } }
            }),
        );
        mappings.insert(
            "logs-2023".to_string(),
            json!({
                "message": { "type": "text" },
                "code": { "type": "integer" }
            }),
        );
        mappings.insert("metrics".to_string(), json!({ "cpu": { "type": "float" } }));

        let mut buckets = HashMap::new();
        buckets.insert(
            "status".to_string(),
            vec![bucket(json!("ok"), 12), bucket(json!("error"), 3)],
        );
        buckets.insert(
            "active".to_string(),
            vec![bucket(json!(1), 9), bucket(json!(0), 4)],
        );
        buckets.insert("bytes".to_string(), vec![bucket(json!(512), 2)]);
        buckets.insert("location".to_string(), vec![bucket(json!("u4pruyd"), 1)]);

        Self {
            indices: ["logs", "logs-2023", ".kibana", "metrics"]
                .iter()
                .map(|name| name.to_string())
                .collect(),
            mappings,
            buckets,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }

    pub fn field_calls(&self) -> usize {
        self.field_calls.load(Ordering::SeqCst)
    }

    pub fn value_calls(&self) -> usize {
        self.value_calls.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<()> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AutocompleteError::gateway(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "backend down",
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataGateway for FakeGateway {
    async fn fetch_indices(&self) -> Result<Vec<IndexEntry>> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        Ok(self
            .indices
            .iter()
            .map(|index| IndexEntry {
                index: index.clone(),
            })
            .collect())
    }

    async fn fetch_fields(&self, index: &str) -> Result<MappingResponse> {
        self.field_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        let properties = self.mappings.get(index).cloned().unwrap_or_else(|| json!({}));
        let mut response = MappingResponse::new();
        response.insert(
            index.to_string(),
            serde_json::from_value(json!({ "mappings": { "properties": properties } }))?,
        );
        Ok(response)
    }

    async fn fetch_aggregated_values(
        &self,
        _index: &str,
        field: &str,
    ) -> Result<AggregationResponse> {
        self.value_calls.fetch_add(1, Ordering::SeqCst);
        self.respond().await?;
        let buckets = self.buckets.get(field).cloned().unwrap_or_default();
        Ok(serde_json::from_value(json!({
            "aggregations": { "top_tags": { "buckets": buckets } }
        }))?)
    }
}

pub fn bucket(key: Value, doc_count: u64) -> Bucket {
    Bucket { key, doc_count }
}

pub fn engine(gateway: &Arc<FakeGateway>) -> AutocompleteEngine<FakeGateway> {
    AutocompleteEngine::new(Arc::clone(gateway))
}

pub fn labels(items: &[ppl_autocomplete::Suggestion]) -> Vec<&str> {
    items.iter().map(|item| item.label.as_str()).collect()
}
