// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Fuzz target for the autocomplete engine.
// Run with: cargo +nightly fuzz run fuzz_autocomplete
//
// Each line of the input is fed to one engine as a successive keystroke,
// so classification runs against whatever session state earlier lines left
// behind. Every suggestion must extend the typed prefix.

#![no_main]

use std::sync::Arc;

use async_trait::async_trait;
use libfuzzer_sys::fuzz_target;
use ppl_autocomplete::{
    AggregationResponse, AutocompleteEngine, AutocompleteError, IndexEntry, MappingResponse,
    MetadataGateway, Result,
};

/// Never reached: the target only drives the synchronous path.
struct Offline;

#[async_trait]
impl MetadataGateway for Offline {
    async fn fetch_indices(&self) -> Result<Vec<IndexEntry>> {
        Err(AutocompleteError::MalformedResponse("offline".into()))
    }

    async fn fetch_fields(&self, _index: &str) -> Result<MappingResponse> {
        Err(AutocompleteError::MalformedResponse("offline".into()))
    }

    async fn fetch_aggregated_values(&self, _index: &str, _field: &str) -> Result<AggregationResponse> {
        Err(AutocompleteError::MalformedResponse("offline".into()))
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    // Limit input size to prevent timeouts on extremely long strings
    if input.len() > 4096 {
        return;
    }

    let engine = AutocompleteEngine::new(Arc::new(Offline));
    for line in input.lines() {
        let (batch, _requests) = engine.prepare(line);
        assert_eq!(batch.input, line);
        for item in &batch.items {
            assert_eq!(item.label, format!("{}{}", item.replacement_input, item.suggestion_tail));
            assert!(!item.suggestion_tail.is_empty());
        }
    }
});
