// SPDX-License-Identifier: PMPL-1.0-or-later
//! Per-session metadata cache.
//!
//! Holds the index list (fetched at most once) and the field list of the
//! most recently fetched index (replaced wholesale, never merged). Sampled
//! values are not cached. The cache also carries the single-flight guard:
//! a fetch is only started when [`MetadataCache::try_begin`] succeeds.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::config::AutocompleteConfig;
use crate::gateway::{FetchKey, MetadataRequest};
use crate::metadata::{FieldDescriptor, FieldType, IndexEntry};

/// Fields of one index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexFields {
    pub index: String,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Default)]
pub struct MetadataCache {
    indices: Option<Vec<String>>,
    index_names: HashSet<String>,
    fields: Option<IndexFields>,
    in_flight: HashSet<FetchKey>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Indices ------------------------------------------------------------

    /// Whether the index list has been fetched.
    pub fn has_indices(&self) -> bool {
        self.indices.is_some()
    }

    /// Cached index names in backend order; empty until fetched.
    pub fn indices(&self) -> &[String] {
        self.indices.as_deref().unwrap_or(&[])
    }

    pub fn contains_index(&self, name: &str) -> bool {
        self.index_names.contains(name)
    }

    /// Store the index listing, dropping hidden indices. Later calls are
    /// ignored so the list stays stable for the session.
    pub fn store_indices(&mut self, entries: Vec<IndexEntry>, config: &AutocompleteConfig) {
        if self.indices.is_some() {
            debug!("index list already resident; ignoring refetch");
            return;
        }
        let names: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.index)
            .filter(|name| config.is_visible_index(name))
            .collect();
        self.index_names = names.iter().cloned().collect();
        debug!(count = names.len(), "index list cached");
        self.indices = Some(names);
    }

    // -- Fields -------------------------------------------------------------

    /// Fields of `index`, if they are the ones currently resident.
    pub fn fields_for(&self, index: &str) -> Option<&[FieldDescriptor]> {
        self.fields
            .as_ref()
            .filter(|cached| cached.index == index)
            .map(|cached| cached.fields.as_slice())
    }

    /// The resident field list, whichever index it belongs to.
    pub fn resident_fields(&self) -> Option<&IndexFields> {
        self.fields.as_ref()
    }

    /// Type of `field` within `index`, if known.
    pub fn field_type(&self, index: &str, field: &str) -> Option<FieldType> {
        self.fields_for(index)?
            .iter()
            .find(|descriptor| descriptor.name == field)
            .map(|descriptor| descriptor.field_type.clone())
    }

    /// Replace the resident field list.
    pub fn store_fields(&mut self, index: &str, fields: Vec<FieldDescriptor>) {
        debug!(index = %index, count = fields.len(), "field list cached");
        self.fields = Some(IndexFields {
            index: index.to_string(),
            fields,
        });
    }

    // -- Single-flight ------------------------------------------------------

    /// Whether `request` still needs a fetch: not resident and not in flight.
    pub fn needs(&self, request: &MetadataRequest) -> bool {
        if request
            .fetch_key()
            .is_some_and(|key| self.in_flight.contains(&key))
        {
            return false;
        }
        match request {
            MetadataRequest::Indices => !self.has_indices(),
            MetadataRequest::Fields { index } => self.fields_for(index).is_none(),
            MetadataRequest::Values { .. } => true,
        }
    }

    /// Claim the fetch for `key`. Returns `false` when one is outstanding.
    pub fn try_begin(&mut self, key: &FetchKey) -> bool {
        self.in_flight.insert(key.clone())
    }

    /// Release the claim on `key`.
    pub fn finish(&mut self, key: &FetchKey) {
        self.in_flight.remove(key);
    }

    pub fn is_in_flight(&self, key: &FetchKey) -> bool {
        self.in_flight.contains(key)
    }
}
