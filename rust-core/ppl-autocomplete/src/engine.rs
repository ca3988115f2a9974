// SPDX-License-Identifier: PMPL-1.0-or-later
//! The autocomplete engine.
//!
//! One engine serves one query editor. It owns the session state and the
//! metadata cache behind a mutex that is never held across an await:
//! classification and filtering run synchronously, then any metadata the
//! position asked for is fetched through the gateway, stored, and the
//! candidates are regenerated.
//!
//! Each [`SuggestionBatch`] is tagged with the input it was computed for and
//! a generation number so hosts can drop results that a later keystroke has
//! superseded. Fetches are single-flight per resource, and results that
//! arrive after [`AutocompleteEngine::close`] (or after the engine is dropped)
//! are discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{IndexFields, MetadataCache};
use crate::candidates::{generate, Suggestion};
use crate::classifier::{classify, Position};
use crate::config::AutocompleteConfig;
use crate::error::Result;
use crate::gateway::{FetchKey, MetadataGateway, MetadataRequest};
use crate::grammar;
use crate::metadata::{self, FieldDescriptor, IndexEntry, SampledValue};
use crate::session::SessionState;
use crate::tokenizer::tokenize;

/// Suggestions computed for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionBatch {
    /// The exact query these suggestions were computed for.
    pub input: String,
    /// Monotonic request counter; see [`AutocompleteEngine::is_current`].
    pub generation: u64,
    pub position: Position,
    pub items: Vec<Suggestion>,
}

impl SuggestionBatch {
    /// Whether this batch was computed for `input`.
    pub fn is_for(&self, input: &str) -> bool {
        self.input == input
    }
}

/// Result of selecting a suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Text that should replace the query.
    pub query: String,
    /// Fetches the selection made necessary.
    pub requests: Vec<MetadataRequest>,
}

struct EngineInner {
    session: SessionState,
    cache: MetadataCache,
    generation: u64,
    closed: bool,
}

/// Incremental PPL autocomplete engine.
///
/// Cloning yields another handle to the same session.
pub struct AutocompleteEngine<G: ?Sized> {
    gateway: Arc<G>,
    config: Arc<AutocompleteConfig>,
    inner: Arc<Mutex<EngineInner>>,
}

impl<G: ?Sized> Clone for AutocompleteEngine<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            config: Arc::clone(&self.config),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G> AutocompleteEngine<G>
where
    G: MetadataGateway + ?Sized + 'static,
{
    /// Create an engine with the default configuration.
    pub fn new(gateway: Arc<G>) -> Self {
        Self::build(gateway, AutocompleteConfig::default())
    }

    /// Create an engine with a custom configuration.
    pub fn with_config(gateway: Arc<G>, config: AutocompleteConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(gateway, config))
    }

    fn build(gateway: Arc<G>, config: AutocompleteConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(EngineInner {
                session: SessionState::default(),
                cache: MetadataCache::new(),
                generation: 0,
                closed: false,
            })),
        }
    }

    pub fn config(&self) -> &AutocompleteConfig {
        &self.config
    }

    // -- Suggestions --------------------------------------------------------

    /// Compute the suggestions for `query`, fetching missing metadata first.
    ///
    /// Never fails: backend errors are logged and leave the affected
    /// candidates empty.
    pub async fn get_items(&self, query: &str) -> SuggestionBatch {
        let (mut batch, requests) = self.prepare(query);
        if requests.is_empty() {
            return batch;
        }

        let weak = Arc::downgrade(&self.inner);
        let values = resolve_requests(&*self.gateway, &weak, &self.config, requests).await;

        if batch.position.uses_metadata() {
            let tokens = tokenize(query);
            let guard = self.lock();
            if !guard.closed {
                batch.items = generate(
                    &batch.position,
                    &tokens,
                    &guard.session,
                    &guard.cache,
                    &values,
                );
            }
        }
        batch
    }

    /// Classify `query` and filter resident candidates without fetching.
    ///
    /// Returns the batch together with the metadata the position is missing.
    pub fn prepare(&self, query: &str) -> (SuggestionBatch, Vec<MetadataRequest>) {
        let mut guard = self.lock();
        guard.generation += 1;
        let generation = guard.generation;

        if guard.closed {
            let batch = SuggestionBatch {
                input: query.to_string(),
                generation,
                position: Position::None,
                items: Vec::new(),
            };
            return (batch, Vec::new());
        }

        let tokens = tokenize(query);
        let EngineInner { session, cache, .. } = &mut *guard;
        let classification = classify(&tokens, session, cache, &self.config);
        let items = generate(&classification.position, &tokens, session, cache, &[]);

        let batch = SuggestionBatch {
            input: query.to_string(),
            generation,
            position: classification.position,
            items,
        };
        (batch, classification.requests)
    }

    /// Whether no newer request has been started since `batch`.
    pub fn is_current(&self, batch: &SuggestionBatch) -> bool {
        self.lock().generation == batch.generation
    }

    // -- Metadata resolution ------------------------------------------------

    /// Perform `requests`, storing results in the cache. Returns sampled
    /// values when a value request was among them.
    pub async fn resolve(&self, requests: Vec<MetadataRequest>) -> Vec<SampledValue> {
        let weak = Arc::downgrade(&self.inner);
        resolve_requests(&*self.gateway, &weak, &self.config, requests).await
    }

    /// Perform `requests` on a background task.
    ///
    /// The task only holds a weak reference to the session, so dropping every
    /// engine handle discards its results. Returns `None` when there is
    /// nothing to do or no Tokio runtime is available.
    pub fn spawn_resolve(&self, requests: Vec<MetadataRequest>) -> Option<JoinHandle<()>> {
        if requests.is_empty() {
            return None;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no runtime for background fetch; deferring to next classification");
            return None;
        };

        let gateway = Arc::clone(&self.gateway);
        let config = Arc::clone(&self.config);
        let weak = Arc::downgrade(&self.inner);
        Some(runtime.spawn(async move {
            resolve_requests(&*gateway, &weak, &config, requests).await;
        }))
    }

    // -- Selection ----------------------------------------------------------

    /// Apply a chosen suggestion to the session.
    ///
    /// When no field list is resident yet and the suggestion names a known
    /// index, that index becomes active immediately and its fields are
    /// requested.
    pub fn select(&self, suggestion: &Suggestion) -> Selection {
        let query = format!("{} ", suggestion.label);
        let mut requests = Vec::new();

        let mut guard = self.lock();
        if let Some(item) = suggestion.item_name.as_deref() {
            let index = grammar::index_reference(item);
            if guard.cache.resident_fields().is_none() && guard.cache.contains_index(index) {
                debug!(index = %index, "index selected before fields resolved");
                guard.session.active_index = Some(index.to_string());
                let request = MetadataRequest::Fields {
                    index: index.to_string(),
                };
                if guard.cache.needs(&request) {
                    requests.push(request);
                }
            }
        }

        Selection { query, requests }
    }

    /// Select a suggestion and start any resulting fetch in the background.
    /// Returns the new query text.
    pub fn on_select(&self, suggestion: &Suggestion) -> String {
        let selection = self.select(suggestion);
        self.spawn_resolve(selection.requests);
        selection.query
    }

    // -- Lifecycle and inspection -------------------------------------------

    /// Mark the engine unmounted. In-flight results are ignored on arrival
    /// and further requests yield empty batches.
    pub fn close(&self) {
        let mut guard = self.lock();
        if !guard.closed {
            info!("autocomplete session closed");
            guard.closed = true;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Start a fresh session: clears the session state and all cached
    /// metadata so the index list is fetched again.
    pub fn reset(&self) {
        let mut guard = self.lock();
        guard.session = SessionState::default();
        guard.cache = MetadataCache::new();
        info!("autocomplete session reset");
    }

    /// Snapshot of the session state.
    pub fn session(&self) -> SessionState {
        self.lock().session.clone()
    }

    pub fn active_index(&self) -> Option<String> {
        self.lock().session.active_index.clone()
    }

    pub fn cached_indices(&self) -> Vec<String> {
        self.lock().cache.indices().to_vec()
    }

    pub fn cached_fields(&self) -> Option<IndexFields> {
        self.lock().cache.resident_fields().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        lock(&self.inner)
    }
}

fn lock(inner: &Mutex<EngineInner>) -> MutexGuard<'_, EngineInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

enum Fetched {
    Indices(Vec<IndexEntry>),
    Fields(Vec<FieldDescriptor>),
    Values(Vec<SampledValue>),
}

async fn resolve_requests<G>(
    gateway: &G,
    inner: &Weak<Mutex<EngineInner>>,
    config: &AutocompleteConfig,
    requests: Vec<MetadataRequest>,
) -> Vec<SampledValue>
where
    G: MetadataGateway + ?Sized,
{
    let mut values = Vec::new();
    for request in requests {
        let key = request.fetch_key();
        match claim(inner, key.as_ref()) {
            Claim::Granted => {}
            Claim::Busy => {
                debug!(request = ?request, "fetch already in flight");
                continue;
            }
            Claim::Gone => break,
        }

        let outcome = fetch(gateway, &request).await;
        if let Some(sampled) = apply(inner, config, &request, key.as_ref(), outcome) {
            values = sampled;
        }
    }
    values
}

enum Claim {
    Granted,
    Busy,
    Gone,
}

/// Claim a fetch. Requests without a key (value samples) always proceed
/// while the session is open.
fn claim(inner: &Weak<Mutex<EngineInner>>, key: Option<&FetchKey>) -> Claim {
    let Some(shared) = inner.upgrade() else {
        return Claim::Gone;
    };
    let mut guard = lock(&shared);
    if guard.closed {
        return Claim::Gone;
    }
    match key {
        Some(key) if !guard.cache.try_begin(key) => Claim::Busy,
        _ => Claim::Granted,
    }
}

async fn fetch<G>(gateway: &G, request: &MetadataRequest) -> Result<Fetched>
where
    G: MetadataGateway + ?Sized,
{
    match request {
        MetadataRequest::Indices => gateway.fetch_indices().await.map(Fetched::Indices),
        MetadataRequest::Fields { index } => {
            let response = gateway.fetch_fields(index).await?;
            metadata::flatten_mapping(index, &response).map(Fetched::Fields)
        }
        MetadataRequest::Values {
            index,
            field,
            field_type,
        } => {
            let response = gateway.fetch_aggregated_values(index, field).await?;
            let buckets = &response.aggregations.top_tags.buckets;
            Ok(Fetched::Values(metadata::sampled_values(field_type, buckets)))
        }
    }
}

/// Store a fetch outcome unless the session is gone. Returns sampled values.
fn apply(
    inner: &Weak<Mutex<EngineInner>>,
    config: &AutocompleteConfig,
    request: &MetadataRequest,
    key: Option<&FetchKey>,
    outcome: Result<Fetched>,
) -> Option<Vec<SampledValue>> {
    let Some(shared) = inner.upgrade() else {
        debug!(request = ?request, "engine dropped; discarding fetch result");
        return None;
    };
    let mut guard = lock(&shared);
    if let Some(key) = key {
        guard.cache.finish(key);
    }
    if guard.closed {
        debug!(request = ?request, "session closed; discarding fetch result");
        return None;
    }

    match outcome {
        Ok(Fetched::Indices(entries)) => {
            guard.cache.store_indices(entries, config);
            None
        }
        Ok(Fetched::Fields(fields)) => {
            if let MetadataRequest::Fields { index } = request {
                guard.cache.store_fields(index, fields);
            }
            None
        }
        Ok(Fetched::Values(values)) => Some(values),
        Err(err) => {
            warn!(request = ?request, error = %err, "metadata fetch failed; continuing without candidates");
            None
        }
    }
}
