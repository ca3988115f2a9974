// SPDX-License-Identifier: PMPL-1.0-or-later
//! Host-side adapter for a query input widget.
//!
//! [`QueryEditor`] is what a UI binds to: it tracks the text in the input,
//! notifies the host when the effective query changes, hands out suggestion
//! futures the host may run concurrently, and refuses to apply a batch that a
//! later keystroke has superseded. Dropping the editor closes its engine.

use std::future::Future;

use tracing::debug;

use crate::candidates::Suggestion;
use crate::engine::{AutocompleteEngine, SuggestionBatch};
use crate::gateway::MetadataGateway;

/// Callback invoked with the new query text and the active index.
pub type QueryChangeCallback = Box<dyn FnMut(&str, Option<&str>) + Send>;

pub struct QueryEditor<G: MetadataGateway + ?Sized + 'static> {
    engine: AutocompleteEngine<G>,
    query: String,
    on_query_change: Option<QueryChangeCallback>,
}

impl<G: MetadataGateway + ?Sized + 'static> QueryEditor<G> {
    pub fn new(engine: AutocompleteEngine<G>) -> Self {
        Self {
            engine,
            query: String::new(),
            on_query_change: None,
        }
    }

    /// Register the `on_query_change(text, active_index)` callback.
    pub fn with_query_change<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&str, Option<&str>) + Send + 'static,
    {
        self.on_query_change = Some(Box::new(callback));
        self
    }

    pub fn engine(&self) -> &AutocompleteEngine<G> {
        &self.engine
    }

    /// Current input text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Record new input text. Fires the change callback and returns `true`
    /// when the text differs from the previous input.
    pub fn set_query(&mut self, text: &str) -> bool {
        if self.query == text {
            return false;
        }
        self.query = text.to_string();
        if let Some(callback) = self.on_query_change.as_mut() {
            let active_index = self.engine.active_index();
            callback(&self.query, active_index.as_deref());
        }
        true
    }

    /// Suggestions for the current input, as a future detached from `self`
    /// so the host can spawn it and keep accepting keystrokes.
    pub fn suggestions(&self) -> impl Future<Output = SuggestionBatch> + Send + 'static {
        let engine = self.engine.clone();
        let query = self.query.clone();
        async move { engine.get_items(&query).await }
    }

    /// Record `text` and compute its suggestions in one step.
    pub async fn input(&mut self, text: &str) -> SuggestionBatch {
        self.set_query(text);
        self.engine.get_items(text).await
    }

    /// Items of `batch` if it still matches the current input; `None` when
    /// the batch is stale and must not be rendered.
    pub fn accept(&self, batch: SuggestionBatch) -> Option<Vec<Suggestion>> {
        if batch.is_for(&self.query) && !self.engine.is_closed() {
            Some(batch.items)
        } else {
            debug!(stale = %batch.input, current = %self.query, "discarding stale suggestions");
            None
        }
    }

    /// Apply a picked suggestion: updates the session, starts any field
    /// fetch it needs in the background, and replaces the input text.
    pub fn select(&mut self, suggestion: &Suggestion) -> String {
        let text = self.engine.on_select(suggestion);
        self.set_query(&text);
        text
    }
}

impl<G: MetadataGateway + ?Sized + 'static> Drop for QueryEditor<G> {
    fn drop(&mut self) {
        self.engine.close();
    }
}
