// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//!
//! Tab-completion for the PPL shell, driven by the autocomplete engine.
//!
//! The text left of the cursor is handed to the engine; every suggestion
//! replaces that whole span with its label. When exactly one suggestion
//! remains it is treated as selected, so the session records the choice and
//! starts any field fetch it implies.

use std::sync::{Arc, Mutex, PoisonError};

use rustyline::completion::{Completer, Pair};
use rustyline::Context;
use tokio::runtime::Runtime;
use tracing::debug;

use ppl_autocomplete::{AutocompleteEngine, MetadataGateway};

/// Meta-commands starting with backslash.
pub const META_COMMANDS: &[&str] = &[
    "\\connect", "\\indices", "\\fields", "\\session", "\\refresh", "\\format",
    "\\status", "\\timing", "\\help", "\\quit", "\\q",
];

/// Engine handle shared between the completer and the REPL loop, swapped
/// out on `\connect`.
pub type SharedEngine = Arc<Mutex<AutocompleteEngine<dyn MetadataGateway>>>;

/// Tab-completer for PPL input.
pub struct PplCompleter {
    engine: SharedEngine,
    runtime: Arc<Runtime>,
}

impl PplCompleter {
    pub fn new(engine: SharedEngine, runtime: Arc<Runtime>) -> Self {
        Self { engine, runtime }
    }

    /// Completions for `line[..pos]`, as a replacement start and candidates.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let input = &line[..pos];

        if input.starts_with('\\') && !input.contains(char::is_whitespace) {
            let candidates = META_COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(input))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            return (0, candidates);
        }
        if input.starts_with('\\') {
            return (pos, Vec::new());
        }

        let engine = self
            .engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let batch = self.runtime.block_on(engine.get_items(input));
        debug!(position = ?batch.position, count = batch.items.len(), "tab completion");

        if let [only] = batch.items.as_slice() {
            let _runtime = self.runtime.enter();
            let replacement = engine.on_select(only);
            return (
                0,
                vec![Pair {
                    display: only.label.clone(),
                    replacement,
                }],
            );
        }

        let candidates = batch
            .items
            .into_iter()
            .map(|item| Pair {
                display: item.item_name.unwrap_or_else(|| item.suggestion_tail.clone()),
                replacement: item.label,
            })
            .collect();
        (0, candidates)
    }
}

impl Completer for PplCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(line, pos))
    }
}
