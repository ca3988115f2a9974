// SPDX-License-Identifier: PMPL-1.0-or-later
//! Per-editor session state.
//!
//! A query has at most one clause being completed at a time, so the
//! `stats`/`where` bookkeeping is a single [`ClauseState`] rather than two
//! independent counters. Each clause remembers its anchor, the token count at
//! the moment its keyword was completed; the current phase is derived from
//! the token count on every call, so completing the same token repeatedly is
//! idempotent.

use serde::Serialize;

use crate::grammar;
use crate::metadata::FieldType;
use crate::tokenizer::Tokens;

/// The clause currently being completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "clause", rename_all = "snake_case")]
pub enum ClauseState {
    #[default]
    Idle,
    /// `stats` was completed when the query had `anchor` tokens; the
    /// aggregate function is token `anchor - 1`.
    Stats { anchor: usize },
    /// `where` was completed when the query had `anchor` tokens; the field
    /// is token `anchor - 1`.
    Where { anchor: usize },
}

/// Position within a `stats` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsPhase {
    /// Typing the argument of an open function such as `sum(`.
    FieldArgument,
    By,
    GroupField,
    Complete,
}

/// Position within a `where` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WherePhase {
    Equals,
    Value,
    Complete,
}

impl ClauseState {
    /// Phase of an active `stats` clause for the current tokens.
    ///
    /// An open function (`sum(`) consumes one extra token for its argument;
    /// once the argument is glued on (`sum(bytes)`), or for `count()`, the
    /// clause moves straight on to `by`.
    pub fn stats_phase(&self, tokens: &Tokens<'_>) -> Option<StatsPhase> {
        let ClauseState::Stats { anchor } = *self else {
            return None;
        };
        let len = tokens.len();
        let open_function = anchor
            .checked_sub(1)
            .and_then(|position| tokens.get(position))
            .is_some_and(grammar::takes_field_argument);

        if open_function && len == anchor + 1 {
            return Some(StatsPhase::FieldArgument);
        }

        let anchor = anchor + usize::from(open_function);
        match len.checked_sub(anchor)? {
            1 => Some(StatsPhase::By),
            2 => Some(StatsPhase::GroupField),
            3 => Some(StatsPhase::Complete),
            _ => None,
        }
    }

    /// Phase of an active `where` clause for a query of `len` tokens.
    pub fn where_phase(&self, len: usize) -> Option<WherePhase> {
        let ClauseState::Where { anchor } = *self else {
            return None;
        };
        match len.checked_sub(anchor)? {
            1 => Some(WherePhase::Equals),
            2 => Some(WherePhase::Value),
            3 => Some(WherePhase::Complete),
            _ => None,
        }
    }
}

/// The field a `where` clause is filtering on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveField {
    pub name: String,
    /// `None` when the field is not in the cached mapping.
    pub field_type: Option<FieldType>,
}

/// Mutable state scoped to one query editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub active_index: Option<String>,
    pub active_field: Option<ActiveField>,
    /// True while a `fields a, b, …` list is being typed.
    pub fields_list_mode: bool,
    pub clause: ClauseState,
}

impl SessionState {
    /// Reset everything for a fresh query.
    pub fn reset_query(&mut self) {
        *self = SessionState::default();
    }

    /// Reset the per-segment state when a new `|` segment begins. The active
    /// index carries over.
    pub fn reset_segment(&mut self) {
        self.fields_list_mode = false;
        self.clause = ClauseState::Idle;
        self.active_field = None;
    }
}
