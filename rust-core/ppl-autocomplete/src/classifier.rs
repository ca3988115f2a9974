// SPDX-License-Identifier: PMPL-1.0-or-later
//! Grammar-position classification.
//!
//! [`classify`] is an ordered, first-match-wins rule table evaluated against
//! the last completed token and the session's clause state. It updates the
//! session and reports which metadata the position needs; it never fetches.

use serde::Serialize;
use tracing::debug;

use crate::cache::MetadataCache;
use crate::config::AutocompleteConfig;
use crate::gateway::MetadataRequest;
use crate::grammar;
use crate::session::{ActiveField, ClauseState, SessionState, StatsPhase, WherePhase};
use crate::tokenizer::Tokens;

/// The grammar position of the token being typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    FirstCommand,
    PipeCommand,
    FieldListContinuation,
    EqualsAfterSource,
    IndexName,
    /// `source=<partial>` typed as one token.
    InlineIndexName { keyword: String },
    PipeSeparatorAfterIndex,
    SourceKeyword,
    StatsFunction,
    StatsFieldArg,
    StatsByKeyword,
    StatsGroupField,
    FieldsFirst,
    DedupField,
    WhereField,
    WhereEquals,
    WhereValue,
    ClauseComplete,
    FieldListOrPipe,
    None,
}

impl Position {
    /// Whether candidates come from backend metadata rather than a fixed
    /// table, so they change once a fetch lands.
    pub fn uses_metadata(&self) -> bool {
        matches!(
            self,
            Position::IndexName
                | Position::InlineIndexName { .. }
                | Position::FieldListContinuation
                | Position::StatsFieldArg
                | Position::StatsGroupField
                | Position::FieldsFirst
                | Position::DedupField
                | Position::WhereField
                | Position::WhereValue
        )
    }
}

/// Outcome of classifying one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub position: Position,
    /// Metadata that is missing and should be fetched.
    pub requests: Vec<MetadataRequest>,
}

impl Classification {
    fn new(position: Position) -> Self {
        Self {
            position,
            requests: Vec::new(),
        }
    }

    fn with_request(mut self, request: Option<MetadataRequest>) -> Self {
        self.requests.extend(request);
        self
    }
}

/// Classify the position of the prefix in `tokens`, updating `state`.
pub fn classify(
    tokens: &Tokens<'_>,
    state: &mut SessionState,
    cache: &MetadataCache,
    config: &AutocompleteConfig,
) -> Classification {
    let classification = classify_inner(tokens, state, cache, config);
    debug!(
        position = ?classification.position,
        tokens = tokens.len(),
        requests = classification.requests.len(),
        "classified query"
    );
    classification
}

fn classify_inner(
    tokens: &Tokens<'_>,
    state: &mut SessionState,
    cache: &MetadataCache,
    config: &AutocompleteConfig,
) -> Classification {
    let len = tokens.len();
    let Some(previous) = tokens.previous() else {
        state.reset_query();
        let request = config.prefetch_indices.then(|| indices_request(cache)).flatten();
        return Classification::new(Position::FirstCommand).with_request(request);
    };

    if previous == grammar::PIPE {
        state.reset_segment();
        return Classification::new(Position::PipeCommand);
    }

    if previous.contains(',') {
        if state.fields_list_mode {
            return field_position(Position::FieldListContinuation, state, cache);
        }
        return Classification::new(Position::None);
    }

    if grammar::is_source_keyword(previous) {
        return Classification::new(Position::EqualsAfterSource);
    }

    if tokens.back(2).is_some_and(grammar::is_source_keyword) {
        return Classification::new(Position::IndexName).with_request(indices_request(cache));
    }

    if let Some((keyword, _)) = grammar::split_source_assignment(tokens.prefix()) {
        return Classification::new(Position::InlineIndexName {
            keyword: keyword.to_string(),
        })
        .with_request(indices_request(cache));
    }

    let referenced = grammar::index_reference(previous);
    if cache.contains_index(referenced) {
        state.active_index = Some(referenced.to_string());
        let request = MetadataRequest::Fields {
            index: referenced.to_string(),
        };
        let request = cache.needs(&request).then_some(request);
        return Classification::new(Position::PipeSeparatorAfterIndex).with_request(request);
    }

    if previous == grammar::SEARCH {
        return Classification::new(Position::SourceKeyword);
    }

    if previous == grammar::STATS {
        state.clause = ClauseState::Stats { anchor: len };
        return Classification::new(Position::StatsFunction);
    }

    match state.clause.stats_phase(tokens) {
        Some(StatsPhase::FieldArgument) => {
            return field_position(Position::StatsFieldArg, state, cache);
        }
        Some(StatsPhase::By) => return Classification::new(Position::StatsByKeyword),
        Some(StatsPhase::GroupField) => {
            return field_position(Position::StatsGroupField, state, cache);
        }
        Some(StatsPhase::Complete) | None => {}
    }

    if previous == grammar::FIELDS {
        state.fields_list_mode = true;
        return field_position(Position::FieldsFirst, state, cache);
    }

    if previous == grammar::DEDUP {
        return field_position(Position::DedupField, state, cache);
    }

    if previous == grammar::WHERE {
        state.clause = ClauseState::Where { anchor: len };
        return field_position(Position::WhereField, state, cache);
    }

    match state.clause.where_phase(len) {
        Some(WherePhase::Equals) => {
            let field_type = state
                .active_index
                .as_deref()
                .and_then(|index| cache.field_type(index, previous));
            state.active_field = Some(ActiveField {
                name: previous.to_string(),
                field_type,
            });
            return Classification::new(Position::WhereEquals);
        }
        Some(WherePhase::Value) => {
            let request = values_request(state);
            return Classification::new(Position::WhereValue).with_request(request);
        }
        Some(WherePhase::Complete) => return Classification::new(Position::ClauseComplete),
        None => {}
    }

    if state.clause.stats_phase(tokens) == Some(StatsPhase::Complete) {
        return Classification::new(Position::ClauseComplete);
    }

    if state.fields_list_mode {
        return Classification::new(Position::FieldListOrPipe);
    }

    Classification::new(Position::None)
}

fn indices_request(cache: &MetadataCache) -> Option<MetadataRequest> {
    let request = MetadataRequest::Indices;
    cache.needs(&request).then_some(request)
}

/// A field-valued position; asks for the active index's fields if absent.
fn field_position(
    position: Position,
    state: &SessionState,
    cache: &MetadataCache,
) -> Classification {
    let request = state.active_index.as_ref().and_then(|index| {
        let request = MetadataRequest::Fields {
            index: index.clone(),
        };
        cache.needs(&request).then_some(request)
    });
    Classification::new(position).with_request(request)
}

/// Values are sampled only when the field and its type are known and the
/// type has a textual form.
fn values_request(state: &SessionState) -> Option<MetadataRequest> {
    let index = state.active_index.as_ref()?;
    let field = state.active_field.as_ref()?;
    let field_type = field.field_type.clone()?;
    if field_type == crate::metadata::FieldType::GeoPoint {
        return None;
    }
    Some(MetadataRequest::Values {
        index: index.clone(),
        field: field.name.clone(),
        field_type,
    })
}
