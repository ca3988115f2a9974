// SPDX-License-Identifier: PMPL-1.0-or-later
//! Candidate generation and prefix filtering.
//!
//! Every position produces raw candidates (a keyword table, cached metadata,
//! sampled values, or an appended symbol) which pass through one filter: the
//! candidate text must start with the prefix and must not equal it.

use serde::{Deserialize, Serialize};

use crate::cache::MetadataCache;
use crate::classifier::Position;
use crate::grammar;
use crate::metadata::{FieldDescriptor, FieldType, SampledValue};
use crate::session::SessionState;
use crate::tokenizer::Tokens;

/// Optional details shown next to a suggestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
}

/// A display-ready completion.
///
/// `label` is the full query after applying the suggestion and always equals
/// `replacement_input + suggestion_tail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub label: String,
    pub replacement_input: String,
    pub suggestion_tail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SuggestionMeta>,
}

/// A raw candidate before filtering.
#[derive(Debug, Clone)]
struct Candidate {
    /// Text matched against the prefix and substituted for it.
    text: String,
    /// Attach to the previous token instead of replacing the prefix alone.
    glued: bool,
    item_name: Option<String>,
    meta: Option<SuggestionMeta>,
}

impl Candidate {
    fn keyword(text: &str) -> Self {
        Self {
            text: text.to_string(),
            glued: false,
            item_name: Some(text.to_string()),
            meta: None,
        }
    }

    fn symbol(text: &str) -> Self {
        Self {
            text: text.to_string(),
            glued: false,
            item_name: None,
            meta: None,
        }
    }

    fn glued_symbol(text: &str) -> Self {
        Self {
            glued: true,
            ..Self::symbol(text)
        }
    }

    fn field(field: &FieldDescriptor) -> Self {
        Self {
            text: field.name.clone(),
            glued: false,
            item_name: Some(field.name.clone()),
            meta: Some(SuggestionMeta {
                doc_count: None,
                field_type: Some(field.field_type.clone()),
            }),
        }
    }
}

/// Produce the filtered suggestions for a classified position.
///
/// `values` holds a fresh sample for [`Position::WhereValue`] and is ignored
/// elsewhere.
pub fn generate(
    position: &Position,
    tokens: &Tokens<'_>,
    state: &SessionState,
    cache: &MetadataCache,
    values: &[SampledValue],
) -> Vec<Suggestion> {
    let candidates: Vec<Candidate> = match position {
        Position::FirstCommand => keywords(grammar::FIRST_COMMANDS),
        Position::PipeCommand => keywords(grammar::PIPE_COMMANDS),
        Position::StatsFunction => keywords(grammar::STATS_FUNCTIONS),
        Position::SourceKeyword => keywords(&[grammar::SOURCE_KEYWORDS[0]]),
        Position::EqualsAfterSource | Position::WhereEquals => vec![Candidate::symbol("=")],
        Position::PipeSeparatorAfterIndex | Position::ClauseComplete => {
            vec![Candidate::symbol(grammar::PIPE)]
        }
        Position::StatsByKeyword => vec![Candidate::symbol(grammar::BY)],
        Position::FieldListOrPipe => {
            vec![Candidate::glued_symbol(","), Candidate::symbol(grammar::PIPE)]
        }
        Position::IndexName => cache.indices().iter().map(|i| Candidate::keyword(i)).collect(),
        Position::InlineIndexName { keyword } => cache
            .indices()
            .iter()
            .map(|index| Candidate {
                text: format!("{keyword}={index}"),
                glued: false,
                item_name: Some(index.clone()),
                meta: None,
            })
            .collect(),
        Position::FieldListContinuation
        | Position::StatsGroupField
        | Position::FieldsFirst
        | Position::DedupField
        | Position::WhereField => active_fields(state, cache).iter().map(Candidate::field).collect(),
        Position::StatsFieldArg => active_fields(state, cache)
            .iter()
            .filter(|field| field.field_type.is_numeric())
            .map(|field| Candidate {
                text: format!("{})", field.name),
                glued: true,
                ..Candidate::field(field)
            })
            .collect(),
        Position::WhereValue => values
            .iter()
            .map(|value| Candidate {
                text: value.label.clone(),
                glued: false,
                item_name: Some(value.label.clone()),
                meta: Some(SuggestionMeta {
                    doc_count: Some(value.doc_count),
                    field_type: state.active_field.as_ref().and_then(|f| f.field_type.clone()),
                }),
            })
            .collect(),
        Position::None => Vec::new(),
    };

    filter(tokens, candidates)
}

fn keywords(table: &[&str]) -> Vec<Candidate> {
    table.iter().map(|keyword| Candidate::keyword(keyword)).collect()
}

fn active_fields<'c>(state: &SessionState, cache: &'c MetadataCache) -> &'c [FieldDescriptor] {
    state
        .active_index
        .as_deref()
        .and_then(|index| cache.fields_for(index))
        .unwrap_or(&[])
}

/// Keep candidates that extend the prefix and build their suggestion records.
fn filter(tokens: &Tokens<'_>, candidates: Vec<Candidate>) -> Vec<Suggestion> {
    let prefix = tokens.prefix();
    candidates
        .into_iter()
        .filter(|candidate| candidate.text.starts_with(prefix) && candidate.text != prefix)
        .map(|candidate| {
            let head = if candidate.glued {
                tokens.glued_head()
            } else {
                tokens.head()
            };
            let replacement_input = format!("{head}{prefix}");
            let suggestion_tail = candidate.text[prefix.len()..].to_string();
            Suggestion {
                label: format!("{replacement_input}{suggestion_tail}"),
                replacement_input,
                suggestion_tail,
                item_name: candidate.item_name,
                meta: candidate.meta,
            }
        })
        .collect()
}
