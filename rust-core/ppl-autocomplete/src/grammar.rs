// SPDX-License-Identifier: PMPL-1.0-or-later
//! Static PPL vocabulary.

/// Commands that may open a query.
pub const FIRST_COMMANDS: &[&str] = &["index", "search", "source"];

/// Commands that may follow a `|`.
pub const PIPE_COMMANDS: &[&str] = &[
    "dedup", "eval", "fields", "head", "rare", "rename", "sort", "stats", "top", "where",
];

/// Aggregate functions offered after `stats`. Everything except `count()`
/// is left open for a field argument.
pub const STATS_FUNCTIONS: &[&str] = &[
    "count()",
    "sum(",
    "avg(",
    "max(",
    "min(",
    "var_samp(",
    "var_pop(",
    "stddev_samp(",
    "stddev_pop(",
];

/// Keywords that select the index a query reads from.
pub const SOURCE_KEYWORDS: &[&str] = &["source", "index"];

pub const PIPE: &str = "|";
pub const SEARCH: &str = "search";
pub const STATS: &str = "stats";
pub const FIELDS: &str = "fields";
pub const DEDUP: &str = "dedup";
pub const WHERE: &str = "where";
pub const BY: &str = "by";
pub const COUNT: &str = "count()";

/// Whether `token` is `source` or `index`.
pub fn is_source_keyword(token: &str) -> bool {
    SOURCE_KEYWORDS.contains(&token)
}

/// Split an inline assignment such as `source=logs` into keyword and value.
///
/// Returns `None` unless the token starts with `source=` or `index=`.
pub fn split_source_assignment(token: &str) -> Option<(&str, &str)> {
    let (keyword, value) = token.split_once('=')?;
    is_source_keyword(keyword).then_some((keyword, value))
}

/// The index a token refers to: the value of an inline assignment, or the
/// token itself.
pub fn index_reference(token: &str) -> &str {
    split_source_assignment(token).map_or(token, |(_, value)| value)
}

/// Whether a stats function token still expects a separate field argument.
pub fn takes_field_argument(function: &str) -> bool {
    function != COUNT && function.ends_with('(')
}

/// Every keyword the engine knows, for highlighters and similar consumers.
pub fn all_keywords() -> impl Iterator<Item = &'static str> {
    FIRST_COMMANDS
        .iter()
        .chain(PIPE_COMMANDS)
        .chain([BY].iter())
        .copied()
}
