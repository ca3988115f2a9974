// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//!
//! Output formatters for suggestion lists and session inspection.
//!
//! Every printable result is first turned into a [`Listing`] (column names,
//! string rows, and the JSON form of the source data) and then rendered as a
//! `comfy-table` table, pretty JSON, or CSV.

use comfy_table::{Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use ppl_autocomplete::{IndexFields, SessionState, SuggestionBatch};
use ppl_metadata_client::types::ClusterInfo;

/// Available output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "Unknown format '{other}'. Valid formats: table, json, csv"
            )),
        }
    }
}

/// Tabular view of a result plus its JSON form.
#[derive(Debug, Clone)]
pub struct Listing {
    columns: Vec<&'static str>,
    rows: Vec<Vec<String>>,
    json: Value,
    /// Singular and plural noun for the row-count footer.
    noun: (&'static str, &'static str),
}

impl Listing {
    fn new<T: Serialize>(
        columns: Vec<&'static str>,
        noun: (&'static str, &'static str),
        source: &T,
    ) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            json: serde_json::to_value(source).unwrap_or(Value::Null),
            noun,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(&self.json).unwrap_or_else(|_| self.json.to_string())
            }
            OutputFormat::Table => self.render_table(),
            OutputFormat::Csv => self.render_csv(),
        }
    }

    fn render_table(&self) -> String {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(self.columns.iter().map(|c| Cell::new(c)));
        for row in &self.rows {
            let cells: Vec<Cell> = row.iter().map(Cell::new).collect();
            table.add_row(cells);
        }

        let count = self.rows.len();
        let noun = if count == 1 { self.noun.0 } else { self.noun.1 };
        format!("{table}\n({count} {noun})")
    }

    fn render_csv(&self) -> String {
        let mut output = self.columns.join(",");
        output.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|cell| csv_escape(cell)).collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }
        output
    }
}

/// Suggestions for one input line.
pub fn suggestions(batch: &SuggestionBatch) -> Listing {
    let mut listing = Listing::new(
        vec!["completion", "label", "type", "docs"],
        ("suggestion", "suggestions"),
        &batch.items,
    );
    listing.rows = batch
        .items
        .iter()
        .map(|item| {
            let meta = item.meta.as_ref();
            vec![
                item.suggestion_tail.clone(),
                item.label.clone(),
                meta.and_then(|m| m.field_type.as_ref())
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                meta.and_then(|m| m.doc_count)
                    .map(|count| count.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    listing
}

/// Cached index names.
pub fn indices(names: &[String]) -> Listing {
    let mut listing = Listing::new(vec!["index"], ("index", "indices"), &names);
    listing.rows = names.iter().map(|name| vec![name.clone()]).collect();
    listing
}

/// The resident field list.
pub fn fields(fields: &IndexFields) -> Listing {
    let mut listing = Listing::new(vec!["field", "type"], ("field", "fields"), fields);
    listing.rows = fields
        .fields
        .iter()
        .map(|field| vec![field.name.clone(), field.field_type.to_string()])
        .collect();
    listing
}

/// Session state as key/value rows.
pub fn session(state: &SessionState) -> Listing {
    let mut listing = Listing::new(vec!["key", "value"], ("entry", "entries"), state);
    listing.rows = key_value_rows(&listing.json);
    listing
}

/// Cluster identity as key/value rows.
pub fn cluster(info: &ClusterInfo) -> Listing {
    let mut listing = Listing::new(vec!["key", "value"], ("entry", "entries"), info);
    listing.rows = key_value_rows(&listing.json);
    listing
}

fn key_value_rows(value: &Value) -> Vec<Vec<String>> {
    let Value::Object(map) = value else {
        return Vec::new();
    };
    map.iter()
        .map(|(key, value)| vec![key.clone(), cell_text(value)])
        .collect()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escape a cell per RFC 4180.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppl_autocomplete::{FieldDescriptor, FieldType, Position, Suggestion, SuggestionMeta};

    fn batch() -> SuggestionBatch {
        SuggestionBatch {
            input: "source = logs | where status = ".into(),
            generation: 3,
            position: Position::WhereValue,
            items: vec![Suggestion {
                label: "source = logs | where status = \"a,b\"".into(),
                replacement_input: "source = logs | where status = ".into(),
                suggestion_tail: "\"a,b\"".into(),
                item_name: Some("\"a,b\"".into()),
                meta: Some(SuggestionMeta {
                    doc_count: Some(12),
                    field_type: Some(FieldType::String),
                }),
            }],
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_suggestion_table() {
        let out = suggestions(&batch()).render(OutputFormat::Table);
        assert!(out.contains("completion"));
        assert!(out.contains("string"));
        assert!(out.contains("12"));
        assert!(out.ends_with("(1 suggestion)"));
    }

    #[test]
    fn test_suggestion_csv_escapes_quotes() {
        let out = suggestions(&batch()).render(OutputFormat::Csv);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("completion,label,type,docs"));
        assert_eq!(
            lines.next(),
            Some(r#""""a,b""","source = logs | where status = ""a,b""",string,12"#)
        );
    }

    #[test]
    fn test_suggestion_json_uses_camel_case() {
        let out = suggestions(&batch()).render(OutputFormat::Json);
        assert!(out.contains("\"suggestionTail\""));
        assert!(out.contains("\"docCount\": 12"));
    }

    #[test]
    fn test_field_listing() {
        let listing = fields(&IndexFields {
            index: "logs".into(),
            fields: vec![FieldDescriptor::new("bytes", FieldType::Integer)],
        });
        let out = listing.render(OutputFormat::Table);
        assert!(out.contains("bytes"));
        assert!(out.contains("integer"));
        assert!(out.ends_with("(1 field)"));
    }

    #[test]
    fn test_session_rows() {
        let state = SessionState {
            active_index: Some("logs".into()),
            ..Default::default()
        };
        let out = session(&state).render(OutputFormat::Csv);
        assert!(out.contains("active_index,logs"));
        assert!(out.contains("fields_list_mode,false"));
    }

    #[test]
    fn test_empty_listing() {
        let listing = indices(&[]);
        assert!(listing.is_empty());
        assert!(listing.render(OutputFormat::Table).ends_with("(0 indices)"));
    }
}
