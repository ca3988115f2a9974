// SPDX-License-Identifier: PMPL-1.0-or-later
//! Backend metadata: wire shapes and their logical form.
//!
//! The wire types mirror the search-index REST API exactly (`_cat/indices`,
//! `_mapping`, and a `terms` aggregation named `top_tags`). They are mapped
//! into [`FieldDescriptor`] and [`SampledValue`] here and never altered.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AutocompleteError, Result};

// ---------------------------------------------------------------------------
// Logical types
// ---------------------------------------------------------------------------

/// Logical field type.
///
/// `keyword` collapses to [`FieldType::String`]; backend types without a
/// dedicated variant are kept verbatim in [`FieldType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    GeoPoint,
    Other(String),
}

impl FieldType {
    /// Map a backend mapping type onto its logical type.
    pub fn from_backend(raw: &str) -> Self {
        match raw {
            "keyword" | "string" => FieldType::String,
            "integer" => FieldType::Integer,
            "float" => FieldType::Float,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "geo_point" => FieldType::GeoPoint,
            other => FieldType::Other(other.to_string()),
        }
    }

    /// Types accepted as an aggregate-function argument.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Date => write!(f, "date"),
            FieldType::GeoPoint => write!(f, "geo_point"),
            FieldType::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// A field of an index with its logical type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// A distinct field value sampled from the backend, in display form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampledValue {
    pub label: String,
    pub doc_count: u64,
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One row of the index listing. Extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub index: String,
}

/// `GET /{index}/_mapping` response: index name → mapping.
pub type MappingResponse = HashMap<String, IndexMapping>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexMapping {
    #[serde(default)]
    pub mappings: Mappings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mappings {
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyMapping>,
}

/// A mapped property. Object properties carry nested `properties` and no type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyMapping {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, PropertyMapping>>,
}

/// Search response carrying the value-sampling aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResponse {
    pub aggregations: Aggregations,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aggregations {
    pub top_tags: TermsAggregation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermsAggregation {
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub key: Value,
    #[serde(default)]
    pub doc_count: u64,
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Flatten the mapping of `index` into an ordered field list.
///
/// Nested object properties become dotted names (`host.name`); object nodes
/// themselves are not listed.
pub fn flatten_mapping(index: &str, response: &MappingResponse) -> Result<Vec<FieldDescriptor>> {
    let mapping = response
        .get(index)
        .ok_or_else(|| AutocompleteError::MissingIndex(index.to_string()))?;

    let mut fields = Vec::new();
    collect_fields("", &mapping.mappings.properties, &mut fields);
    Ok(fields)
}

fn collect_fields(
    parent: &str,
    properties: &BTreeMap<String, PropertyMapping>,
    out: &mut Vec<FieldDescriptor>,
) {
    for (name, property) in properties {
        let path = if parent.is_empty() {
            name.clone()
        } else {
            format!("{parent}.{name}")
        };

        if let Some(raw) = &property.field_type {
            out.push(FieldDescriptor::new(path.clone(), FieldType::from_backend(raw)));
        }
        if let Some(children) = &property.properties {
            collect_fields(&path, children, out);
        }
    }
}

/// Map aggregation buckets into display values for a field of `field_type`.
///
/// Strings are double-quoted, booleans render as `True`/`False`, geo points
/// are dropped, everything else is the raw key.
pub fn sampled_values(field_type: &FieldType, buckets: &[Bucket]) -> Vec<SampledValue> {
    buckets
        .iter()
        .filter_map(|bucket| {
            let label = match field_type {
                FieldType::GeoPoint => return None,
                FieldType::String => format!("\"{}\"", key_text(&bucket.key)),
                FieldType::Boolean => {
                    if is_true_key(&bucket.key) {
                        "True".to_string()
                    } else {
                        "False".to_string()
                    }
                }
                _ => key_text(&bucket.key),
            };
            Some(SampledValue {
                label,
                doc_count: bucket.doc_count,
            })
        })
        .collect()
}

/// Request body for sampling the `size` most frequent values of `field`.
pub fn value_sample_query(field: &str, size: usize) -> Value {
    serde_json::json!({
        "size": 0,
        "aggs": {
            "top_tags": {
                "terms": { "field": field, "size": size }
            }
        }
    })
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_true_key(key: &Value) -> bool {
    key.as_i64() == Some(1) || key.as_bool() == Some(true)
}
