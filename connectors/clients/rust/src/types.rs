// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Wire types specific to the HTTP transport.
//!
//! Metadata payloads (index listings, mappings, aggregations) are shared with
//! the engine and live in `ppl_autocomplete::metadata`.

use serde::{Deserialize, Serialize};

/// Error body returned by OpenSearch-compatible clusters.
///
/// `error` is either a structured cause or, on some proxies, a plain string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
    #[serde(default)]
    pub status: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Cause {
        #[serde(rename = "type", default)]
        kind: Option<String>,
        reason: String,
    },
    Message(String),
}

impl ErrorResponse {
    /// Human-readable reason.
    pub fn message(&self) -> String {
        match &self.error {
            ErrorDetail::Cause {
                kind: Some(kind),
                reason,
            } => format!("{kind}: {reason}"),
            ErrorDetail::Cause { kind: None, reason } => reason.clone(),
            ErrorDetail::Message(message) => message.clone(),
        }
    }
}

/// Cluster information from `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub version: Option<serde_json::Value>,
}
