// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <j.d.a.jewell@open.ac.uk>

//! Connection settings for [`MetadataClient`](crate::client::MetadataClient).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::Auth;
use crate::error::{ClientError, Result};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Number of terms buckets requested when sampling field values.
pub const DEFAULT_VALUE_SAMPLE_SIZE: usize = 10;

/// Everything needed to reach a cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL including scheme and port, e.g. `http://localhost:9200`.
    pub base_url: String,
    pub auth: Auth,
    pub timeout_ms: u64,
    /// `size` of the terms aggregation used for value suggestions.
    pub value_sample_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            auth: Auth::None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            value_sample_size: DEFAULT_VALUE_SAMPLE_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject settings that cannot produce a working client.
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ClientError::Validation("timeout must be non-zero".into()));
        }
        if self.value_sample_size == 0 {
            return Err(ClientError::Validation(
                "value_sample_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
