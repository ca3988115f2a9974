// SPDX-License-Identifier: PMPL-1.0-or-later
//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AutocompleteError, Result};

/// Configuration for an [`crate::AutocompleteEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocompleteConfig {
    /// Drop indices whose name starts with `system_index_prefix`.
    pub hide_system_indices: bool,
    /// Prefix marking system indices.
    pub system_index_prefix: String,
    /// Request the index list as soon as the first command is being typed,
    /// so it is resident by the time `source=` is reached.
    pub prefetch_indices: bool,
}

impl AutocompleteConfig {
    /// Check the configuration for contradictory settings.
    pub fn validate(&self) -> Result<()> {
        if self.hide_system_indices && self.system_index_prefix.is_empty() {
            return Err(AutocompleteError::InvalidConfig(
                "system_index_prefix must not be empty while hide_system_indices is set"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Whether an index name should be offered as a completion.
    pub fn is_visible_index(&self, name: &str) -> bool {
        !(self.hide_system_indices && name.starts_with(&self.system_index_prefix))
    }
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            hide_system_indices: true,
            system_index_prefix: ".".to_string(),
            prefetch_indices: true,
        }
    }
}
