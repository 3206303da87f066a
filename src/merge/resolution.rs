use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller's choice per conflicting server name: `true` prefers the source.
pub type ConflictResolutions = HashMap<String, bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// The migrating IDE's definition replaced the target's
    Source,
    /// The target's definition was kept
    Target,
}

impl Winner {
    /// Unresolved conflicts keep the target's definition.
    pub fn from_preference(prefer_source: Option<bool>) -> Self {
        if prefer_source.unwrap_or(false) {
            Self::Source
        } else {
            Self::Target
        }
    }
}

impl Default for Winner {
    fn default() -> Self {
        Self::Target
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConflict {
    pub name: String,
    pub winner: Winner,
}
