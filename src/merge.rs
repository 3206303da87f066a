#![allow(clippy::self_named_module_files)]

use crate::config::{ServerDefinition, ServerMap};
use std::collections::HashSet;
use tracing::debug;

pub mod resolution;

pub use resolution::{ConflictResolutions, ResolvedConflict, Winner};

/// A server name defined differently on both sides of a migration
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub name: String,
    pub source: ServerDefinition,
    pub target: ServerDefinition,
}

/// Result of merging two server maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub servers: ServerMap,
    /// Source-only names, appended in source order
    pub added: Vec<String>,
    /// Target names retained without contest, in target order
    pub kept: Vec<String>,
    pub resolved: Vec<ResolvedConflict>,
}

/// Detect conflicts between source and target MCP server configurations
///
/// Only names present on both sides are compared. Output follows the source's order.
pub fn detect_conflicts(source: &ServerMap, target: &ServerMap) -> Vec<Conflict> {
    source
        .iter()
        .filter_map(|(name, source_definition)| {
            let target_definition = target.get(name)?;
            (source_definition != target_definition).then(|| Conflict {
                name: name.clone(),
                source: source_definition.clone(),
                target: target_definition.clone(),
            })
        })
        .collect()
}

/// Merges source servers into target servers.
///
/// Target order is preserved and source-only servers are appended. Identical
/// shared servers are left alone. Each conflict goes to the side named in
/// `resolutions`; without an entry the target's definition stays.
pub fn merge_servers(
    source: &ServerMap,
    target: &ServerMap,
    conflicts: &[Conflict],
    resolutions: &ConflictResolutions,
) -> MergeOutcome {
    let conflicted: HashSet<&str> = conflicts.iter().map(|c| c.name.as_str()).collect();

    let mut servers = target.clone();
    let kept = target.keys().filter(|name| !conflicted.contains(name.as_str())).cloned().collect();

    let mut added = Vec::new();
    for (name, definition) in source {
        if !target.contains_key(name) {
            servers.insert(name.clone(), definition.clone());
            added.push(name.clone());
        }
    }

    let mut resolved = Vec::with_capacity(conflicts.len());
    for conflict in conflicts {
        let winner = Winner::from_preference(resolutions.get(&conflict.name).copied());
        if winner == Winner::Source {
            // IndexMap::insert keeps the existing slot, so target order survives.
            servers.insert(conflict.name.clone(), conflict.source.clone());
        }
        debug!("Conflict on '{}' resolved in favor of {:?}", conflict.name, winner);
        resolved.push(ResolvedConflict { name: conflict.name.clone(), winner });
    }

    MergeOutcome { servers, added, kept, resolved }
}
