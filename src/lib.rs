#![allow(missing_docs)]

use std::path::PathBuf;

pub mod app_config;
pub mod cli;
pub mod config;
pub mod merge;
pub mod migrate;
pub mod registry;
pub mod tool;
pub mod validation;

pub use config::{ConfigDocument, ServerDefinition, ServerMap};
pub use merge::{detect_conflicts, merge_servers, Conflict, ConflictResolutions, Winner};
pub use migrate::{MigrationRequest, MigrationResult, Migrator};
pub use registry::{Ide, IdeSchema, SchemaRegistry};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Unknown IDE '{0}' (supported: cursor, windsurf, windsurf-next, cline, roo, claude-desktop)")]
    UnknownIde(String),

    #[error("Malformed config at {}: {detail}", path.display())]
    MalformedConfig { path: PathBuf, detail: String },

    #[error("Failed to back up {}: {detail}", path.display())]
    BackupFailed { path: PathBuf, detail: String },

    #[error("Failed to write {}: {detail}", path.display())]
    WriteError { path: PathBuf, detail: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl MigrationError {
    /// Stable identifier reported in results.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownIde(_) => "UnknownIDE",
            Self::MalformedConfig { .. } => "MalformedConfig",
            Self::BackupFailed { .. } => "BackupFailed",
            Self::WriteError { .. } => "WriteError",
            Self::InvalidRequest(_) => "InvalidRequest",
        }
    }
}
