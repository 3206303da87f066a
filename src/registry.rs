//! Catalog of supported IDEs and where each one keeps its MCP server config.
//!
//! Every location is relative to a home directory handed in by the caller, so
//! nothing here reads the process environment.

use crate::MigrationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// JSON key holding the server map in every supported IDE.
pub const MCP_SERVERS_KEY: &str = "mcpServers";

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Ide {
    Cursor,
    Windsurf,
    WindsurfNext,
    Cline,
    Roo,
    ClaudeDesktop,
}

impl Ide {
    pub const ALL: [Self; 6] =
        [Self::Cursor, Self::Windsurf, Self::WindsurfNext, Self::Cline, Self::Roo, Self::ClaudeDesktop];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Cursor => "cursor",
            Self::Windsurf => "windsurf",
            Self::WindsurfNext => "windsurf-next",
            Self::Cline => "cline",
            Self::Roo => "roo",
            Self::ClaudeDesktop => "claude-desktop",
        }
    }
}

impl fmt::Display for Ide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Ide {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|ide| ide.id() == normalized)
            .ok_or_else(|| MigrationError::UnknownIde(s.to_string()))
    }
}

/// How a config file is located beneath the home directory.
#[derive(Debug, Clone, Copy)]
enum ConfigLocation {
    HomeRelative(&'static str),
    /// Lives in the platform's per-user application data directory.
    AppData(&'static str),
    /// Settings file owned by a VS Code extension (globalStorage).
    VsCodeExtension { extension_id: &'static str, filename: &'static str },
}

impl ConfigLocation {
    fn resolve(self, home: &Path) -> PathBuf {
        match self {
            Self::HomeRelative(relative) => join_relative(home, relative),
            Self::AppData(relative) => join_relative(&join_relative(home, app_data_dir()), relative),
            Self::VsCodeExtension { extension_id, filename } => {
                join_relative(home, vscode_global_storage_dir())
                    .join(extension_id)
                    .join("settings")
                    .join(filename)
            },
        }
    }
}

const fn catalog_location(ide: Ide) -> ConfigLocation {
    match ide {
        Ide::Cursor => ConfigLocation::HomeRelative(".cursor/mcp.json"),
        Ide::Windsurf => ConfigLocation::HomeRelative(".codeium/windsurf/mcp_config.json"),
        Ide::WindsurfNext => ConfigLocation::HomeRelative(".codeium/windsurf-next/mcp_config.json"),
        Ide::Cline => ConfigLocation::VsCodeExtension {
            extension_id: "saoudrizwan.claude-dev",
            filename: "cline_mcp_settings.json",
        },
        Ide::Roo => ConfigLocation::VsCodeExtension {
            extension_id: "rooveterinaryinc.roo-cline",
            filename: "mcp_settings.json",
        },
        Ide::ClaudeDesktop => ConfigLocation::AppData("Claude/claude_desktop_config.json"),
    }
}

fn join_relative(base: &Path, relative: &str) -> PathBuf {
    relative.split('/').fold(base.to_path_buf(), |path, segment| path.join(segment))
}

#[cfg(target_os = "macos")]
const fn app_data_dir() -> &'static str {
    "Library/Application Support"
}

#[cfg(windows)]
const fn app_data_dir() -> &'static str {
    "AppData/Roaming"
}

#[cfg(not(any(target_os = "macos", windows)))]
const fn app_data_dir() -> &'static str {
    ".config"
}

#[cfg(target_os = "macos")]
const fn vscode_global_storage_dir() -> &'static str {
    "Library/Application Support/Code/User/globalStorage"
}

#[cfg(windows)]
const fn vscode_global_storage_dir() -> &'static str {
    "AppData/Roaming/Code/User/globalStorage"
}

#[cfg(not(any(target_os = "macos", windows)))]
const fn vscode_global_storage_dir() -> &'static str {
    ".config/Code/User/globalStorage"
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeSchema {
    pub ide: Ide,
    pub path: PathBuf,
    pub server_key: &'static str,
}

/// Resolves IDE identifiers to concrete config locations for one home directory.
///
/// Overrides replace the catalog path for a single IDE; relative overrides and
/// `~/` prefixes are taken relative to the home directory.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    home: PathBuf,
    overrides: BTreeMap<Ide, PathBuf>,
}

impl SchemaRegistry {
    pub fn new<P: Into<PathBuf>>(home: P) -> Self {
        Self { home: home.into(), overrides: BTreeMap::new() }
    }

    #[must_use]
    pub fn with_override<P: AsRef<Path>>(mut self, ide: Ide, path: P) -> Self {
        let path = path.as_ref();
        let resolved = match path.strip_prefix("~") {
            Ok(rest) => self.home.join(rest),
            Err(_) if path.is_relative() => self.home.join(path),
            Err(_) => path.to_path_buf(),
        };
        self.overrides.insert(ide, resolved);
        self
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn schema(&self, ide: Ide) -> IdeSchema {
        let path = self
            .overrides
            .get(&ide)
            .cloned()
            .unwrap_or_else(|| catalog_location(ide).resolve(&self.home));

        IdeSchema { ide, path, server_key: MCP_SERVERS_KEY }
    }

    /// Looks up an IDE by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::UnknownIde`] when the identifier is not in the catalog.
    pub fn resolve(&self, ide_id: &str) -> Result<IdeSchema, MigrationError> {
        let ide: Ide = ide_id.parse()?;
        Ok(self.schema(ide))
    }

    pub fn schemas(&self) -> impl Iterator<Item = IdeSchema> + '_ {
        Ide::ALL.into_iter().map(|ide| self.schema(ide))
    }
}
