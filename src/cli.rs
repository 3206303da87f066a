use crate::registry::Ide;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mcp-ferry",
    about = "Migrate MCP server configurations between AI IDEs",
    long_about = "mcp-ferry copies MCP (Model Context Protocol) server definitions from one AI IDE's
configuration file into another's.

It:
  • Appends servers the target does not have yet
  • Leaves identical servers untouched
  • Keeps the target's definition when both sides differ, unless told otherwise
  • Backs up the target file and replaces it atomically

Supported IDEs: cursor, windsurf, windsurf-next, cline, roo, claude-desktop

Optional settings are read from:
  • $XDG_CONFIG_HOME/mcp-ferry/config.toml (or the platform config directory)",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output (shows INFO and DEBUG messages)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Enable trace output (shows all log messages including TRACE)
    #[arg(short = 't', long, global = true)]
    pub trace: bool,

    /// Home directory that IDE config paths are resolved against
    #[arg(long, global = true, env = "MCP_FERRY_HOME", value_hint = clap::ValueHint::DirPath)]
    pub home: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge one IDE's MCP servers into other IDEs' config files
    #[command(long_about = "Merge one IDE's MCP servers into other IDEs' config files.

For every target:
  1. Reads the source and target config files (a missing target starts empty)
  2. Adds servers that only the source defines
  3. Resolves servers defined differently on both sides
     (the target's definition wins unless --prefer-source names the server)
  4. Backs up the target file as <file>.<timestamp>.bak
  5. Writes the merged file through a temporary file and rename

Examples:
  # Copy Cursor's servers into Windsurf
  mcp-ferry migrate --from cursor --to windsurf

  # Several targets at once
  mcp-ferry migrate --from cursor --to windsurf --to cline --to roo

  # Take Cursor's definition of 'github' when both sides define it
  mcp-ferry migrate --from cursor --to windsurf --prefer-source github

  # Preview without writing
  mcp-ferry migrate --from cursor --to windsurf --dry-run")]
    Migrate(MigrateArgs),

    /// Show what a migration would add and which servers conflict
    Diff(DiffArgs),

    /// List supported IDEs and their config file locations
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// IDE to copy servers from (defaults to [default].from in config.toml)
    #[arg(short, long, value_enum)]
    pub from: Option<Ide>,

    /// IDE(s) to copy servers into
    #[arg(long, value_enum, required = true, num_args = 1..)]
    pub to: Vec<Ide>,

    /// Skip the backup of each target file
    #[arg(long)]
    pub no_backup: bool,

    /// Preview changes without writing them
    #[arg(short, long)]
    pub dry_run: bool,

    /// Take the source's definition for this conflicting server (repeatable)
    #[arg(short = 's', long, value_name = "NAME")]
    pub prefer_source: Vec<String>,

    /// Keep the target's definition for this conflicting server (repeatable)
    #[arg(short = 'k', long, value_name = "NAME")]
    pub prefer_target: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// IDE to copy servers from (defaults to [default].from in config.toml)
    #[arg(short, long, value_enum)]
    pub from: Option<Ide>,

    /// IDE to compare against
    #[arg(long, value_enum)]
    pub to: Ide,

    /// Print the comparison as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}
