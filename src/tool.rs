//! Tool-call boundary for hosting the migration engine behind an MCP server.
//!
//! The transport layer hands over the already-parsed `arguments` object and
//! sends back whatever [`call_migrate`] returns. Every outcome, including bad
//! arguments, comes back as a well-formed result object.

use crate::merge::ConflictResolutions;
use crate::migrate::{MigrationRequest, MigrationResult, MigrationState, Migrator};
use crate::registry::Ide;
use crate::MigrationError;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

pub const TOOL_NAME: &str = "migrate_mcp_config";

pub const TOOL_DESCRIPTION: &str = "Copy MCP server definitions from one AI IDE's config into \
                                    another's, keeping the target's definition on conflicts unless \
                                    told otherwise.";

const fn default_backup() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct MigrateArguments {
    pub from_ide: String,
    pub to_ide: String,
    #[serde(default = "default_backup")]
    pub backup: bool,
    #[serde(default)]
    pub conflict_resolutions: ConflictResolutions,
    #[serde(default)]
    pub dry_run: bool,
}

impl From<MigrateArguments> for MigrationRequest {
    fn from(args: MigrateArguments) -> Self {
        Self::new(args.from_ide, args.to_ide)
            .with_backup(args.backup)
            .with_dry_run(args.dry_run)
            .with_resolutions(args.conflict_resolutions)
    }
}

/// JSON Schema of the tool's arguments, for tool registration.
pub fn input_schema() -> Value {
    let ides: Vec<&str> = Ide::ALL.iter().map(|ide| ide.id()).collect();
    json!({
        "type": "object",
        "properties": {
            "from_ide": {
                "type": "string",
                "enum": ides,
                "description": "IDE whose MCP servers are copied"
            },
            "to_ide": {
                "type": "string",
                "enum": ides,
                "description": "IDE whose config file receives the servers"
            },
            "backup": {
                "type": "boolean",
                "default": true,
                "description": "Back up the target config file before writing"
            },
            "conflict_resolutions": {
                "type": "object",
                "additionalProperties": {"type": "boolean"},
                "default": {},
                "description": "Server name to true (take the source's definition) or false (keep the target's)"
            },
            "dry_run": {
                "type": "boolean",
                "default": false,
                "description": "Report what would change without writing"
            }
        },
        "required": ["from_ide", "to_ide"]
    })
}

/// Handle one `migrate_mcp_config` tool call.
pub fn call_migrate(migrator: &Migrator, arguments: Value) -> Value {
    let result = match MigrateArguments::deserialize(&arguments) {
        Ok(args) => {
            debug!("Tool call {TOOL_NAME}: {} -> {}", args.from_ide, args.to_ide);
            migrator.migrate(&args.into())
        },
        Err(e) => invalid_arguments(&arguments, &e),
    };

    serde_json::to_value(&result).unwrap_or_else(|e| {
        json!({
            "success": false,
            "error": {"kind": "InvalidRequest", "detail": format!("failed to encode result: {e}")}
        })
    })
}

fn invalid_arguments(arguments: &Value, error: &serde_json::Error) -> MigrationResult {
    let field = |name: &str| {
        arguments.get(name).and_then(Value::as_str).unwrap_or_default().to_string()
    };
    let request = MigrationRequest::new(field("from_ide"), field("to_ide"));
    MigrationResult::failed(
        &request,
        None,
        &MigrationError::InvalidRequest(format!("invalid arguments: {error}")),
        MigrationState::Idle,
    )
}
