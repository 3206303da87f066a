use crate::fixtures::TestFixture;
use mcp_ferry::tool::{call_migrate, input_schema, TOOL_NAME};
use mcp_ferry::Ide;
use serde_json::json;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tool_call_with_resolution() {
        let fixture = TestFixture::new().unwrap();
        fixture.with_ide_config(Ide::Cursor, r#"{"mcpServers": {"a": {"command": "x"}}}"#).unwrap();
        fixture
            .with_ide_config(Ide::Windsurf, r#"{"mcpServers": {"a": {"command": "y"}}, "other": 1}"#)
            .unwrap();

        let response = call_migrate(
            &fixture.migrator(),
            json!({
                "from_ide": "cursor",
                "to_ide": "windsurf",
                "conflict_resolutions": {"a": true}
            }),
        );

        assert_eq!(response["success"], json!(true));
        assert_eq!(response["resolved"], json!([{"name": "a", "winner": "source"}]));
        assert!(response["backup_path"].is_string());
        assert_eq!(
            fixture.read_ide_config(Ide::Windsurf),
            json!({"mcpServers": {"a": {"command": "x"}}, "other": 1})
        );
    }

    #[test]
    fn test_tool_call_backup_false() {
        let fixture = TestFixture::new().unwrap();
        fixture.with_ide_config(Ide::Cursor, r#"{"mcpServers": {"a": {"command": "x"}}}"#).unwrap();
        fixture.with_ide_config(Ide::Roo, r#"{"mcpServers": {}}"#).unwrap();

        let response = call_migrate(
            &fixture.migrator(),
            json!({"from_ide": "cursor", "to_ide": "roo", "backup": false}),
        );

        assert_eq!(response["success"], json!(true));
        assert_eq!(response["backup_path"], serde_json::Value::Null);
        assert!(fixture.backups(Ide::Roo).is_empty());
    }

    #[test]
    fn test_tool_call_failure_carries_kind_and_stage() {
        let fixture = TestFixture::new().unwrap();
        fixture.with_ide_config(Ide::Cursor, r#"{"mcpServers": {"a": {"command": "x"}}}"#).unwrap();
        fixture.with_ide_config(Ide::Cline, r#"{"mcpServers": "not-an-object"}"#).unwrap();

        let response =
            call_migrate(&fixture.migrator(), json!({"from_ide": "cursor", "to_ide": "cline"}));

        assert_eq!(response["success"], json!(false));
        assert_eq!(response["error"]["kind"], json!("MalformedConfig"));
        assert_eq!(response["error"]["stage"], json!("source_loaded"));
        assert_eq!(response["added"], json!([]));
    }

    #[test]
    fn test_tool_call_unknown_ide() {
        let fixture = TestFixture::new().unwrap();

        let response =
            call_migrate(&fixture.migrator(), json!({"from_ide": "vim", "to_ide": "cursor"}));

        assert_eq!(response["error"]["kind"], json!("UnknownIDE"));
        assert_eq!(response["error"]["stage"], json!("idle"));
    }

    #[test]
    fn test_tool_call_non_object_arguments() {
        let fixture = TestFixture::new().unwrap();

        let response = call_migrate(&fixture.migrator(), json!(["cursor", "windsurf"]));

        assert_eq!(response["success"], json!(false));
        assert_eq!(response["error"]["kind"], json!("InvalidRequest"));
    }

    #[test]
    fn test_tool_registration_metadata() {
        assert_eq!(TOOL_NAME, "migrate_mcp_config");
        assert_eq!(input_schema()["properties"]["backup"]["default"], json!(true));
    }
}
