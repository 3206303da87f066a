use assert_fs::prelude::*;
use mcp_ferry::config::{reader, writer};
use mcp_ferry::{ConfigDocument, ServerDefinition};
use predicates::prelude::*;
use serde_json::json;
use std::fs;

#[cfg(test)]
mod tests {
    use super::*;

    fn document_with_server(name: &str, command: &str) -> ConfigDocument {
        let mut document = ConfigDocument::empty();
        document
            .servers
            .insert(name.to_string(), ServerDefinition::new(json!({"command": command})));
        document
    }

    #[test]
    fn test_write_creates_missing_parent_directories() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let target = temp_dir.child("a").child("b").child("mcp.json");

        writer::write_document(target.path(), "mcpServers", &document_with_server("s", "run"))
            .unwrap();

        target.assert(predicate::path::is_file());
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(target.path()).unwrap()).unwrap();
        assert_eq!(written, json!({"mcpServers": {"s": {"command": "run"}}}));
    }

    #[test]
    fn test_write_then_read_preserves_order() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let target = temp_dir.child("mcp.json");
        let mut document = ConfigDocument::empty();
        document.extras.insert("zeta".to_string(), json!(1));
        document.extras.insert("alpha".to_string(), json!({"b": 2, "a": 1}));
        for name in ["zulu", "mike", "alpha"] {
            document.servers.insert(name.to_string(), ServerDefinition::new(json!({"url": name})));
        }

        writer::write_document(target.path(), "mcpServers", &document).unwrap();
        let read_back = reader::read_config_document_at(target.path(), "mcpServers").unwrap();

        let names: Vec<&str> = read_back.servers.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zulu", "mike", "alpha"]);
        let extras: Vec<&str> = read_back.extras.keys().map(String::as_str).collect();
        assert_eq!(extras, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_commit_replaces_target() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let target = temp_dir.child("mcp.json");
        target.write_str(r#"{"mcpServers": {}}"#).unwrap();

        let staged =
            writer::stage_document(target.path(), "mcpServers", &document_with_server("n", "new"))
                .unwrap();
        let temp_path = staged.temp_path().to_path_buf();
        assert_eq!(staged.target(), target.path());
        assert_eq!(temp_path.parent(), target.path().parent());

        staged.commit().unwrap();

        target.assert(predicate::str::contains("\"new\""));
        assert!(!temp_path.exists());
    }

    #[test]
    fn test_uncommitted_stage_is_discarded() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let target = temp_dir.child("mcp.json");
        target.write_str("original").unwrap();

        let staged =
            writer::stage_document(target.path(), "mcpServers", &document_with_server("n", "new"))
                .unwrap();
        drop(staged);

        target.assert("original");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_backup_missing_file_is_none() {
        let temp_dir = assert_fs::TempDir::new().unwrap();

        let backup = writer::backup_file(temp_dir.child("absent.json").path(), true).unwrap();

        assert_eq!(backup, None);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_backup_disabled_is_none() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let target = temp_dir.child("mcp.json");
        target.write_str("{}").unwrap();

        assert_eq!(writer::backup_file(target.path(), false).unwrap(), None);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_backup_copies_content_beside_original() {
        let temp_dir = assert_fs::TempDir::new().unwrap();
        let target = temp_dir.child("mcp.json");
        target.write_str(r#"{"mcpServers": {"a": {}}}"#).unwrap();

        let backup = writer::backup_file(target.path(), true).unwrap().expect("backup path");

        assert_eq!(backup.parent(), Some(temp_dir.path()));
        assert_eq!(fs::read_to_string(&backup).unwrap(), r#"{"mcpServers": {"a": {}}}"#);
        let name = backup.file_name().unwrap().to_string_lossy().into_owned();
        // mcp.json.YYYYMMDD_HHMMSS.bak
        assert_eq!(name.len(), "mcp.json.".len() + 15 + ".bak".len());
        assert!(name.starts_with("mcp.json.") && name.ends_with(".bak"));
    }
}
