use super::ConfigDocument;
use crate::registry::IdeSchema;
use crate::MigrationError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Read the config document described by an IDE schema
///
/// # Errors
///
/// Returns [`MigrationError::MalformedConfig`] if the file exists but cannot be
/// read, is not valid JSON, or has the wrong shape.
pub fn read_config_document(schema: &IdeSchema) -> Result<ConfigDocument, MigrationError> {
    read_config_document_at(&schema.path, schema.server_key)
}

/// Read a config document from a path, yielding an empty document when the file is absent
///
/// # Errors
///
/// Returns [`MigrationError::MalformedConfig`] if the file exists but cannot be
/// read, is not valid JSON, or has the wrong shape.
pub fn read_config_document_at<P: AsRef<Path>>(
    path: P,
    server_key: &str,
) -> Result<ConfigDocument, MigrationError> {
    let path_ref = path.as_ref();

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No config at {}, starting from an empty document", path_ref.display());
            return Ok(ConfigDocument::empty());
        },
        Err(e) => {
            return Err(MigrationError::MalformedConfig {
                path: path_ref.to_path_buf(),
                detail: format!("failed to read file: {e}"),
            });
        },
    };

    let value: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| MigrationError::MalformedConfig {
            path: path_ref.to_path_buf(),
            detail: format!("invalid JSON: {e}"),
        })?;

    let document = ConfigDocument::from_value(value, server_key).map_err(|detail| {
        MigrationError::MalformedConfig { path: path_ref.to_path_buf(), detail }
    })?;

    debug!(
        "Loaded {} server(s) and {} other field(s) from {}",
        document.servers.len(),
        document.extras.len(),
        path_ref.display()
    );

    Ok(document)
}
