use crate::config::ServerMap;
use serde_json::Value;

/// Warnings about server definitions an IDE is unlikely to launch.
///
/// These never block a migration; definitions are copied verbatim either way.
#[must_use]
pub fn validate_servers(server_key: &str, servers: &ServerMap) -> Vec<String> {
    let mut warnings = Vec::new();

    for (name, definition) in servers {
        match definition.as_value() {
            Value::Object(fields) => {
                if !fields.contains_key("command") && !fields.contains_key("url") {
                    warnings.push(format!("{server_key}.{name} must define either command or url"));
                }
                if let Some(args) = fields.get("args") {
                    if !args.is_array() {
                        warnings.push(format!("{server_key}.{name}.args should be an array"));
                    }
                }
                if let Some(env) = fields.get("env") {
                    if !env.is_object() {
                        warnings.push(format!("{server_key}.{name}.env should be an object"));
                    }
                }
            },
            _ => warnings.push(format!("{server_key}.{name} should be an object")),
        }
    }

    warnings
}
