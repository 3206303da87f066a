use mcp_ferry::app_config::AppConfig;
use mcp_ferry::Ide;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to save and restore `XDG_CONFIG_HOME`
    struct EnvGuard {
        original: Option<String>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { original: std::env::var("XDG_CONFIG_HOME").ok() }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(value) => std::env::set_var("XDG_CONFIG_HOME", value),
                None => std::env::remove_var("XDG_CONFIG_HOME"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_from_xdg_config_home() {
        let _guard = EnvGuard::new();
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join("mcp-ferry");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("config.toml"),
            "[default]\nfrom = \"cline\"\n\n[paths]\nroo = \"~/roo/mcp.json\"\n",
        )
        .unwrap();
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        let config = AppConfig::load().unwrap().expect("config should be loaded");

        assert_eq!(config.default_from(), Some(Ide::Cline));
        assert!(config.default_backup());
        let registry = config.registry("/home/dev").unwrap();
        assert_eq!(registry.schema(Ide::Roo).path, PathBuf::from("/home/dev/roo/mcp.json"));
    }

    #[test]
    #[serial]
    fn test_load_returns_none_without_file() {
        let _guard = EnvGuard::new();
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        assert!(AppConfig::load().unwrap().is_none());
    }

    #[test]
    #[serial]
    fn test_unknown_default_ide_is_a_parse_error() {
        let _guard = EnvGuard::new();
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join("mcp-ferry");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), "[default]\nfrom = \"notepad\"\n").unwrap();
        std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());

        let err = AppConfig::load().unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_serialize_round_trip_omits_empty_sections() {
        let config = AppConfig::default();

        assert_eq!(toml::to_string(&config).unwrap(), "");
    }
}
