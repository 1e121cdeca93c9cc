//! Configuration resolution tests
//!
//! Tests touching `LIFEOS_CONFIG` are `#[serial]` since the environment is process-wide.

use lifeos_common::config::{
    load_toml_config, CompiledDefaults, ConfigOverrides, ServerConfig, TomlConfig,
    DEFAULT_AI_MODEL, DEFAULT_ALLOWED_ORIGINS,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

fn write_toml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_compiled_defaults() {
    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(defaults.port, 3000);
    assert_eq!(defaults.environment, "development");
    assert_eq!(defaults.jwt_expire_days, 30);
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.database_path.ends_with("lifeos.db"));
}

#[test]
fn test_resolve_with_nothing_uses_defaults() {
    let config = ServerConfig::resolve(ConfigOverrides::default(), None).unwrap();

    assert_eq!(config.port, 3000);
    assert_eq!(config.environment, "development");
    assert!(!config.cookie_secure);
    assert_eq!(config.jwt_expire_days, 30);
    // Ephemeral secret generated outside production
    assert_eq!(config.jwt_secret.len(), 64);
    assert_eq!(config.allowed_origins, DEFAULT_ALLOWED_ORIGINS.to_vec());
    assert_eq!(config.public_url, "http://localhost:3000");
    assert!(config.ai.api_key.is_none());
    assert_eq!(config.ai.model, DEFAULT_AI_MODEL);
    assert!(config.static_dir.is_none());
}

#[test]
fn test_overrides_beat_toml() {
    let toml: TomlConfig = toml::from_str(
        r#"
        port = 4000
        jwt_secret = "from-toml"
        environment = "staging"

        [ai]
        api_key = "toml-key"
        model = "toml-model"
        "#,
    )
    .unwrap();

    let overrides = ConfigOverrides {
        port: Some(5000),
        jwt_secret: Some("from-cli".to_string()),
        ai_api_key: Some("cli-key".to_string()),
        ..Default::default()
    };

    let config = ServerConfig::resolve(overrides, Some(toml)).unwrap();
    assert_eq!(config.port, 5000);
    assert_eq!(config.jwt_secret, "from-cli");
    assert_eq!(config.environment, "staging");
    assert_eq!(config.ai.api_key.as_deref(), Some("cli-key"));
    assert_eq!(config.ai.model, "toml-model");
    assert_eq!(config.public_url, "http://localhost:5000");
}

#[test]
fn test_production_requires_jwt_secret() {
    let overrides = ConfigOverrides {
        environment: Some("production".to_string()),
        ..Default::default()
    };
    assert!(ServerConfig::resolve(overrides, None).is_err());

    let overrides = ConfigOverrides {
        environment: Some("production".to_string()),
        jwt_secret: Some("   ".to_string()),
        ..Default::default()
    };
    assert!(ServerConfig::resolve(overrides, None).is_err());

    let overrides = ConfigOverrides {
        environment: Some("production".to_string()),
        jwt_secret: Some("s3cret".to_string()),
        ..Default::default()
    };
    let config = ServerConfig::resolve(overrides, None).unwrap();
    assert!(config.cookie_secure);
}

#[test]
fn test_non_positive_expiry_rejected() {
    let overrides = ConfigOverrides {
        jwt_expire_days: Some(0),
        ..Default::default()
    };
    assert!(ServerConfig::resolve(overrides, None).is_err());
}

#[test]
fn test_frontend_url_added_to_origins_once() {
    let toml: TomlConfig = toml::from_str(
        r#"
        allowed_origins = ["https://app.example.org"]
        frontend_url = "https://app.example.org"
        "#,
    )
    .unwrap();
    let config = ServerConfig::resolve(ConfigOverrides::default(), Some(toml)).unwrap();
    assert_eq!(config.allowed_origins, vec!["https://app.example.org".to_string()]);

    let overrides = ConfigOverrides {
        frontend_url: Some("https://lifeos.example.org".to_string()),
        ..Default::default()
    };
    let config = ServerConfig::resolve(overrides, None).unwrap();
    assert_eq!(config.allowed_origins.len(), DEFAULT_ALLOWED_ORIGINS.len() + 1);
    assert!(config
        .allowed_origins
        .contains(&"https://lifeos.example.org".to_string()));
}

#[test]
fn test_blank_ai_key_disables_ai() {
    let overrides = ConfigOverrides {
        ai_api_key: Some("".to_string()),
        ..Default::default()
    };
    let config = ServerConfig::resolve(overrides, None).unwrap();
    assert!(config.ai.api_key.is_none());
}

#[test]
fn test_load_explicit_toml_file() {
    let file = write_toml(
        r#"
        port = 8080
        database_path = "/tmp/lifeos-test.db"

        [logging]
        level = "debug"
        "#,
    );

    let config = load_toml_config(Some(file.path())).unwrap().unwrap();
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.database_path, Some(PathBuf::from("/tmp/lifeos-test.db")));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_explicit_missing_file_is_error() {
    let result = load_toml_config(Some(std::path::Path::new("/nonexistent/lifeos.toml")));
    assert!(result.is_err());
}

#[test]
fn test_load_malformed_toml_is_error() {
    let file = write_toml("port = \"not a number\"");
    assert!(load_toml_config(Some(file.path())).is_err());
}

#[test]
fn test_missing_logging_section_defaults_to_info() {
    let file = write_toml("port = 3001");
    let config = load_toml_config(Some(file.path())).unwrap().unwrap();
    assert_eq!(config.logging.level, "info");
}

#[test]
#[serial]
fn test_lifeos_config_env_var_is_probed() {
    let file = write_toml("port = 7070");
    env::set_var("LIFEOS_CONFIG", file.path());

    let config = load_toml_config(None).unwrap();

    env::remove_var("LIFEOS_CONFIG");
    assert_eq!(config.and_then(|c| c.port), Some(7070));
}

#[test]
#[serial]
fn test_lifeos_config_env_var_missing_file_falls_through() {
    env::set_var("LIFEOS_CONFIG", "/nonexistent/lifeos-config.toml");

    // Falls through to platform locations; never an error
    let result = load_toml_config(None);

    env::remove_var("LIFEOS_CONFIG");
    assert!(result.is_ok());
}
