// tests/config_tests.rs

use secrecy::{ExposeSecret, Secret};
use site_settings_api::config::{load_config, AppConfig};
use site_settings_api::error::AppError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn defaults_apply_when_no_file_exists() {
    let config = load_config(std::path::Path::new("/nonexistent/config.yaml")).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert!(config.server.admin_token.is_none());
}

#[test]
fn yaml_file_overrides_defaults() {
    let file = write_config(
        "server:\n  host: 127.0.0.1\n  port: 9000\n  admin_token: super-secret\n",
    );
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert_eq!(
        config
            .server
            .admin_token
            .as_ref()
            .map(|t| t.expose_secret().as_str()),
        Some("super-secret")
    );
}

#[test]
fn partial_yaml_keeps_remaining_defaults() {
    let file = write_config("server:\n  port: 3000\n");
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let file = write_config("server: [not, a, mapping\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, AppError::ConfigParse { .. }));
}

#[test]
fn zero_port_fails_validation() {
    let file = write_config("server:\n  port: 0\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, AppError::ConfigValidation { .. }));
}

#[test]
fn empty_admin_token_fails_validation() {
    let file = write_config("server:\n  admin_token: \"\"\n");
    let err = load_config(file.path()).unwrap_err();
    assert!(matches!(err, AppError::ConfigValidation { .. }));
}

#[test]
fn admin_token_is_not_serialized() {
    let mut config = AppConfig::default();
    config.server.admin_token = Some(Secret::new("super-secret".to_string()));

    let yaml = serde_yaml::to_string(&config).unwrap();
    assert!(!yaml.contains("super-secret"));
}
