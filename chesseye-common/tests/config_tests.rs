//! Unit tests for configuration loading and graceful degradation
//!
//! Covers:
//! - Missing TOML files do not cause failure (defaults are used)
//! - Priority order for config file resolution (CLI > env > default path)
//! - API base URL override (argument > env > file)
//! - Validation of URLs and numeric ranges
//! - Atomic config writes
//!
//! Note: Uses serial_test to prevent ENV variable race conditions.
//! Tests that manipulate CHESSEYE_CONFIG or CHESSEYE_API_BASE_URL are marked
//! with #[serial].

use chesseye_common::config::{
    ConfigResolver, LoggingConfig, TomlConfig, API_URL_ENV_VAR, CONFIG_ENV_VAR,
    DEFAULT_API_BASE_URL, DEFAULT_EDITOR_BASE_URL,
};
use chesseye_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_defaults() {
    let config = TomlConfig::default();

    assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.editor_base_url, DEFAULT_EDITOR_BASE_URL);
    assert_eq!(config.request_timeout(), Duration::from_secs(10));
    assert_eq!(config.low_confidence_threshold, 0.3);
    assert_eq!(config.min_piece_count, 2);
    assert_eq!(config.success_message_duration(), Duration::from_millis(1500));
    assert_eq!(config.logging, LoggingConfig::default());
    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_file_fills_defaults() {
    let config = TomlConfig::from_toml_str(
        r#"
        api_base_url = "http://192.168.1.20:8000/"
        success_message_duration_ms = 500

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    assert_eq!(config.api_base_url(), "http://192.168.1.20:8000");
    assert_eq!(config.success_message_duration(), Duration::from_millis(500));
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.file.is_none());
    assert_eq!(config.editor_base_url, DEFAULT_EDITOR_BASE_URL);
    assert_eq!(config.min_piece_count, 2);
}

#[test]
fn test_invalid_values_rejected() {
    let bad_url = TomlConfig::from_toml_str(r#"api_base_url = "not a url""#);
    assert!(matches!(bad_url, Err(Error::Config(_))));

    let bad_threshold = TomlConfig::from_toml_str("low_confidence_threshold = 1.5");
    assert!(matches!(bad_threshold, Err(Error::Config(_))));

    let bad_timeout = TomlConfig::from_toml_str("request_timeout_secs = 0");
    assert!(matches!(bad_timeout, Err(Error::Config(_))));

    let bad_syntax = TomlConfig::from_toml_str("api_base_url = ");
    assert!(matches!(bad_syntax, Err(Error::ConfigParse(_))));
}

#[test]
#[serial]
fn test_cli_path_takes_priority() {
    let cli_dir = TempDir::new().unwrap();
    let env_dir = TempDir::new().unwrap();
    let cli_path = write_config(&cli_dir, "min_piece_count = 5");
    let env_path = write_config(&env_dir, "min_piece_count = 7");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let resolver = ConfigResolver::new(Some(cli_path.clone()));
    assert_eq!(resolver.config_path(), Some(cli_path));
    assert_eq!(resolver.load().unwrap().min_piece_count, 5);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_path_used_without_cli() {
    let env_dir = TempDir::new().unwrap();
    let env_path = write_config(&env_dir, "min_piece_count = 7");
    env::set_var(CONFIG_ENV_VAR, &env_path);

    let resolver = ConfigResolver::new(None);
    assert_eq!(resolver.config_path(), Some(env_path));
    assert_eq!(resolver.load().unwrap().min_piece_count, 7);

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("does-not-exist.toml");

    let resolver = ConfigResolver::new(Some(missing));
    let config = resolver.load().unwrap();
    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_broken_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "min_piece_count = \"two\"");

    let resolver = ConfigResolver::new(Some(path));
    assert!(resolver.load().is_err());
}

#[test]
#[serial]
fn test_api_url_override_priority() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"api_base_url = "http://file.example:8000""#);
    let resolver = ConfigResolver::new(Some(path));

    env::remove_var(API_URL_ENV_VAR);
    assert_eq!(
        resolver.resolve(None).unwrap().api_base_url(),
        "http://file.example:8000"
    );

    env::set_var(API_URL_ENV_VAR, "http://env.example:8000");
    assert_eq!(
        resolver.resolve(None).unwrap().api_base_url(),
        "http://env.example:8000"
    );
    assert_eq!(
        resolver
            .resolve(Some("http://cli.example:8000/"))
            .unwrap()
            .api_base_url(),
        "http://cli.example:8000"
    );

    env::remove_var(API_URL_ENV_VAR);
}

#[test]
#[serial]
fn test_invalid_api_url_override_rejected() {
    env::remove_var(API_URL_ENV_VAR);
    let dir = TempDir::new().unwrap();
    let resolver = ConfigResolver::new(Some(dir.path().join("missing.toml")));

    assert!(matches!(
        resolver.resolve(Some("::not-a-url::")),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_write_then_load() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("nested").join("config.toml");

    let config = TomlConfig {
        min_piece_count: 3,
        logging: LoggingConfig {
            level: "warn".to_string(),
            file: Some(PathBuf::from("/tmp/chesseye.log")),
        },
        ..TomlConfig::default()
    };
    config.write_to(&target).unwrap();

    assert!(target.exists());
    assert!(!dir.path().join("nested").join("config.toml.tmp").exists());
    assert_eq!(TomlConfig::load(&target).unwrap(), config);
}
