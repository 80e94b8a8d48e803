//! Unit tests for service URL resolution and TOML config loading
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate TDASH_SERVICE_URL are marked with #[serial] to
//! ensure they run sequentially, not in parallel.

use serial_test::serial;
use std::env;
use tdash_common::config::{
    load_toml_config_from, resolve_service_url, DEFAULT_SERVICE_URL, SERVICE_URL_ENV,
};

#[test]
#[serial]
fn test_resolution_with_no_overrides_uses_default() {
    env::remove_var(SERVICE_URL_ENV);

    let url = resolve_service_url(None);

    assert_eq!(url, DEFAULT_SERVICE_URL);
}

#[test]
#[serial]
fn test_environment_variable_overrides_default() {
    env::set_var(SERVICE_URL_ENV, "http://env-host:9000/");

    let url = resolve_service_url(None);
    env::remove_var(SERVICE_URL_ENV);

    assert_eq!(url, "http://env-host:9000");
}

#[test]
#[serial]
fn test_cli_argument_overrides_environment() {
    env::set_var(SERVICE_URL_ENV, "http://env-host:9000");

    let url = resolve_service_url(Some("http://cli-host:7000"));
    env::remove_var(SERVICE_URL_ENV);

    assert_eq!(url, "http://cli-host:7000");
}

#[test]
#[serial]
fn test_blank_environment_variable_is_ignored() {
    env::set_var(SERVICE_URL_ENV, "   ");

    let url = resolve_service_url(None);
    env::remove_var(SERVICE_URL_ENV);

    assert_eq!(url, DEFAULT_SERVICE_URL);
}

#[test]
fn test_toml_config_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "service_url = \"http://toml-host:8123\"\n").unwrap();

    let config = load_toml_config_from(&path).unwrap();

    assert_eq!(config.service_url.as_deref(), Some("http://toml-host:8123"));
}

#[test]
fn test_empty_toml_config_has_no_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();

    let config = load_toml_config_from(&path).unwrap();

    assert!(config.service_url.is_none());
}

#[test]
fn test_malformed_toml_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "service_url = [not valid").unwrap();

    assert!(load_toml_config_from(&path).is_err());
}
