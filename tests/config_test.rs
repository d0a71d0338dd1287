//! Integration tests for Settings config loading.
//!
//! These tests run without a global config (temp directories only),
//! so they exercise local config merging with defaults.

use std::fs;

use tempfile::TempDir;

use skilltree::config::{local_config_path, Settings, StoreBackend};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
root_name = "Survival"
store = "memory"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.root_name, "Survival");
    assert_eq!(settings.store, StoreBackend::Memory);
    assert_eq!(settings.default_owner, "local");
}

#[test]
fn given_local_base_dir_with_tilde_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "base_dir = \"~/skills-data\"\n").unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let home = std::env::var("HOME").expect("HOME should be set");
    assert!(settings.base_dir.starts_with(&home));
    assert!(settings.store_path().ends_with("skills-data/skills.json"));
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "root_name = [unterminated").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(err.to_string().contains("config error"));
}

#[test]
fn given_empty_default_owner_when_load_then_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "default_owner = \"  \"\n").unwrap();

    assert!(Settings::load(Some(dir.path())).is_err());
}

#[test]
fn given_settings_when_serialized_then_toml_has_fields() {
    let settings = Settings::default();

    let text = settings.to_toml().unwrap();

    assert!(text.contains("root_name = \"Core\""));
    assert!(text.contains("store = \"json\""));
}
