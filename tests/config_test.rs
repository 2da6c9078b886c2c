//! Integration tests for Settings loading with layered merge semantics.
//!
//! Note: these tests assume no global config and no NOTETREE_* variables,
//! so they test the local file layered over compiled defaults.

use std::fs;

use tempfile::TempDir;

use notetree::config::{Settings, StoreConfig};

// ============================================================
// Settings::load()
// ============================================================

#[test]
fn given_no_local_config_when_load_then_defaults() {
    // Act
    let settings = Settings::load(None).expect("load settings");

    // Assert
    assert_eq!(settings.store, StoreConfig::default());
    assert_eq!(settings.store.sequence_base, 1);
    assert!(!settings.store.renumber_on_remove);
    assert!(settings.display.show_ids);
}

#[test]
fn given_partial_local_config_when_load_then_only_given_keys_replaced() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notetree.toml");
    fs::write(
        &path,
        r#"
[store]
renumber_on_remove = true

[display]
show_ids = false
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path)).expect("load settings");

    // Assert
    assert!(settings.store.renumber_on_remove);
    assert_eq!(settings.store.sequence_base, 1, "unspecified key keeps default");
    assert!(settings.store.stamp_new_nodes);
    assert!(!settings.display.show_ids);
    assert!(settings.display.color);
}

#[test]
fn given_missing_local_config_when_load_then_error() {
    // Arrange
    let dir = TempDir::new().unwrap();

    // Act
    let result = Settings::load(Some(&dir.path().join("absent.toml")));

    // Assert
    assert!(result.is_err());
}

#[test]
fn given_negative_sequence_base_when_load_then_rejected() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[store]\nsequence_base = -1\n").unwrap();

    // Act
    let err = Settings::load(Some(&path)).unwrap_err();

    // Assert
    assert!(err.to_string().contains("sequence_base"));
}

#[test]
fn given_malformed_toml_when_load_then_parse_error() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[store\nsequence_base = ").unwrap();

    // Act
    let err = Settings::load(Some(&path)).unwrap_err();

    // Assert
    assert!(err.to_string().contains("parse"));
}

#[test]
fn given_settings_when_rendering_toml_then_sections_present() {
    // Act
    let rendered = Settings::default().to_toml().unwrap();

    // Assert
    assert!(rendered.contains("[store]"));
    assert!(rendered.contains("sequence_base = 1"));
    assert!(rendered.contains("[display]"));
}
