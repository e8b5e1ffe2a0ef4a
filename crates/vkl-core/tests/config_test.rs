//! Tests for layer settings parsing.

use vkl_core::{CoreError, LayerSettings};

#[test]
fn test_defaults() {
    let settings = LayerSettings::default();
    assert!(settings.thread_safety);
    assert!(settings.wrap_handles);
    assert!(!settings.best_practices);
    assert!(!settings.sync_validation);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let settings = LayerSettings::from_toml_str(
        r#"
        wrap_handles = false
        best_practices = true
        "#,
    )
    .expect("valid settings");
    assert!(!settings.wrap_handles);
    assert!(settings.best_practices);
    assert!(settings.thread_safety);
    assert!(settings.core);
}

#[test]
fn test_conflicting_features_rejected() {
    let err = LayerSettings::from_toml_str("gpu_assisted = true\ndebug_printf = true\n")
        .expect_err("conflict must be rejected");
    assert!(matches!(err, CoreError::Config(_)));
}

#[test]
fn test_malformed_file_is_error() {
    let err = LayerSettings::from_toml_str("thread_safety = \"yes\"").expect_err("type error");
    assert!(matches!(err, CoreError::Toml(_)));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let settings = LayerSettings::load_or_default("/nonexistent/vk_layer_settings.toml");
    assert_eq!(settings, LayerSettings::default());
}
