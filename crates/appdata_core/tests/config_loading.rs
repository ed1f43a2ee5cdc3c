//! Integration tests for loading registry configuration from TOML.

use std::io::Write;

use appdata_core::config::{AppDataConfig, load_config};
use appdata_core::{CoreError, DataSourceDescriptor, DataSourceRegistry, resolve_activation};
use pretty_assertions::assert_eq;
use serde_json::json;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_load_config_registers_defaults_and_extras() {
    let file = write_config(
        r#"
[[data_sources]]
key = "executions"
label = "Pipelines"
opt_in = true
default_data = []

[[data_sources]]
key = "runningTasks"
required_data_sources = ["serverGroups"]
"#,
    );

    let config = load_config(file.path()).await.unwrap();
    assert!(config.register_defaults);
    assert_eq!(config.data_sources.len(), 2);

    let registry = DataSourceRegistry::new();
    config.apply(&registry).unwrap();
    assert_eq!(
        registry.keys(),
        vec![
            "serverGroups",
            "loadBalancers",
            "securityGroups",
            "executions",
            "runningTasks"
        ]
    );

    let executions = registry.get("executions").unwrap();
    assert_eq!(executions.label(), "Pipelines");
    assert!(executions.opt_in);
    assert_eq!(executions.default_data, json!([]));

    let activation = resolve_activation(&registry.list_data_sources(), None);
    assert_eq!(activation.is_disabled("executions"), Some(true));
    assert_eq!(activation.is_disabled("runningTasks"), Some(false));
}

#[tokio::test]
async fn test_defaults_can_be_skipped() {
    let file = write_config(
        r#"
register_defaults = false

[[data_sources]]
key = "serverGroups"
"#,
    );

    let config = AppDataConfig::load_from(file.path()).await.unwrap();
    let registry = DataSourceRegistry::new();
    config.apply(&registry).unwrap();
    assert_eq!(registry.keys(), vec!["serverGroups"]);
}

#[test]
fn test_duplicate_with_default_fails_to_apply() {
    let config = AppDataConfig::from_toml(
        r#"
[[data_sources]]
key = "loadBalancers"
"#,
        "inline",
    )
    .unwrap();

    let registry = DataSourceRegistry::new();
    let err = config.apply(&registry).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateDataSource { ref key } if key == "loadBalancers"));
    // Nothing is registered when any key collides
    assert!(registry.is_empty());
}

#[test]
fn test_duplicate_extra_keys_leave_registry_untouched() {
    let config = AppDataConfig::from_toml(
        r#"
register_defaults = false

[[data_sources]]
key = "executions"

[[data_sources]]
key = "runningTasks"

[[data_sources]]
key = "executions"
"#,
        "inline",
    )
    .unwrap();

    let registry = DataSourceRegistry::new();
    let err = config.apply(&registry).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateDataSource { ref key } if key == "executions"));
    assert!(registry.is_empty());
}

#[test]
fn test_apply_checks_keys_already_in_registry() {
    let config = AppDataConfig::from_toml(
        r#"
[[data_sources]]
key = "executions"
"#,
        "inline",
    )
    .unwrap();

    let registry = DataSourceRegistry::new();
    registry
        .register_data_source(DataSourceDescriptor::builder("executions").build())
        .unwrap();
    let err = config.apply(&registry).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateDataSource { ref key } if key == "executions"));
    assert_eq!(registry.keys(), vec!["executions"]);
}

#[test]
fn test_opt_in_source_from_toml_is_optional() {
    let config = AppDataConfig::from_toml(
        r#"
[[data_sources]]
key = "executions"
optional = false
opt_in = true
"#,
        "inline",
    )
    .unwrap();

    let executions = &config.data_sources[0];
    assert!(executions.opt_in);
    assert!(executions.optional);
}

#[test]
fn test_invalid_toml_reports_origin() {
    let err = AppDataConfig::from_toml("data_sources = 3", "broken.toml").unwrap_err();
    match err {
        CoreError::ConfigurationError { config_path, .. } => {
            assert_eq!(config_path, "broken.toml")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_empty_key_is_rejected() {
    let err = AppDataConfig::from_toml(
        r#"
[[data_sources]]
key = "  "
"#,
        "inline",
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::ConfigurationError { ref field, .. } if field == "data_sources[0].key"));
}

#[tokio::test]
async fn test_missing_file_is_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.toml")).await.unwrap_err();
    assert!(matches!(err, CoreError::ConfigurationError { ref field, .. } if field == "file"));
}
