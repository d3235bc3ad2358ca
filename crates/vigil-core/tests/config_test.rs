//! Tests for the Vigil configuration system.

use std::sync::Mutex;

use vigil_core::cluster::ClusterStability;
use vigil_core::config::{ConfigOverrides, VigilConfig};
use vigil_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all VIGIL_ env vars to prevent cross-test contamination.
fn clear_vigil_env_vars() {
    for key in [
        "VIGIL_RUN_STORAGE_DIR",
        "VIGIL_RUN_TIME_SUFFIX",
        "VIGIL_RUN_CLUSTER_STABILITY",
        "VIGIL_PATHOLOGICAL_DUPLICATE_EVENT_THRESHOLD",
        "VIGIL_LOKI_ENABLED",
        "VIGIL_LOKI_PUSH_URL",
        "VIGIL_LOKI_TOKEN_URL",
        "VIGIL_LOKI_CLIENT_ID",
        "VIGIL_LOKI_CLIENT_SECRET",
        "VIGIL_AUDIT_LOG_DIR",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layered_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_vigil_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("vigil.toml"),
        r#"
[run]
time_suffix = "_20260101-000000"
cluster_stability = "Disruptive"

[pathological]
duplicate_event_threshold = 30
"#,
    )
    .unwrap();

    std::env::set_var("VIGIL_PATHOLOGICAL_DUPLICATE_EVENT_THRESHOLD", "40");

    let overrides = ConfigOverrides {
        time_suffix: Some("_override".to_string()),
        ..Default::default()
    };

    let config = VigilConfig::load(dir.path(), Some(&overrides)).unwrap();

    // Overrides beat the project file.
    assert_eq!(config.run.effective_time_suffix(), "_override");
    // Env beats the project file.
    assert_eq!(config.pathological.effective_duplicate_event_threshold(), 40);
    // Untouched project values survive.
    assert_eq!(
        config.run.effective_cluster_stability(),
        ClusterStability::Disruptive
    );

    clear_vigil_env_vars();
}

#[test]
fn test_load_without_project_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_vigil_env_vars();

    let dir = tempdir();
    let config = VigilConfig::load(dir.path(), None).unwrap();

    assert_eq!(config.run.effective_time_suffix(), "");
    assert_eq!(
        config.run.effective_cluster_stability(),
        ClusterStability::Stable
    );
    assert_eq!(config.pathological.effective_duplicate_event_threshold(), 20);
    assert_eq!(
        config.pathological.effective_e2e_namespace_prefixes(),
        vec!["e2e-".to_string()]
    );
    assert!(!config.loki.effective_enabled());
    assert_eq!(config.loki.effective_batch_size(), 500);
    assert_eq!(config.loki.effective_backoff_steps(), 5);
    assert_eq!(config.loki.effective_backoff_factor(), 5.0);
    assert_eq!(config.loki.effective_backoff_base().as_secs(), 2);
    assert!(config.audit.log_dir.is_none());
}

#[test]
fn test_invalid_toml_reports_path() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_vigil_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("vigil.toml"), "[run\ntime_suffix = ").unwrap();

    let err = VigilConfig::load(dir.path(), None).unwrap_err();
    match err {
        ConfigError::ParseError { path, .. } => assert!(path.ends_with("vigil.toml")),
        other => panic!("expected ParseError, got {other:?}"),
    }
}

#[test]
fn test_unknown_keys_are_ignored() {
    let config = VigilConfig::from_toml(
        r#"
[run]
time_suffix = "_x"
some_future_key = true

[brand_new_section]
value = 1
"#,
    )
    .unwrap();
    assert_eq!(config.run.effective_time_suffix(), "_x");
}

#[test]
fn test_validation_batch_size_bounds() {
    for bad in ["0", "501"] {
        let toml = format!("[loki]\nbatch_size = {bad}\n");
        let config = VigilConfig::from_toml(&toml).unwrap();
        let err = VigilConfig::validate(&config).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "loki.batch_size"),
            "batch_size {bad} should be rejected, got {err:?}"
        );
    }

    let config = VigilConfig::from_toml("[loki]\nbatch_size = 500\n").unwrap();
    assert!(VigilConfig::validate(&config).is_ok());
}

#[test]
fn test_validation_backoff_factor() {
    let config = VigilConfig::from_toml("[loki]\nbackoff_factor = 0.5\n").unwrap();
    assert!(matches!(
        VigilConfig::validate(&config),
        Err(ConfigError::ValidationFailed { ref field, .. }) if field == "loki.backoff_factor"
    ));
}

#[test]
fn test_validation_loki_enabled_requires_push_url() {
    let config = VigilConfig::from_toml("[loki]\nenabled = true\n").unwrap();
    assert!(matches!(
        VigilConfig::validate(&config),
        Err(ConfigError::ValidationFailed { ref field, .. }) if field == "loki.push_url"
    ));

    let config = VigilConfig::from_toml(
        "[loki]\nenabled = true\npush_url = \"https://logs.example.com/loki/api/v1/push\"\n",
    )
    .unwrap();
    assert!(VigilConfig::validate(&config).is_ok());
}

#[test]
fn test_validation_zero_threshold() {
    let config =
        VigilConfig::from_toml("[pathological]\nduplicate_event_threshold = 0\n").unwrap();
    assert!(VigilConfig::validate(&config).is_err());
}

#[test]
fn test_env_override_loki_and_audit() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_vigil_env_vars();

    let dir = tempdir();
    std::env::set_var("VIGIL_LOKI_ENABLED", "true");
    std::env::set_var("VIGIL_LOKI_PUSH_URL", "https://logs.example.com/push");
    std::env::set_var("VIGIL_AUDIT_LOG_DIR", "/var/log/audit");

    let config = VigilConfig::load(dir.path(), None).unwrap();
    assert!(config.loki.effective_enabled());
    assert_eq!(
        config.loki.push_url.as_deref(),
        Some("https://logs.example.com/push")
    );
    assert_eq!(
        config.audit.log_dir.as_deref(),
        Some(std::path::Path::new("/var/log/audit"))
    );

    clear_vigil_env_vars();
}

#[test]
fn test_invalid_env_value_is_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_vigil_env_vars();

    let dir = tempdir();
    std::env::set_var("VIGIL_RUN_CLUSTER_STABILITY", "wobbly");
    let config = VigilConfig::load(dir.path(), None).unwrap();
    assert!(config.run.cluster_stability.is_none());

    clear_vigil_env_vars();
}

#[test]
fn test_disruption_allowance_per_backend() {
    let config = VigilConfig::from_toml(
        r#"
[disruption]
default_allowed_secs = 3

[disruption.allowed_secs]
"kube-api-new-connections" = 10
"#,
    )
    .unwrap();
    assert_eq!(
        config
            .disruption
            .allowed_for("kube-api-new-connections")
            .as_secs(),
        10
    );
    assert_eq!(config.disruption.allowed_for("other").as_secs(), 3);
}

#[test]
fn test_to_toml_round_trip() {
    let config = VigilConfig::from_toml(
        r#"
[run]
time_suffix = "_abc"

[loki]
batch_size = 100
"#,
    )
    .unwrap();
    let rendered = config.to_toml().unwrap();
    let reparsed = VigilConfig::from_toml(&rendered).unwrap();
    assert_eq!(reparsed.run.effective_time_suffix(), "_abc");
    assert_eq!(reparsed.loki.effective_batch_size(), 100);
}
