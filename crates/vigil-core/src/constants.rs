//! Workspace-wide constants.

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "VIGIL_";

/// Project config file name looked up in the run root.
pub const PROJECT_CONFIG_FILE: &str = "vigil.toml";

/// Events repeating more often than this are pathological.
pub const DUPLICATE_EVENT_THRESHOLD: u32 = 20;

/// Maximum number of entries pushed to the log store per request.
pub const LOKI_MAX_BATCH_SIZE: usize = 500;

/// Default backoff for log-store pushes: 5 steps, factor 5, 2s base.
pub const LOKI_BACKOFF_STEPS: u32 = 5;
pub const LOKI_BACKOFF_FACTOR: f64 = 5.0;
pub const LOKI_BACKOFF_BASE_SECS: u64 = 2;

/// Source tag of the in-repo availability samplers.
pub const OPENSHIFT_TESTS_SOURCE: &str = "openshift-tests";

/// Name of the JUnit suite produced by a run.
pub const JUNIT_SUITE_NAME: &str = "monitor-tests";
