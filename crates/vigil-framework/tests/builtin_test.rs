//! Tests for the built-in monitor tests, one stage at a time.

use std::io::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use tempfile::TempDir;

use vigil_core::config::{AuditConfig, DisruptionConfig, LokiConfig, PathologicalConfig};
use vigil_core::errors::StorageError;
use vigil_core::interval::{
    annotations, BackendConnectionType, Interval, IntervalReason, IntervalSource, Intervals,
    Level, Locator, Message,
};
use vigil_framework::builtin::{
    AuditLogMonitorTest, DisruptionSummaryMonitorTest, GracefulRestartMonitorTest,
    IntervalSerializerMonitorTest, LokiMonitorTest, PathologicalMonitorTest,
    E2E_NAMESPACE_REPEATED_EVENTS_TEST, GRACEFUL_TERMINATION_TEST, REPEATED_EVENTS_TEST,
};
use vigil_framework::{MonitorContext, MonitorTest};
use vigil_storage::loki::{
    AccessToken, ClientCredentials, LokiTransport, PushAttemptError, PushRequest,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn at(seconds: i64) -> DateTime<Utc> {
    t0() + ChronoDuration::seconds(seconds)
}

fn apiserver_event(reason: IntervalReason, second: i64) -> Interval {
    Interval::builder(IntervalSource::KUBE_EVENT, Level::Info)
        .locator(Locator::pod(
            "openshift-kube-apiserver",
            "kube-apiserver-master-0",
            Some("master-0"),
        ))
        .message(Message::builder().reason(reason).human("apiserver").build())
        .build(at(second), Some(at(second)))
}

fn disruption(level: Level, from: i64, to: i64) -> Interval {
    Interval::builder(IntervalSource::DISRUPTION, level)
        .locator(Locator::disruption_check(
            "kube-api-new-connections",
            "openshift-tests",
            BackendConnectionType::New,
        ))
        .message(
            Message::builder()
                .reason(IntervalReason::DISRUPTION_BEGAN)
                .human("kube-api stopped responding")
                .build(),
        )
        .build(at(from), Some(at(to)))
}

/// Five seconds of outage followed by recovery.
fn outage() -> Intervals {
    Intervals::from(vec![
        disruption(Level::Error, 10, 15),
        disruption(Level::Info, 15, 20),
    ])
}

fn kube_event(ns: &str, human: &str, second: i64) -> Interval {
    Interval::builder(IntervalSource::KUBE_EVENT, Level::Warning)
        .locator(Locator::pod(ns, "worker-pod", None))
        .message(
            Message::builder()
                .reason(IntervalReason::new("BackOff"))
                .human(human)
                .build(),
        )
        .build(at(second), Some(at(second + 1)))
}

#[test]
fn test_graceful_restart_constructs_windows() {
    let mut test = GracefulRestartMonitorTest::new();
    let starting = Intervals::from(vec![
        apiserver_event(IntervalReason::SHUTDOWN_INITIATED, 10),
        apiserver_event(IntervalReason::TERMINATION_GRACEFUL_TERMINATION_FINISHED, 70),
    ]);
    let windows = test
        .construct_computed_intervals(&MonitorContext::default(), &starting, at(0), at(600))
        .unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].message.reason, IntervalReason::GRACEFUL_SHUTDOWN_WINDOW);
    assert_eq!(windows[0].duration(), Duration::from_secs(60));
}

#[test]
fn test_graceful_restart_fails_on_termination_timeout() {
    let mut test = GracefulRestartMonitorTest::new();
    let ctx = MonitorContext::default();

    let clean = test
        .evaluate_tests_from_constructed_intervals(&ctx, &Intervals::new())
        .unwrap();
    assert_eq!(clean.len(), 1);
    assert!(!clean[0].is_failure());

    let timed_out = Intervals::from(vec![apiserver_event(
        IntervalReason::GRACEFUL_TERMINATION_TIMEOUT,
        30,
    )]);
    let cases = test
        .evaluate_tests_from_constructed_intervals(&ctx, &timed_out)
        .unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].name, GRACEFUL_TERMINATION_TEST);
    let output = &cases[0].failure_output.as_ref().unwrap().output;
    assert!(output.starts_with("1 kube-apiserver termination timeouts observed"));
    assert!(output.contains("pod/kube-apiserver-master-0"));
    let expected_line = timed_out.iter().next().unwrap().legacy_string();
    assert_eq!(output.lines().last(), Some(expected_line.as_str()));
}

#[test]
fn test_graceful_restart_notes_incomplete_windows() {
    let mut test = GracefulRestartMonitorTest::new();
    let ctx = MonitorContext::default();
    let starting = Intervals::from(vec![apiserver_event(IntervalReason::TERMINATION_START, 10)]);
    let windows = test
        .construct_computed_intervals(&ctx, &starting, at(0), at(600))
        .unwrap();
    let cases = test
        .evaluate_tests_from_constructed_intervals(&ctx, &windows)
        .unwrap();
    assert!(!cases[0].is_failure());
    assert!(cases[0]
        .system_out
        .as_deref()
        .unwrap()
        .starts_with("1 graceful shutdown windows"));
}

#[test]
fn test_disruption_over_allowance_fails() {
    let mut test = DisruptionSummaryMonitorTest::new(DisruptionConfig::default());
    let cases = test
        .evaluate_tests_from_constructed_intervals(&MonitorContext::default(), &outage())
        .unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(
        cases[0].name,
        "[sig-network] disruption/kube-api connection/new should be available throughout the test"
    );
    let output = &cases[0].failure_output.as_ref().unwrap().output;
    assert!(output.contains("unreachable for 5s, more than the allowed 1s"));
    assert!(output.contains("kube-api stopped responding"));
}

#[test]
fn test_disruption_within_configured_allowance_passes() {
    let mut config = DisruptionConfig::default();
    config
        .allowed_secs
        .insert("kube-api-new-connections".to_string(), 10);
    let mut test = DisruptionSummaryMonitorTest::new(config);
    let cases = test
        .evaluate_tests_from_constructed_intervals(&MonitorContext::default(), &outage())
        .unwrap();
    assert_eq!(cases.len(), 1);
    assert!(!cases[0].is_failure());
}

#[test]
fn test_record_only_disruption_writes_without_judging() {
    let dir = TempDir::new().unwrap();
    let ctx = MonitorContext::default();
    let mut test = DisruptionSummaryMonitorTest::record_only(DisruptionConfig::default());
    assert!(test.is_record_only());

    let cases = test
        .evaluate_tests_from_constructed_intervals(&ctx, &outage())
        .unwrap();
    assert!(cases.is_empty());
    test.write_content_to_storage(&ctx, dir.path(), "-run1", &outage(), &[])
        .unwrap();

    let written: serde_json::Value = serde_json::from_slice(
        &std::fs::read(dir.path().join("backend-disruption-run1.json")).unwrap(),
    )
    .unwrap();
    let backend = &written["BackendDisruptions"]["kube-api-new-connections"];
    assert_eq!(backend["DisruptedDuration"], 5_000_000_000u64);
}

#[test]
fn test_pathological_series_spans_occurrences() {
    let mut test = PathologicalMonitorTest::new(PathologicalConfig::default());
    let starting = Intervals::from(vec![
        kube_event("openshift-etcd", "Back-off restarting failed container", 10),
        kube_event("openshift-etcd", "Back-off restarting failed container", 40)
            .with_annotation(annotations::PATHOLOGICAL, "true")
            .with_annotation(annotations::COUNT, "25"),
        kube_event("openshift-etcd", "Pulled image", 50),
    ]);
    let series = test
        .construct_computed_intervals(&MonitorContext::default(), &starting, at(0), at(600))
        .unwrap();

    assert_eq!(series.len(), 1);
    let interval = &series[0];
    assert_eq!(interval.source, IntervalSource::PATHOLOGICAL_EVENT_ANALYZER);
    assert_eq!(interval.from, at(10));
    assert_eq!(interval.to, Some(at(41)));
    assert_eq!(interval.message.times(), 25);
    assert_eq!(
        interval.message.human_message,
        "pathological event series: Back-off restarting failed container"
    );
}

#[test]
fn test_pathological_splits_e2e_namespaces() {
    let mut test = PathologicalMonitorTest::new(PathologicalConfig::default());
    let final_intervals = Intervals::from(vec![
        kube_event("openshift-etcd", "Back-off restarting failed container (30 times)", 10),
        kube_event("e2e-test-abc", "Back-off restarting failed container (30 times)", 20),
    ]);
    let cases = test
        .evaluate_tests_from_constructed_intervals(&MonitorContext::default(), &final_intervals)
        .unwrap();

    let platform: Vec<_> = cases
        .iter()
        .filter(|c| c.name == REPEATED_EVENTS_TEST)
        .collect();
    assert_eq!(platform.len(), 1);
    assert!(platform[0].is_failure());

    // Repeats in e2e namespaces only flake.
    let e2e: Vec<_> = cases
        .iter()
        .filter(|c| c.name == E2E_NAMESPACE_REPEATED_EVENTS_TEST)
        .collect();
    assert_eq!(e2e.len(), 2);
    assert!(e2e[0].is_failure());
    assert!(!e2e[1].is_failure());
}

#[test]
fn test_pathological_ignores_non_event_sources() {
    let mut test = PathologicalMonitorTest::new(PathologicalConfig::default());
    let mut constructed = kube_event("openshift-etcd", "series (30 times)", 10);
    constructed.source = IntervalSource::PATHOLOGICAL_EVENT_ANALYZER;
    let cases = test
        .evaluate_tests_from_constructed_intervals(
            &MonitorContext::default(),
            &Intervals::from(vec![constructed]),
        )
        .unwrap();
    assert!(cases.iter().all(|c| !c.is_failure()));
}

#[test]
fn test_interval_serializer_writes_events() {
    let dir = TempDir::new().unwrap();
    let mut test = IntervalSerializerMonitorTest::new();
    test.write_content_to_storage(&MonitorContext::default(), dir.path(), "-run1", &outage(), &[])
        .unwrap();
    let read = vigil_storage::read_event_intervals(&dir.path().join("e2e-events-run1.json"))
        .unwrap();
    assert_eq!(read, outage());
}

#[test]
fn test_audit_without_directory_is_not_supported() {
    let mut test = AuditLogMonitorTest::new(&AuditConfig::default());
    let err = test
        .prepare_collection(&MonitorContext::default())
        .unwrap_err();
    assert!(err.is_not_supported());

    let missing = AuditConfig {
        log_dir: Some("/nonexistent/audit".into()),
    };
    let err = AuditLogMonitorTest::new(&missing)
        .prepare_collection(&MonitorContext::default())
        .unwrap_err();
    assert!(err.is_not_supported());
}

#[test]
fn test_audit_summarizes_and_writes() {
    let logs = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();
    for (file, user) in [("a.log", "alice"), ("b.log", "bob")] {
        let mut f = std::fs::File::create(logs.path().join(file)).unwrap();
        writeln!(
            f,
            r#"{{"auditID":"1","verb":"get","user":{{"username":"{user}"}},"objectRef":{{"resource":"pods"}},"responseStatus":{{"code":200}}}}"#
        )
        .unwrap();
        writeln!(f, "not json").unwrap();
    }
    let config = AuditConfig {
        log_dir: Some(logs.path().to_path_buf()),
    };
    let ctx = MonitorContext::default();
    let mut test = AuditLogMonitorTest::new(&config);
    test.prepare_collection(&ctx).unwrap();
    let data = test
        .collect_data(&ctx, storage.path(), at(0), at(600))
        .unwrap();

    let summary = test.summary().unwrap();
    assert_eq!(summary.request_counts.request_count, 2);
    assert_eq!(summary.per_user.len(), 2);
    assert_eq!(summary.line_read_failure_count, 2);

    assert_eq!(data.intervals.len(), 1);
    let interval = &data.intervals[0];
    assert_eq!(interval.source, IntervalSource::AUDIT_LOG);
    assert_eq!(interval.level, Level::Warning);
    assert_eq!(interval.message.human_message, "2 audit log lines could not be decoded");

    test.write_content_to_storage(&ctx, storage.path(), "run1", &Intervals::new(), &[])
        .unwrap();
    for name in [
        "audit-log-summary_run1.json",
        "just-users-audit-log-summary_run1.json",
        "just-resources-audit-log-summary_run1.json",
    ] {
        assert!(storage.path().join(name).exists(), "missing {name}");
    }
}

#[derive(Default)]
struct RecordingTransport {
    pushed: Arc<Mutex<usize>>,
    fail: bool,
}

impl LokiTransport for RecordingTransport {
    fn exchange_token(&self, _credentials: &ClientCredentials) -> Result<AccessToken, StorageError> {
        Err(StorageError::TokenExchange {
            reason: "unexpected".to_string(),
        })
    }

    fn push(
        &self,
        _push_url: &str,
        _bearer: Option<&str>,
        request: &PushRequest,
    ) -> Result<(), PushAttemptError> {
        if self.fail {
            return Err(PushAttemptError {
                reason: "HTTP 400 Bad Request".to_string(),
                retryable: false,
            });
        }
        *self.pushed.lock().unwrap() += request.entry_count();
        Ok(())
    }
}

fn loki_config(enabled: bool) -> LokiConfig {
    LokiConfig {
        enabled: Some(enabled),
        push_url: Some("http://loki.invalid/loki/api/v1/push".to_string()),
        ..LokiConfig::default()
    }
}

#[test]
fn test_loki_disabled_is_not_supported() {
    let mut test = LokiMonitorTest::new(loki_config(false));
    let err = test
        .prepare_collection(&MonitorContext::default())
        .unwrap_err();
    assert!(err.is_not_supported());

    let no_url = LokiConfig {
        enabled: Some(true),
        ..LokiConfig::default()
    };
    let err = LokiMonitorTest::new(no_url)
        .prepare_collection(&MonitorContext::default())
        .unwrap_err();
    assert!(err.is_not_supported());
}

#[test]
fn test_loki_uploads_final_intervals() {
    let pushed = Arc::new(Mutex::new(0));
    let transport = RecordingTransport {
        pushed: Arc::clone(&pushed),
        fail: false,
    };
    let ctx = MonitorContext::default();
    let dir = TempDir::new().unwrap();
    let mut test = LokiMonitorTest::new(loki_config(true)).with_transport(Box::new(transport));
    test.prepare_collection(&ctx).unwrap();
    test.write_content_to_storage(&ctx, dir.path(), "", &outage(), &[])
        .unwrap();
    assert_eq!(*pushed.lock().unwrap(), 2);
}

#[test]
fn test_loki_failures_do_not_fail_the_stage() {
    let ctx = MonitorContext::default();
    let dir = TempDir::new().unwrap();
    let transport = RecordingTransport {
        fail: true,
        ..RecordingTransport::default()
    };
    let mut test = LokiMonitorTest::new(loki_config(true)).with_transport(Box::new(transport));
    test.prepare_collection(&ctx).unwrap();
    assert!(test
        .write_content_to_storage(&ctx, dir.path(), "", &outage(), &[])
        .is_ok());
}
