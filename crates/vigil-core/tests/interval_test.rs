//! Tests for the interval model and its legacy encodings.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use proptest::prelude::*;

use vigil_core::errors::IntervalError;
use vigil_core::interval::{
    annotations, keys, BackendConnectionType, Interval, IntervalReason, IntervalSource,
    Intervals, Level, Locator, LocatorType, Message,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn pod_interval(pod: &str, from_min: i64, to_min: Option<i64>) -> Interval {
    Interval::builder(IntervalSource::KUBE_EVENT, Level::Info)
        .locator(Locator::pod("ns1", pod, None))
        .message(Message::builder().human("event").build())
        .build(
            t0() + ChronoDuration::minutes(from_min),
            to_min.map(|m| t0() + ChronoDuration::minutes(m)),
        )
}

#[test]
fn test_server_locator_legacy_string_exact() {
    let locator = Locator::builder(LocatorType::ApiServerShutdown)
        .with_namespace("openshift-kube-apiserver")
        .with_pod("foo")
        .with_node("bar")
        .with_key(keys::SERVER, "kube-apiserver")
        .with_key(keys::SHUTDOWN, "apiserver")
        .build();

    assert_eq!(
        locator.legacy_string(),
        "ns/openshift-kube-apiserver pod/foo node/bar server/kube-apiserver shutdown/apiserver"
    );

    let parsed = Locator::parse_legacy(&locator.legacy_string()).unwrap();
    assert_eq!(parsed, locator);
}

#[test]
fn test_server_constructor_marks_graceful_shutdown() {
    let locator = Locator::server("kube-apiserver", "bar", "openshift-kube-apiserver", "foo");
    assert_eq!(locator.locator_type, LocatorType::ApiServerShutdown);
    assert_eq!(
        locator.legacy_string(),
        "ns/openshift-kube-apiserver pod/foo node/bar server/kube-apiserver shutdown/graceful"
    );
}

#[test]
fn test_leading_keys_precede_alphabetical_rest() {
    let locator = Locator::builder(LocatorType::Container)
        .with_key("zone", "a")
        .with_key(keys::CONTAINER, "etcd")
        .with_key("alpha", "1")
        .with_key(keys::UID, "u-1")
        .with_namespace("openshift-etcd")
        .build();
    assert_eq!(
        locator.legacy_string(),
        "ns/openshift-etcd uid/u-1 container/etcd alpha/1 zone/a"
    );
}

#[test]
fn test_empty_values_are_dropped() {
    let locator = Locator::pod("ns1", "p", Some(""));
    assert_eq!(locator.legacy_string(), "ns/ns1 pod/p");
    assert!(locator.node_name().is_none());
}

#[test]
fn test_disruption_locator_accessors() {
    let locator = Locator::disruption_check(
        "kube-api-new-connections",
        "openshift-tests",
        BackendConnectionType::New,
    );
    assert_eq!(locator.locator_type, LocatorType::Disruption);
    assert_eq!(
        locator.backend_disruption_name(),
        Some("kube-api-new-connections")
    );
    assert_eq!(locator.connection_type(), Some(BackendConnectionType::New));

    let parsed = Locator::parse_legacy(&locator.legacy_string()).unwrap();
    assert_eq!(parsed.locator_type, LocatorType::Disruption);
    assert_eq!(parsed, locator);
}

#[test]
fn test_parse_legacy_rejects_bad_tokens() {
    assert!(matches!(
        Locator::parse_legacy("ns/a garbage"),
        Err(IntervalError::MalformedLocator { ref token, .. }) if token == "garbage"
    ));
    assert!(matches!(
        Locator::parse_legacy("/value"),
        Err(IntervalError::MalformedLocator { .. })
    ));
    assert!(matches!(
        Locator::parse_legacy("pod/a pod/b"),
        Err(IntervalError::DuplicateLocatorKey { ref key, .. }) if key == "pod"
    ));
}

#[test]
fn test_parse_legacy_keeps_slashes_in_values() {
    let locator = Locator::parse_legacy("route/openshift-console/console").unwrap();
    assert_eq!(locator.get(keys::ROUTE), Some("openshift-console/console"));
    assert_eq!(locator.locator_type, LocatorType::Other);
}

#[test]
fn test_message_legacy_string() {
    let message = Message::builder()
        .reason(IntervalReason::SHUTDOWN_INITIATED)
        .human("received SIGTERM")
        .annotation(annotations::PATHOLOGICAL, "true")
        .build();
    assert_eq!(
        message.legacy_string(),
        "reason/ShutdownInitiated pathological/true received SIGTERM"
    );
    assert!(message.is_pathological());
    assert!(!message.is_interesting());
}

#[test]
fn test_duration_clamps_skewed_spans() {
    let skewed = pod_interval("p", 10, Some(5));
    assert!(!skewed.is_well_formed());
    assert_eq!(skewed.duration(), std::time::Duration::ZERO);

    let open = pod_interval("p", 10, None);
    assert!(open.is_open());
    assert!(open.is_well_formed());
    assert_eq!(open.duration(), std::time::Duration::ZERO);

    let normal = pod_interval("p", 0, Some(10));
    assert_eq!(normal.duration(), std::time::Duration::from_secs(600));
}

#[test]
fn test_interval_json_shape() {
    let interval = pod_interval("p", 0, None);
    let json = serde_json::to_value(&interval).unwrap();
    assert_eq!(json["level"], "Info");
    assert_eq!(json["source"], "KubeEvent");
    assert_eq!(json["locator"]["type"], "Pod");
    assert_eq!(json["message"]["humanMessage"], "event");
    assert!(json.get("to").is_none());

    let back: Interval = serde_json::from_value(json).unwrap();
    assert_eq!(back, interval);
}

#[test]
fn test_sort_puts_open_intervals_last_for_equal_from() {
    let intervals = Intervals::from(vec![
        pod_interval("b", 0, None),
        pod_interval("a", 0, Some(1)),
        pod_interval("c", -5, Some(0)),
    ]);
    let sorted = intervals.sorted();
    let pods: Vec<_> = sorted
        .iter()
        .map(|i| i.locator.pod_name().unwrap())
        .collect();
    assert_eq!(pods, vec!["c", "a", "b"]);
    // The original collection is untouched.
    assert_eq!(intervals[0].locator.pod_name(), Some("b"));
}

#[test]
fn test_cut_includes_overlapping_and_open() {
    let intervals = Intervals::from(vec![
        pod_interval("before", -20, Some(-10)),
        pod_interval("overlap", -5, Some(5)),
        pod_interval("open", -30, None),
        pod_interval("after", 20, Some(30)),
    ]);
    let cut = intervals.cut(t0(), t0() + ChronoDuration::minutes(10));
    let pods: Vec<_> = cut.iter().map(|i| i.locator.pod_name().unwrap()).collect();
    assert_eq!(pods, vec!["overlap", "open"]);
}

#[test]
fn test_with_replacements_returns_new_collection() {
    let intervals = Intervals::from(vec![pod_interval("a", 0, Some(1)), pod_interval("b", 1, Some(2))]);
    let stamped = intervals[1].with_annotation(annotations::PATHOLOGICAL, "true");
    let replaced = intervals.with_replacements(&[(1, stamped.clone()), (99, stamped.clone())]);

    assert_eq!(replaced.len(), 2);
    assert_eq!(replaced[1], stamped);
    assert!(!intervals[1].message.is_pathological());
}

proptest! {
    #[test]
    fn prop_sorted_is_ordered_by_from(offsets in proptest::collection::vec(-1000i64..1000, 0..40)) {
        let intervals: Intervals = offsets
            .iter()
            .map(|m| pod_interval("p", *m, Some(*m + 1)))
            .collect();
        let sorted = intervals.sorted();
        prop_assert_eq!(sorted.len(), intervals.len());
        prop_assert!(sorted.is_sorted_by_from());
    }

    #[test]
    fn prop_pod_locator_round_trips(
        ns in "[a-z][a-z0-9-]{0,20}",
        pod in "[a-z][a-z0-9-]{0,20}",
        node in proptest::option::of("[a-z][a-z0-9.-]{0,20}"),
    ) {
        let locator = Locator::pod(&ns, &pod, node.as_deref());
        let parsed = Locator::parse_legacy(&locator.legacy_string()).unwrap();
        prop_assert_eq!(parsed, locator);
    }
}
