//! Registry of tolerated repeated-event matchers.

use std::collections::BTreeMap;

use chrono::Duration as ChronoDuration;

use vigil_core::cluster::TopologyMode;
use vigil_core::errors::AnalysisError;
use vigil_core::interval::{keys, Interval, IntervalReason, IntervalSource, Intervals};

use super::matchers::{EventMatcher, OverlapOtherIntervalsMatcher, SimplePathologicalEventMatcher};

/// Named matchers, iterated in name order.
#[derive(Default)]
pub struct AllowedPathologicalEventRegistry {
    matchers: BTreeMap<String, Box<dyn EventMatcher>>,
}

impl std::fmt::Debug for AllowedPathologicalEventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllowedPathologicalEventRegistry")
            .field("matchers", &self.matchers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl AllowedPathologicalEventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_matcher(&mut self, matcher: Box<dyn EventMatcher>) -> Result<(), AnalysisError> {
        let name = matcher.name().to_string();
        if name.is_empty() {
            return Err(AnalysisError::InvalidMatcher {
                name,
                reason: "pathological event matchers must be named".to_string(),
            });
        }
        if self.matchers.contains_key(&name) {
            return Err(AnalysisError::DuplicateMatcher { name });
        }
        self.matchers.insert(name, matcher);
        Ok(())
    }

    /// First matcher the interval belongs to, regardless of whether it allows
    /// the repeat.
    pub fn matches_any(&self, interval: &Interval) -> Option<&dyn EventMatcher> {
        let matcher = self
            .matchers
            .values()
            .find(|m| m.matches(interval))
            .map(|m| m.as_ref())?;
        tracing::debug!(matcher = matcher.name(), locator = %interval.locator, "event interval matches");
        Some(matcher)
    }

    /// First matcher allowing the interval to repeat on this topology.
    pub fn allowed_by_any(
        &self,
        interval: &Interval,
        topology: TopologyMode,
    ) -> Option<&dyn EventMatcher> {
        let matcher = self
            .matchers
            .values()
            .find(|m| m.allows(interval, topology))
            .map(|m| m.as_ref())?;
        tracing::debug!(matcher = matcher.name(), locator = %interval.locator, "duplicated event allowed");
        Some(matcher)
    }

    pub fn matcher_by_name(&self, name: &str) -> Result<&dyn EventMatcher, AnalysisError> {
        self.matchers
            .get(name)
            .map(|m| m.as_ref())
            .ok_or_else(|| AnalysisError::UnknownMatcher {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Matchers applicable to every job.
    ///
    /// `final_intervals` feeds the matchers that only tolerate events inside
    /// other intervals; with an empty set those never allow anything.
    pub fn universal(final_intervals: &Intervals) -> Result<Self, AnalysisError> {
        let mut registry = Self::new();

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("E2ESecurityContextBreaksNonRootPolicy")
                .with_locator_key(keys::NAMESPACE, r"e2e-security-context-test-[0-9]+")?
                .with_locator_key(keys::POD, r".*-root-uid")?
                .with_reason(r"^Failed$")?
                .with_human_message(r"Error: container's runAsUser breaks non-root policy.*")?,
        ))?;

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("DeploymentAwaitingCancellation")
                .with_reason(r"^DeploymentAwaitingCancellation$")?
                .with_human_message(
                    r"Deployment of version [0-9]+ awaiting cancellation of older running deployments",
                )?,
        ))?;

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("E2EImagePullBackOff")
                .with_locator_key(keys::NAMESPACE, r"^e2e-.*")?
                .with_reason(r"^BackOff$")?
                .with_human_message(r"Back-off pulling image")?,
        ))?;

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("E2ELoki")
                .with_locator_key(keys::NAMESPACE, r"^openshift-e2e-loki$")?,
        ))?;

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("KubeAPIReadinessProbeError")
                .with_locator_key(keys::NAMESPACE, r"openshift-kube-*")?
                .with_locator_key(keys::POD, r"kube.*guard.*")?
                .with_reason(r"^ProbeError$")?
                .with_human_message(r"Readiness probe error")?,
        ))?;

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("KubeletUnhealthyReadinessProbeFailed")
                .with_reason(r"^Unhealthy$")?
                .with_human_message(r"Readiness probe failed")?,
        ))?;

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("EtcdReadinessProbeError")
                .with_locator_key(keys::NAMESPACE, r"openshift-etcd")?
                .with_locator_key(keys::POD, r"etcd-guard.*")?
                .with_reason(r"^ProbeError$")?
                .with_human_message(r"Readiness probe error: .* connect: connection refused")?,
        ))?;

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("OpenShiftAPICheckFailed")
                .with_reason(r"^OpenShiftAPICheckFailed$")?
                .with_human_message(r"user.openshift.io.v1.*503")?
                .with_jira("https://bugzilla.redhat.com/show_bug.cgi?id=2017435"),
        ))?;

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("PodSandbox")
                .with_human_message(r"pod sandbox")?
                .never_allow(),
        ))?;

        registry.add_matcher(Box::new(
            SimplePathologicalEventMatcher::new("TopologyAwareHintsDisabled")
                .with_reason(r"^TopologyAwareHintsDisabled$")?
                .with_jira("https://issues.redhat.com/browse/OCPBUGS-69400"),
        ))?;

        registry.add_matcher(Box::new(single_node_connection_refused(final_intervals)?))?;

        Ok(registry)
    }
}

/// Connection-refused errors while a single-node API server restarts.
///
/// Events on single-node clusters arrive irregularly, so each graceful
/// shutdown window is padded 5s before and 45s after.
fn single_node_connection_refused(
    final_intervals: &Intervals,
) -> Result<OverlapOtherIntervalsMatcher, AnalysisError> {
    let restart_windows: Intervals = final_intervals
        .iter()
        .filter(|i| {
            i.source == IntervalSource::APISERVER_GRACEFUL_SHUTDOWN
                && i.message.reason == IntervalReason::GRACEFUL_SHUTDOWN_WINDOW
        })
        .map(|i| {
            let mut padded = i.with_to(i.to.map(|to| to + ChronoDuration::seconds(45)));
            padded.from = i.from - ChronoDuration::seconds(5);
            padded
        })
        .collect();
    if !restart_windows.is_empty() {
        tracing::debug!(
            event = "single_node_restart_windows",
            count = restart_windows.len(),
        );
    }

    let delegate = SimplePathologicalEventMatcher::new(
        "ConnectionErrorDuringSingleNodeAPIServerShutdown",
    )
    .with_human_message(r"dial tcp .* connect: connection refused")?
    .only_on(TopologyMode::SingleReplica);

    Ok(OverlapOtherIntervalsMatcher::new(delegate, restart_windows))
}
