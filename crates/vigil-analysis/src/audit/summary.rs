//! Nested request-count trees and their merge operation.
//!
//! Merging two nodes requires matching identity keys on both sides. A
//! mismatch means the caller paired the wrong aggregates and is reported as
//! [`AnalysisError::InvariantViolated`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use vigil_core::errors::AnalysisError;

use super::event::AuditEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCounts {
    pub request_count: u64,
    pub per_verb: BTreeMap<String, u64>,
    pub per_http_status: BTreeMap<i32, u64>,
}

impl RequestCounts {
    pub fn observe(&mut self, event: &AuditEvent) {
        self.request_count += 1;
        *self.per_verb.entry(event.verb.clone()).or_default() += 1;
        *self.per_http_status.entry(event.status_code()).or_default() += 1;
    }

    pub fn add(&mut self, other: &RequestCounts) {
        self.request_count += other.request_count;
        for (verb, count) in &other.per_verb {
            *self.per_verb.entry(verb.clone()).or_default() += count;
        }
        for (status, count) in &other.per_http_status {
            *self.per_http_status.entry(*status).or_default() += count;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerUserRequestCount {
    pub user: String,
    pub request_counts: RequestCounts,
    /// Keyed by `resource.group`.
    pub per_resource: BTreeMap<String, RequestCounts>,
}

impl PerUserRequestCount {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }

    pub fn add_summary(&mut self, other: &PerUserRequestCount) -> Result<(), AnalysisError> {
        if self.user != other.user {
            return Err(AnalysisError::InvariantViolated {
                context: "per-user audit summary",
                expected: self.user.clone(),
                actual: other.user.clone(),
            });
        }
        self.request_counts.add(&other.request_counts);
        for (resource, counts) in &other.per_resource {
            self.per_resource
                .entry(resource.clone())
                .or_default()
                .add(counts);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerResourceRequestCount {
    /// `resource.group`.
    pub resource: String,
    pub request_counts: RequestCounts,
    pub per_user: BTreeMap<String, RequestCounts>,
}

impl PerResourceRequestCount {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Self::default()
        }
    }

    pub fn add_summary(&mut self, other: &PerResourceRequestCount) -> Result<(), AnalysisError> {
        if self.resource != other.resource {
            return Err(AnalysisError::InvariantViolated {
                context: "per-resource audit summary",
                expected: self.resource.clone(),
                actual: other.resource.clone(),
            });
        }
        self.request_counts.add(&other.request_counts);
        for (user, counts) in &other.per_user {
            self.per_user.entry(user.clone()).or_default().add(counts);
        }
        Ok(())
    }
}

/// Request totals for one user, without the per-resource breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTotals {
    pub user: String,
    pub request_counts: RequestCounts,
}

/// Request totals for one resource, without the per-user breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTotals {
    pub resource: String,
    pub request_counts: RequestCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogSummary {
    /// Lines that could not be decoded as audit events.
    pub line_read_failure_count: u64,
    pub request_counts: RequestCounts,
    pub per_user: BTreeMap<String, PerUserRequestCount>,
    pub per_resource: BTreeMap<String, PerResourceRequestCount>,
}

impl AuditLogSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &AuditEvent) {
        self.request_counts.observe(event);

        let user = &event.user.username;
        let per_user = self
            .per_user
            .entry(user.clone())
            .or_insert_with(|| PerUserRequestCount::new(user.clone()));
        per_user.request_counts.observe(event);

        if let Some(resource) = event.group_resource() {
            per_user
                .per_resource
                .entry(resource.clone())
                .or_default()
                .observe(event);

            let per_resource = self
                .per_resource
                .entry(resource.clone())
                .or_insert_with(|| PerResourceRequestCount::new(resource));
            per_resource.request_counts.observe(event);
            per_resource
                .per_user
                .entry(user.clone())
                .or_default()
                .observe(event);
        }
    }

    pub fn record_line_failure(&mut self) {
        self.line_read_failure_count += 1;
    }

    /// Every node must carry the identity it is keyed by on both sides.
    fn check_identities(&self, other: &AuditLogSummary) -> Result<(), AnalysisError> {
        for (user, counts) in &other.per_user {
            let expected = self.per_user.get(user).map_or(user, |existing| &existing.user);
            if *expected != counts.user {
                return Err(AnalysisError::InvariantViolated {
                    context: "per-user audit summary",
                    expected: expected.clone(),
                    actual: counts.user.clone(),
                });
            }
        }
        for (resource, counts) in &other.per_resource {
            let expected = self
                .per_resource
                .get(resource)
                .map_or(resource, |existing| &existing.resource);
            if *expected != counts.resource {
                return Err(AnalysisError::InvariantViolated {
                    context: "per-resource audit summary",
                    expected: expected.clone(),
                    actual: counts.resource.clone(),
                });
            }
        }
        Ok(())
    }

    /// Fold `other` into this summary. On an identity mismatch nothing is
    /// merged.
    pub fn add_summary(&mut self, other: &AuditLogSummary) -> Result<(), AnalysisError> {
        self.check_identities(other)?;
        self.line_read_failure_count += other.line_read_failure_count;
        self.request_counts.add(&other.request_counts);
        for (user, counts) in &other.per_user {
            self.per_user
                .entry(user.clone())
                .or_insert_with(|| PerUserRequestCount::new(user.clone()))
                .add_summary(counts)?;
        }
        for (resource, counts) in &other.per_resource {
            self.per_resource
                .entry(resource.clone())
                .or_insert_with(|| PerResourceRequestCount::new(resource.clone()))
                .add_summary(counts)?;
        }
        Ok(())
    }

    /// Users ordered by request count, busiest first.
    pub fn user_totals(&self) -> Vec<UserTotals> {
        let mut totals: Vec<UserTotals> = self
            .per_user
            .values()
            .map(|u| UserTotals {
                user: u.user.clone(),
                request_counts: u.request_counts.clone(),
            })
            .collect();
        totals.sort_by(|a, b| {
            b.request_counts
                .request_count
                .cmp(&a.request_counts.request_count)
                .then_with(|| a.user.cmp(&b.user))
        });
        totals
    }

    /// Resources ordered by request count, busiest first.
    pub fn resource_totals(&self) -> Vec<ResourceTotals> {
        let mut totals: Vec<ResourceTotals> = self
            .per_resource
            .values()
            .map(|r| ResourceTotals {
                resource: r.resource.clone(),
                request_counts: r.request_counts.clone(),
            })
            .collect();
        totals.sort_by(|a, b| {
            b.request_counts
                .request_count
                .cmp(&a.request_counts.request_count)
                .then_with(|| a.resource.cmp(&b.resource))
        });
        totals
    }
}
