//! Structured locators and their legacy flattened string encoding.
//!
//! The legacy form is a space-separated list of `key/value` tokens such as
//! `ns/openshift-kube-apiserver pod/foo node/bar server/kube-apiserver`.
//! Downstream tooling matches on it byte for byte, so the key order is fixed:
//! the leading keys come first in [`LEADING_KEYS`] order, every other key
//! follows alphabetically.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::IntervalError;

/// Well-known locator keys.
pub mod keys {
    pub const NAMESPACE: &str = "namespace";
    pub const POD: &str = "pod";
    pub const UID: &str = "uid";
    pub const NODE: &str = "node";
    pub const CONTAINER: &str = "container";
    pub const SERVER: &str = "server";
    pub const SHUTDOWN: &str = "shutdown";
    pub const BACKEND_DISRUPTION_NAME: &str = "backend-disruption-name";
    pub const DISRUPTION: &str = "disruption";
    pub const CONNECTION: &str = "connection";
    pub const ROUTE: &str = "route";
    pub const E2E_TEST: &str = "e2e-test";
}

/// Keys rendered before all others, least specific first.
const LEADING_KEYS: [&str; 5] = [
    keys::NAMESPACE,
    keys::POD,
    keys::UID,
    keys::NODE,
    keys::CONTAINER,
];

/// The namespace key is abbreviated in the legacy encoding.
const LEGACY_NAMESPACE_KEY: &str = "ns";

/// What kind of object a locator points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LocatorType {
    Pod,
    Container,
    Node,
    Namespace,
    Disruption,
    KubeEvent,
    #[serde(rename = "APIServerShutdown")]
    ApiServerShutdown,
    E2ETest,
    Other,
}

/// TCP connection reuse policy of a disruption sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BackendConnectionType {
    New,
    Reused,
}

impl BackendConnectionType {
    /// Value stored under the `connection` locator key.
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Reused => "reused",
        }
    }

    pub fn from_key(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "reused" => Some(Self::Reused),
            _ => None,
        }
    }
}

impl fmt::Display for BackendConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

/// A typed, ordered key-set identifying what an interval is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    #[serde(rename = "type")]
    pub locator_type: LocatorType,
    pub keys: BTreeMap<String, String>,
}

impl Locator {
    pub fn builder(locator_type: LocatorType) -> LocatorBuilder {
        LocatorBuilder::new(locator_type)
    }

    /// A pod, optionally pinned to the node it ran on.
    pub fn pod(namespace: &str, pod: &str, node: Option<&str>) -> Self {
        let mut builder = LocatorBuilder::new(LocatorType::Pod)
            .with_key(keys::NAMESPACE, namespace)
            .with_key(keys::POD, pod);
        if let Some(node) = node {
            builder = builder.with_key(keys::NODE, node);
        }
        builder.build()
    }

    pub fn node(name: &str) -> Self {
        LocatorBuilder::new(LocatorType::Node)
            .with_key(keys::NODE, name)
            .build()
    }

    /// A graceful-shutdown window of an API server instance.
    pub fn server(server: &str, node: &str, namespace: &str, pod: &str) -> Self {
        LocatorBuilder::new(LocatorType::ApiServerShutdown)
            .with_key(keys::NAMESPACE, namespace)
            .with_key(keys::POD, pod)
            .with_key(keys::NODE, node)
            .with_key(keys::SERVER, server)
            .with_key(keys::SHUTDOWN, "graceful")
            .build()
    }

    /// A backend availability sampler.
    pub fn disruption_check(
        backend_disruption_name: &str,
        source: &str,
        connection: BackendConnectionType,
    ) -> Self {
        LocatorBuilder::new(LocatorType::Disruption)
            .with_key(keys::BACKEND_DISRUPTION_NAME, backend_disruption_name)
            .with_key(keys::DISRUPTION, source)
            .with_key(keys::CONNECTION, connection.as_key())
            .build()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.keys.get(key).map(String::as_str)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.get(keys::NAMESPACE)
    }

    pub fn pod_name(&self) -> Option<&str> {
        self.get(keys::POD)
    }

    pub fn node_name(&self) -> Option<&str> {
        self.get(keys::NODE)
    }

    pub fn backend_disruption_name(&self) -> Option<&str> {
        self.get(keys::BACKEND_DISRUPTION_NAME)
    }

    pub fn connection_type(&self) -> Option<BackendConnectionType> {
        self.get(keys::CONNECTION)
            .and_then(BackendConnectionType::from_key)
    }

    /// Render the legacy flattened encoding.
    pub fn legacy_string(&self) -> String {
        let leading = LEADING_KEYS
            .iter()
            .filter_map(|key| self.keys.get(*key).map(|value| (*key, value.as_str())));
        let trailing = self
            .keys
            .iter()
            .filter(|(key, _)| !LEADING_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()));

        leading
            .chain(trailing)
            .map(|(key, value)| format!("{}/{}", legacy_key(key), value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Decode the legacy flattened encoding.
    ///
    /// The locator type is not part of the encoding and is inferred from the
    /// keys present. Values may contain `/` but not whitespace.
    pub fn parse_legacy(encoded: &str) -> Result<Self, IntervalError> {
        let mut keys = BTreeMap::new();
        for token in encoded.split_whitespace() {
            let (key, value) = token
                .split_once('/')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| IntervalError::MalformedLocator {
                    locator: encoded.to_string(),
                    token: token.to_string(),
                })?;
            let key = if key == LEGACY_NAMESPACE_KEY {
                keys::NAMESPACE
            } else {
                key
            };
            if keys.insert(key.to_string(), value.to_string()).is_some() {
                return Err(IntervalError::DuplicateLocatorKey {
                    locator: encoded.to_string(),
                    key: key.to_string(),
                });
            }
        }
        Ok(Self {
            locator_type: infer_type(&keys),
            keys,
        })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.legacy_string())
    }
}

fn legacy_key(key: &str) -> &str {
    if key == keys::NAMESPACE {
        LEGACY_NAMESPACE_KEY
    } else {
        key
    }
}

fn infer_type(keys: &BTreeMap<String, String>) -> LocatorType {
    let has = |key: &str| keys.contains_key(key);
    if has(keys::BACKEND_DISRUPTION_NAME) {
        LocatorType::Disruption
    } else if has(keys::SHUTDOWN) {
        LocatorType::ApiServerShutdown
    } else if has(keys::E2E_TEST) {
        LocatorType::E2ETest
    } else if has(keys::CONTAINER) {
        LocatorType::Container
    } else if has(keys::POD) {
        LocatorType::Pod
    } else if has(keys::NODE) {
        LocatorType::Node
    } else if has(keys::NAMESPACE) {
        LocatorType::Namespace
    } else {
        LocatorType::Other
    }
}

/// Incrementally assembles a [`Locator`].
#[derive(Debug, Clone)]
pub struct LocatorBuilder {
    locator_type: LocatorType,
    keys: BTreeMap<String, String>,
}

impl LocatorBuilder {
    pub fn new(locator_type: LocatorType) -> Self {
        Self {
            locator_type,
            keys: BTreeMap::new(),
        }
    }

    /// Add a key. Empty values are dropped so they never render as `key/`.
    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.keys.insert(key.into(), value);
        }
        self
    }

    pub fn with_namespace(self, namespace: &str) -> Self {
        self.with_key(keys::NAMESPACE, namespace)
    }

    pub fn with_pod(self, pod: &str) -> Self {
        self.with_key(keys::POD, pod)
    }

    pub fn with_node(self, node: &str) -> Self {
        self.with_key(keys::NODE, node)
    }

    pub fn build(self) -> Locator {
        Locator {
            locator_type: self.locator_type,
            keys: self.keys,
        }
    }
}
