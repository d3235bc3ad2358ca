//! Named, owner-tagged monitor tests.

use std::collections::BTreeMap;

use vigil_core::errors::FrameworkError;

use crate::monitor_test::{MonitorTest, PluginState};

pub struct RegisteredMonitorTest {
    pub name: String,
    /// Component owning the test; prefixed to every JUnit case name.
    pub owner: String,
    pub(crate) test: Box<dyn MonitorTest>,
    pub(crate) state: PluginState,
}

impl RegisteredMonitorTest {
    pub fn state(&self) -> &PluginState {
        &self.state
    }

    /// `[Jira:"<owner>"] monitor test <name> <stage>`.
    pub fn junit_name(&self, stage_label: &str) -> String {
        format!(
            "[Jira:\"{}\"] monitor test {} {}",
            self.owner, self.name, stage_label
        )
    }
}

impl std::fmt::Debug for RegisteredMonitorTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredMonitorTest")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("state", &self.state)
            .finish()
    }
}

/// Built once by the composition root and handed to the runner. Tests run in
/// name order.
#[derive(Debug, Default)]
pub struct MonitorTestRegistry {
    tests: BTreeMap<String, RegisteredMonitorTest>,
}

impl MonitorTestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test. A repeated name is a configuration error: it would make
    /// artifact names and result attribution ambiguous.
    pub fn add_monitor_test(
        &mut self,
        name: impl Into<String>,
        owner: impl Into<String>,
        test: Box<dyn MonitorTest>,
    ) -> Result<(), FrameworkError> {
        let name = name.into();
        if self.tests.contains_key(&name) {
            return Err(FrameworkError::DuplicateMonitorTest { name });
        }
        let owner = owner.into();
        tracing::debug!(event = "monitor_test_registered", name = %name, owner = %owner);
        self.tests.insert(
            name.clone(),
            RegisteredMonitorTest {
                name,
                owner,
                test,
                state: PluginState::Active,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredMonitorTest> {
        self.tests.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tests.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredMonitorTest> {
        self.tests.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut RegisteredMonitorTest> {
        self.tests.values_mut()
    }
}
