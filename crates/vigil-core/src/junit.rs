//! JUnit result model.
//!
//! Field renames follow the XML attribute/text conventions of `quick-xml`'s
//! serde support (`@attr`, `$text`), so the same types serialise straight to
//! a JUnit report.
//!
//! A failing case followed by a passing case with the same name is read by CI
//! as a flake.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureOutput {
    #[serde(rename = "@message", default)]
    pub message: String,
    #[serde(rename = "$text", default)]
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipMessage {
    #[serde(rename = "@message")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JUnitTestCase {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "skipped", default, skip_serializing_if = "Option::is_none")]
    pub skip_message: Option<SkipMessage>,
    #[serde(rename = "failure", default, skip_serializing_if = "Option::is_none")]
    pub failure_output: Option<FailureOutput>,
    #[serde(rename = "system-out", default, skip_serializing_if = "Option::is_none")]
    pub system_out: Option<String>,
}

impl JUnitTestCase {
    /// A passing case. Passing still produces a case; absence of a case means
    /// the test did not run.
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skip_message: None,
            failure_output: None,
            system_out: None,
        }
    }

    pub fn fail(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            failure_output: Some(FailureOutput {
                message: String::new(),
                output: output.into(),
            }),
            ..Self::pass(name)
        }
    }

    pub fn skip(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            skip_message: Some(SkipMessage {
                message: message.into(),
            }),
            ..Self::pass(name)
        }
    }

    /// A failure plus a pass of the same name.
    pub fn flake(name: impl Into<String>, output: impl Into<String>) -> Vec<Self> {
        let name = name.into();
        vec![Self::fail(name.clone(), output), Self::pass(name)]
    }

    pub fn with_system_out(mut self, system_out: impl Into<String>) -> Self {
        self.system_out = Some(system_out.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        self.failure_output.is_some()
    }

    pub fn is_skipped(&self) -> bool {
        self.skip_message.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "testsuite")]
pub struct JUnitTestSuite {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@tests")]
    pub num_tests: usize,
    #[serde(rename = "@failures")]
    pub num_failed: usize,
    #[serde(rename = "@skipped")]
    pub num_skipped: usize,
    #[serde(rename = "testcase", default)]
    pub test_cases: Vec<JUnitTestCase>,
}

impl JUnitTestSuite {
    pub fn new(name: impl Into<String>, test_cases: Vec<JUnitTestCase>) -> Self {
        let num_failed = test_cases.iter().filter(|c| c.is_failure()).count();
        let num_skipped = test_cases.iter().filter(|c| c.is_skipped()).count();
        Self {
            name: name.into(),
            num_tests: test_cases.len(),
            num_failed,
            num_skipped,
            test_cases,
        }
    }

    /// Names of tests that failed and never passed in this suite.
    pub fn hard_failures(&self) -> Vec<&str> {
        let mut failed: Vec<&str> = self
            .test_cases
            .iter()
            .filter(|c| c.is_failure())
            .map(|c| c.name.as_str())
            .filter(|name| {
                !self
                    .test_cases
                    .iter()
                    .any(|c| c.name == *name && !c.is_failure() && !c.is_skipped())
            })
            .collect();
        failed.sort_unstable();
        failed.dedup();
        failed
    }
}
