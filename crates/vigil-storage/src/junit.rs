//! JUnit XML report.

use std::fs;
use std::path::{Path, PathBuf};

use vigil_core::errors::StorageError;
use vigil_core::junit::JUnitTestSuite;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

pub fn junit_file_name(time_suffix: &str) -> String {
    format!("junit_e2e_{time_suffix}.xml")
}

/// Serialize a suite to an XML document.
pub fn render_junit(suite: &JUnitTestSuite) -> Result<String, StorageError> {
    let body = quick_xml::se::to_string(suite).map_err(|e| StorageError::Serialization {
        artifact: "junit".to_string(),
        message: e.to_string(),
    })?;
    Ok(format!("{XML_DECLARATION}{body}\n"))
}

pub fn write_junit(
    dir: &Path,
    time_suffix: &str,
    suite: &JUnitTestSuite,
) -> Result<PathBuf, StorageError> {
    let xml = render_junit(suite)?;
    fs::create_dir_all(dir).map_err(|e| StorageError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;
    let path = dir.join(junit_file_name(time_suffix));
    fs::write(&path, xml).map_err(|e| StorageError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    tracing::info!(
        event = "junit_written",
        tests = suite.num_tests,
        failures = suite.num_failed,
        skipped = suite.num_skipped,
        path = %path.display(),
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::junit::JUnitTestCase;

    #[test]
    fn test_file_name_uses_underscore_separator() {
        assert_eq!(junit_file_name("20260301-120000"), "junit_e2e_20260301-120000.xml");
    }

    #[test]
    fn test_render_has_declaration() {
        let suite = JUnitTestSuite::new("monitor-tests", vec![JUnitTestCase::pass("a")]);
        let xml = render_junit(&suite).unwrap();
        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<testsuite"));
    }
}
