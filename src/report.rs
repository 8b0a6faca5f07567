use std::io::Write;
use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use crate::models::{ResultStore, Suite, TestResult, TestStatus};

/// The report artifact could not be produced. This is a harness fault, not a
/// test outcome.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to move report into place at {path}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Aggregate counts over a finished run.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Summary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Percentage of passed tests, `0` for an empty run.
    pub success_rate: f64,
    /// Seconds, summed over every result regardless of status.
    pub total_duration: f64,
}

impl Summary {
    pub fn from_store(store: &ResultStore) -> Self {
        let total_tests = store.len();
        let passed = store.count(TestStatus::Pass);

        let success_rate = if total_tests > 0 {
            passed as f64 / total_tests as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_tests,
            passed,
            failed: store.count(TestStatus::Fail),
            skipped: store.count(TestStatus::Skip),
            success_rate,
            total_duration: store.iter().map(TestResult::duration).sum(),
        }
    }
}

/// Results grouped by the suite prefix of their id, each group in run order.
/// Results with an unknown prefix belong to no group.
#[derive(Debug, Clone, PartialEq)]
pub struct Categories<'a> {
    groups: Vec<(Suite, Vec<&'a TestResult>)>,
}

impl<'a> Categories<'a> {
    pub fn partition(results: &'a [TestResult]) -> Self {
        let groups = Suite::ALL
            .into_iter()
            .map(|suite| {
                let members = results
                    .iter()
                    .filter(|r| Suite::classify(r.test_id()) == Some(suite))
                    .collect();
                (suite, members)
            })
            .collect();
        Self { groups }
    }

    pub fn get(&self, suite: Suite) -> &[&'a TestResult] {
        self.groups
            .iter()
            .find(|(s, _)| *s == suite)
            .map(|(_, members)| members.as_slice())
            .unwrap_or_default()
    }
}

impl Serialize for Categories<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (suite, members) in &self.groups {
            map.serialize_entry(suite.category_key(), members)?;
        }
        map.end()
    }
}

/// Everything the run produced, borrowed from the frozen result store.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Report<'a> {
    pub summary: Summary,
    pub results: &'a [TestResult],
    pub categories: Categories<'a>,
}

impl<'a> Report<'a> {
    pub fn generate(store: &'a ResultStore) -> Self {
        let results = store.as_slice();
        Self {
            summary: Summary::from_store(store),
            results,
            categories: Categories::partition(results),
        }
    }

    /// Write the report as pretty JSON, replacing `path` atomically.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_vec_pretty(self)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err = |source| ReportError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix(".railcheck-report-")
            .suffix(".json")
            .tempfile_in(dir)
            .map_err(write_err)?;
        file.write_all(&json).map_err(write_err)?;
        file.write_all(b"\n").map_err(write_err)?;

        file.persist(path).map_err(|source| ReportError::Persist {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::models::Outcome;

    fn result(id: &str, outcome: Outcome, millis: u64) -> TestResult {
        TestResult::finalize(id, id, outcome, Duration::from_millis(millis))
    }

    fn mixed_store() -> ResultStore {
        let mut store = ResultStore::new();
        for i in 0..7 {
            store.push(result(&format!("UNIT_{i:03}"), Outcome::pass(), 100));
        }
        store.push(result("INT_001", Outcome::fail("HTTP 500"), 250));
        store.push(result("PERF__api_trains", Outcome::fail("too slow"), 250));
        store.push(result("E2E_005", Outcome::skip("No active conflicts to test"), 500));
        store
    }

    #[test]
    fn mixed_run_summary() {
        let store = mixed_store();
        let summary = Report::generate(&store).summary;
        assert_eq!(summary.total_tests, 10);
        assert_eq!(summary.passed, 7);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.skipped, 1);
        assert!((summary.success_rate - 70.0).abs() < 1e-9);
        assert!((summary.total_duration - 1.7).abs() < 1e-9);
    }

    #[test]
    fn empty_run_summary() {
        let store = ResultStore::new();
        let report = Report::generate(&store);
        assert_eq!(report.summary.total_tests, 0);
        assert_eq!(report.summary.success_rate, 0.0);
        assert_eq!(report.summary.total_duration, 0.0);
        for suite in Suite::ALL {
            assert!(report.categories.get(suite).is_empty());
        }
    }

    #[test]
    fn total_duration_ignores_status() {
        let store: ResultStore = [
            result("UNIT_001", Outcome::fail("x"), 1500),
            result("UNIT_002", Outcome::skip("y"), 500),
        ]
        .into_iter()
        .collect();
        assert!((Summary::from_store(&store).total_duration - 2.0).abs() < 1e-9);
    }

    #[test]
    fn categories_follow_prefixes() {
        let store: ResultStore = [
            result("UNIT_001", Outcome::pass(), 1),
            result("SMOKE_001", Outcome::pass(), 1),
            result("E2E_001", Outcome::pass(), 1),
            result("UNIT_002", Outcome::fail("x"), 1),
        ]
        .into_iter()
        .collect();
        let categories = Categories::partition(store.as_slice());

        let unit: Vec<_> = categories
            .get(Suite::Unit)
            .iter()
            .map(|r| r.test_id())
            .collect();
        assert_eq!(unit, ["UNIT_001", "UNIT_002"]);
        assert_eq!(categories.get(Suite::EndToEnd).len(), 1);
        assert!(categories.get(Suite::Integration).is_empty());

        let categorized: usize = Suite::ALL.iter().map(|s| categories.get(*s).len()).sum();
        assert_eq!(categorized, 3, "SMOKE_001 must not be categorized");
    }

    #[test]
    fn generation_is_idempotent() {
        let store = mixed_store();
        let first = Report::generate(&store);
        let second = Report::generate(&store);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn serialized_shape() {
        let store: ResultStore = [
            result("UNIT_001", Outcome::pass(), 500),
            result("E2E_001", Outcome::pass_with(json!({ "improvement": 12.5 })), 500),
        ]
        .into_iter()
        .collect();
        let value = serde_json::to_value(Report::generate(&store)).unwrap();

        assert_eq!(
            value["summary"],
            json!({
                "total_tests": 2,
                "passed": 2,
                "failed": 0,
                "skipped": 0,
                "success_rate": 100.0,
                "total_duration": 1.0,
            })
        );
        assert_eq!(value["results"][1]["details"], json!({ "improvement": 12.5 }));
        assert_eq!(value["results"][0]["error_message"], "");

        let keys: Vec<_> = value["categories"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        let mut expected = vec!["unit_tests", "integration_tests", "e2e_tests", "performance_tests"];
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(value["categories"]["unit_tests"][0]["test_id"], "UNIT_001");
        assert_eq!(value["categories"]["e2e_tests"][0]["test_id"], "E2E_001");
    }

    #[test]
    fn writes_pretty_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_report.json");
        let store = mixed_store();

        Report::generate(&store).write_to(&path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["summary"]["failed"], 2);
        assert_eq!(written["results"].as_array().unwrap().len(), 10);

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temp file must be renamed into place");
    }

    #[test]
    fn unwritable_location_is_a_report_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("test_report.json");
        let store = mixed_store();

        let err = Report::generate(&store).write_to(&path).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }), "{err:?}");
    }
}
