use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::status::TestStatus;

/// What a test body concluded, before timing is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass { details: Option<Value> },
    Fail { message: String },
    Skip { reason: String },
}

impl Outcome {
    pub fn pass() -> Self {
        Outcome::Pass { details: None }
    }

    /// Pass carrying scenario-specific metrics.
    pub fn pass_with(details: Value) -> Self {
        Outcome::Pass {
            details: Some(details),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Outcome::Fail {
            message: message.into(),
        }
    }

    /// The precondition for a meaningful check is absent.
    pub fn skip(reason: impl Into<String>) -> Self {
        Outcome::Skip {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> TestStatus {
        match self {
            Outcome::Pass { .. } => TestStatus::Pass,
            Outcome::Fail { .. } => TestStatus::Fail,
            Outcome::Skip { .. } => TestStatus::Skip,
        }
    }
}

/// Finalized outcome of one test case. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    test_id: String,
    name: String,
    status: TestStatus,
    /// Seconds from case start to terminal outcome.
    duration: f64,
    /// Empty unless the case failed or skipped.
    error_message: String,
    details: Option<Value>,
}

impl TestResult {
    pub fn finalize(
        test_id: impl Into<String>,
        name: impl Into<String>,
        outcome: Outcome,
        elapsed: Duration,
    ) -> Self {
        let status = outcome.status();
        let (error_message, details) = match outcome {
            Outcome::Pass { details } => (String::new(), details),
            Outcome::Fail { message } if message.trim().is_empty() => {
                ("test failed without a message".to_string(), None)
            }
            Outcome::Fail { message } => (message, None),
            Outcome::Skip { reason } if reason.trim().is_empty() => {
                ("precondition not met".to_string(), None)
            }
            Outcome::Skip { reason } => (reason, None),
        };

        Self {
            test_id: test_id.into(),
            name: name.into(),
            status,
            duration: elapsed.as_secs_f64(),
            error_message,
            details,
        }
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> TestStatus {
        self.status
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn error_message(&self) -> Option<&str> {
        if self.error_message.is_empty() {
            None
        } else {
            Some(&self.error_message)
        }
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}
