use crossterm::style::Color;
use serde::Serialize;

use crate::ui::theme;

/// Terminal state of an executed test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Pass,
    Fail,
    Skip,
}

impl TestStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            TestStatus::Pass => "✔",
            TestStatus::Fail => "✘",
            TestStatus::Skip => "⊘",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            TestStatus::Pass => theme::GREEN,
            TestStatus::Fail => theme::RED,
            TestStatus::Skip => theme::TEAL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::Skip => "skip",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TestStatus::Pass).unwrap(), "\"pass\"");
        assert_eq!(serde_json::to_string(&TestStatus::Fail).unwrap(), "\"fail\"");
        assert_eq!(serde_json::to_string(&TestStatus::Skip).unwrap(), "\"skip\"");
    }

    #[test]
    fn as_str_matches_wire_name() {
        for status in [TestStatus::Pass, TestStatus::Fail, TestStatus::Skip] {
            let wire = serde_json::to_value(status).unwrap();
            assert_eq!(wire.as_str(), Some(status.as_str()));
        }
    }
}
