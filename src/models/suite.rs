/// Test suites in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suite {
    Unit,
    Integration,
    EndToEnd,
    Performance,
}

impl Suite {
    pub const ALL: [Suite; 4] = [
        Suite::Unit,
        Suite::Integration,
        Suite::EndToEnd,
        Suite::Performance,
    ];

    /// Reserved prefix of the test ids belonging to this suite.
    pub fn prefix(&self) -> &'static str {
        match self {
            Suite::Unit => "UNIT_",
            Suite::Integration => "INT_",
            Suite::EndToEnd => "E2E_",
            Suite::Performance => "PERF_",
        }
    }

    /// Key of this suite in the report's category partition.
    pub fn category_key(&self) -> &'static str {
        match self {
            Suite::Unit => "unit_tests",
            Suite::Integration => "integration_tests",
            Suite::EndToEnd => "e2e_tests",
            Suite::Performance => "performance_tests",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Suite::Unit => "Unit Tests",
            Suite::Integration => "Integration Tests",
            Suite::EndToEnd => "E2E Test Scenarios",
            Suite::Performance => "Performance Tests",
        }
    }

    /// The suite whose prefix `test_id` carries, if any.
    pub fn classify(test_id: &str) -> Option<Suite> {
        Suite::ALL
            .into_iter()
            .find(|suite| test_id.starts_with(suite.prefix()))
    }
}
