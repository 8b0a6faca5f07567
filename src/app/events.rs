use crate::models::{Suite, TestResult};

/// Progress events streamed from the orchestrator to the console.
#[derive(Debug, Clone)]
pub enum RunEvent {
    SuiteStarted {
        suite: Suite,
        cases: usize,
    },
    CaseFinished {
        result: TestResult,
    },
    RunFinished {
        total: usize,
    },
}
