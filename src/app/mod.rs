use std::process::ExitCode;

use tokio::sync::mpsc;
use tracing::Instrument;

use crate::models::{ResultStore, Suite};
use crate::report::Summary;
use crate::runner::{CaseContext, TestCase, execute};
use crate::suites;

pub mod events;

pub use events::RunEvent;

/// A suite together with its ordered cases.
pub struct SuitePlan {
    pub suite: Suite,
    pub cases: Vec<Box<dyn TestCase>>,
}

impl SuitePlan {
    pub fn new(suite: Suite, cases: Vec<Box<dyn TestCase>>) -> Self {
        Self { suite, cases }
    }
}

/// The full catalogue: every suite in execution order.
pub fn catalogue() -> Vec<SuitePlan> {
    Suite::ALL
        .into_iter()
        .map(|suite| SuitePlan::new(suite, suites::cases(suite)))
        .collect()
}

/// Runs every suite to completion, one case at a time, and owns the result
/// store while doing so.
pub struct Orchestrator {
    ctx: CaseContext,
    plan: Vec<SuitePlan>,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl Orchestrator {
    pub fn new(ctx: CaseContext, plan: Vec<SuitePlan>) -> Self {
        Self {
            ctx,
            plan,
            events: None,
        }
    }

    pub fn with_events(mut self, tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Run all suites in order. No suite's outcome gates a later one.
    pub async fn run(&self) -> ResultStore {
        let mut store = ResultStore::new();
        for plan in &self.plan {
            let span = tracing::info_span!("suite", suite = plan.suite.title());
            store = self.run_suite(plan, store).instrument(span).await;
        }

        if store.is_empty() {
            tracing::warn!("no test cases were run");
        }
        tracing::info!(total = store.len(), "run finished");
        self.emit(RunEvent::RunFinished { total: store.len() });
        store
    }

    async fn run_suite(&self, plan: &SuitePlan, mut store: ResultStore) -> ResultStore {
        self.emit(RunEvent::SuiteStarted {
            suite: plan.suite,
            cases: plan.cases.len(),
        });

        for case in &plan.cases {
            let result = execute(case.as_ref(), &self.ctx).await;
            self.emit(RunEvent::CaseFinished {
                result: result.clone(),
            });
            store.push(result);
        }

        store
    }

    fn emit(&self, event: RunEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Pass/fail verdict of a whole run. Skips never fail a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
}

impl Verdict {
    pub fn from_summary(summary: &Summary) -> Self {
        if summary.failed == 0 {
            Verdict::Success
        } else {
            Verdict::Failure
        }
    }

    pub fn exit_code(self) -> ExitCode {
        match self {
            Verdict::Success => ExitCode::SUCCESS,
            Verdict::Failure => ExitCode::FAILURE,
        }
    }
}
