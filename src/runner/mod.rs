pub mod checks;
pub mod client;
#[cfg(test)]
pub mod stub;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use crate::config::Config;
use crate::models::{Outcome, TestResult, TestStatus};

pub use client::ServiceClient;

/// Shared, read-only inputs available to every test body.
#[derive(Debug, Clone)]
pub struct CaseContext {
    pub client: ServiceClient,
    pub config: Config,
}

impl CaseContext {
    pub fn new(config: Config) -> Result<Self> {
        let client = ServiceClient::new(
            &config.service.base_url,
            config.service.request_timeout(),
        )?;
        Ok(Self { client, config })
    }
}

/// One unit of verification.
///
/// `run` reports failures by returning `Err`; it never has to build a failing
/// result itself.
#[async_trait]
pub trait TestCase: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    async fn run(&self, ctx: &CaseContext) -> Result<Outcome>;
}

pub type CaseFn = for<'a> fn(&'a CaseContext) -> BoxFuture<'a, Result<Outcome>>;

/// A test case backed by a plain async function.
pub struct Case {
    id: &'static str,
    name: &'static str,
    body: CaseFn,
}

impl Case {
    pub fn new(id: &'static str, name: &'static str, body: CaseFn) -> Self {
        Self { id, name, body }
    }
}

#[async_trait]
impl TestCase for Case {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, ctx: &CaseContext) -> Result<Outcome> {
        (self.body)(ctx).await
    }
}

/// Run `case` once and finalize its result.
///
/// Errors and panics raised by the body become `fail`; this never propagates
/// either to the caller.
pub async fn execute(case: &dyn TestCase, ctx: &CaseContext) -> TestResult {
    let start = Instant::now();
    tracing::debug!(test_id = case.id(), "starting test case");

    let outcome = match AssertUnwindSafe(case.run(ctx)).catch_unwind().await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => Outcome::fail(format!("{e:#}")),
        Err(payload) => Outcome::fail(format!("panicked: {}", panic_message(payload.as_ref()))),
    };

    let result = TestResult::finalize(case.id(), case.name(), outcome, start.elapsed());

    match result.status() {
        TestStatus::Fail => tracing::warn!(
            test_id = result.test_id(),
            duration = result.duration(),
            error = result.error_message().unwrap_or_default(),
            "test case failed"
        ),
        status => tracing::info!(
            test_id = result.test_id(),
            status = status.as_str(),
            duration = result.duration(),
            "test case finished"
        ),
    }

    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
