use anyhow::{Context, Result, ensure};
use futures_util::FutureExt;
use serde_json::json;

use crate::models::Outcome;
use crate::runner::checks::{array_field, expect_success, field, number_field, str_field};
use crate::runner::{Case, CaseContext, TestCase};

pub fn cases() -> Vec<Box<dyn TestCase>> {
    vec![
        Box::new(Case::new("E2E_001", "Complete Optimization Flow", |ctx| {
            optimization_flow(ctx).boxed()
        })),
        Box::new(Case::new("E2E_005", "Conflict Resolution Flow", |ctx| {
            conflict_resolution(ctx).boxed()
        })),
        Box::new(Case::new("E2E_012", "Demo Simulation Flow", |ctx| {
            demo_simulation(ctx).boxed()
        })),
    ]
}

async fn optimization_flow(ctx: &CaseContext) -> Result<Outcome> {
    ctx.client
        .probe("/api/performance", ctx.config.service.request_timeout())
        .await
        .context("performance snapshot")?;

    let body = ctx
        .client
        .post_json(
            "/api/ai/optimize",
            &json!({ "algorithm": "hybrid", "target": "throughput", "timeHorizon": "1h" }),
        )
        .await
        .context("optimization run")?;
    expect_success(&body)?;

    let result = field(&body, "result")?;
    let improvement = number_field(result, "improvement")?;
    ensure!(
        improvement > 0.0,
        "expected a positive improvement, got {improvement}"
    );

    Ok(Outcome::pass_with(json!({ "improvement": improvement })))
}

async fn conflict_resolution(ctx: &CaseContext) -> Result<Outcome> {
    let body = ctx
        .client
        .get_json("/api/conflicts")
        .await
        .context("active conflicts")?;
    let active = array_field(&body, "data")?;

    let Some(conflict) = active.first() else {
        return Ok(Outcome::skip("No active conflicts to test"));
    };
    let conflict_id = str_field(conflict, "id")?;

    ctx.client
        .post_json(
            "/api/conflicts",
            &json!({ "action": "generate_suggestions", "conflictId": conflict_id }),
        )
        .await
        .context("suggestion generation")?;

    ctx.client
        .post_json(
            "/api/conflicts",
            &json!({ "action": "resolve", "conflictId": conflict_id, "suggestionId": "SUG001" }),
        )
        .await
        .context("resolution")?;

    Ok(Outcome::pass())
}

async fn demo_simulation(ctx: &CaseContext) -> Result<Outcome> {
    ctx.client
        .post_json("/api/demo/seed", &json!({ "mode": "conflict_demo" }))
        .await
        .context("demo seed")?;

    let body = ctx
        .client
        .post_json(
            "/api/demo/simulate",
            &json!({ "scenario": "conflict_demo", "timeScale": 4, "duration": 30 }),
        )
        .await
        .context("simulation")?;
    expect_success(&body)?;

    let simulation = field(&body, "simulation")?;
    let events = array_field(simulation, "events")?;
    ensure!(!events.is_empty(), "simulation produced no events");

    Ok(Outcome::pass_with(json!({ "events": events.len() })))
}
