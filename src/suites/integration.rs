use anyhow::{Result, ensure};
use futures_util::FutureExt;

use crate::models::Outcome;
use crate::runner::checks::{array_field, expect_success, require_fields_each};
use crate::runner::{Case, CaseContext, TestCase};

pub fn cases() -> Vec<Box<dyn TestCase>> {
    vec![
        Box::new(Case::new("INT_001", "Trains API", |ctx| trains_api(ctx).boxed())),
        Box::new(Case::new("INT_002", "Conflicts API", |ctx| {
            conflicts_api(ctx).boxed()
        })),
        Box::new(Case::new("INT_003", "Scenarios API", |ctx| {
            scenarios_api(ctx).boxed()
        })),
        Box::new(Case::new("INT_004", "Demo API", |ctx| demo_api(ctx).boxed())),
    ]
}

async fn trains_api(ctx: &CaseContext) -> Result<Outcome> {
    let body = ctx.client.get_json("/api/trains").await?;
    expect_success(&body)?;
    let trains = array_field(&body, "data")?;
    require_fields_each(trains, &["id", "name", "status", "platform"])?;
    Ok(Outcome::pass())
}

async fn conflicts_api(ctx: &CaseContext) -> Result<Outcome> {
    let body = ctx.client.get_json("/api/conflicts").await?;
    expect_success(&body)?;
    let conflicts = array_field(&body, "data")?;
    require_fields_each(conflicts, &["id", "type", "severity", "status"])?;
    Ok(Outcome::pass())
}

async fn scenarios_api(ctx: &CaseContext) -> Result<Outcome> {
    let body = ctx.client.get_json("/api/scenarios").await?;
    expect_success(&body)?;
    array_field(&body, "data")?;
    Ok(Outcome::pass())
}

async fn demo_api(ctx: &CaseContext) -> Result<Outcome> {
    let body = ctx.client.get_json("/api/demo/seed").await?;
    expect_success(&body)?;
    let modes = array_field(&body, "availableModes")?;
    ensure!(
        modes
            .iter()
            .any(|mode| mode.get("id").and_then(|id| id.as_str()) == Some("conflict_demo")),
        "demo mode conflict_demo is not offered"
    );
    Ok(Outcome::pass())
}
