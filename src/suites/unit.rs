use anyhow::{Context, Result, ensure};
use futures_util::FutureExt;
use serde_json::{Value, json};

use crate::conflict::{Booking, ConflictKind, detect_platform_conflicts};
use crate::models::Outcome;
use crate::runner::checks::{array_field, expect_success, require_fields};
use crate::runner::{Case, CaseContext, TestCase};

const SUGGESTION_FIELDS: [&str; 5] = ["id", "title", "description", "effectiveness", "impact"];

pub fn cases() -> Vec<Box<dyn TestCase>> {
    vec![
        Box::new(Case::new("UNIT_001", "Platform Conflict Detection", |ctx| {
            platform_conflict_detection(ctx).boxed()
        })),
        Box::new(Case::new("UNIT_002", "Adjacent Slot Boundary", |ctx| {
            adjacent_slot_boundary(ctx).boxed()
        })),
        Box::new(Case::new("UNIT_003", "Platform Isolation", |ctx| {
            platform_isolation(ctx).boxed()
        })),
        Box::new(Case::new("UNIT_004", "AI Suggestion Generation", |ctx| {
            ai_suggestion_generation(ctx).boxed()
        })),
    ]
}

fn timetable(fixture: Value) -> Result<Vec<Booking>> {
    serde_json::from_value(fixture).context("invalid timetable fixture")
}

async fn platform_conflict_detection(_ctx: &CaseContext) -> Result<Outcome> {
    let trains = timetable(json!([
        { "id": "12951", "platform": "1", "arrival": "14:30", "departure": "14:35" },
        { "id": "12002", "platform": "1", "arrival": "14:32", "departure": "14:40" },
    ]))?;

    let conflicts = detect_platform_conflicts(&trains);
    ensure!(
        conflicts.len() == 1,
        "Expected 1 conflict, got {}",
        conflicts.len()
    );

    let conflict = &conflicts[0];
    ensure!(
        conflict.kind == ConflictKind::PlatformConflict,
        "unexpected conflict type {:?}",
        conflict.kind
    );
    ensure!(
        conflict.resource_ids == ["12951", "12002"],
        "unexpected conflicting trains {:?}",
        conflict.resource_ids
    );
    ensure!(
        conflict.resource == "1",
        "unexpected platform {}",
        conflict.resource
    );

    Ok(Outcome::pass())
}

async fn adjacent_slot_boundary(_ctx: &CaseContext) -> Result<Outcome> {
    let trains = timetable(json!([
        { "id": "12951", "platform": "1", "arrival": "14:30", "departure": "14:35" },
        { "id": "12952", "platform": "1", "arrival": "14:35", "departure": "14:40" },
    ]))?;

    let conflicts = detect_platform_conflicts(&trains);
    ensure!(
        conflicts.is_empty(),
        "back-to-back slots reported as {} conflict(s)",
        conflicts.len()
    );

    Ok(Outcome::pass())
}

async fn platform_isolation(_ctx: &CaseContext) -> Result<Outcome> {
    let trains = timetable(json!([
        { "id": "12951", "platform": "1", "arrival": "14:30", "departure": "14:35" },
        { "id": "12002", "platform": "2", "arrival": "14:30", "departure": "14:35" },
        { "id": "22691", "platform": "3", "arrival": "14:32", "departure": "14:40" },
    ]))?;

    let conflicts = detect_platform_conflicts(&trains);
    ensure!(
        conflicts.is_empty(),
        "trains on separate platforms reported as {} conflict(s)",
        conflicts.len()
    );

    Ok(Outcome::pass())
}

async fn ai_suggestion_generation(ctx: &CaseContext) -> Result<Outcome> {
    let body = ctx
        .client
        .post_json(
            "/api/conflicts",
            &json!({ "action": "generate_suggestions", "conflictId": "TEST_CNF001" }),
        )
        .await?;

    expect_success(&body)?;
    let suggestions = array_field(&body, "suggestions")?;
    let first = suggestions
        .first()
        .context("expected at least one suggestion, got none")?;
    require_fields(first, &SUGGESTION_FIELDS)?;

    Ok(Outcome::pass())
}
