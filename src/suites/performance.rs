use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use async_trait::async_trait;
use futures_util::{FutureExt, StreamExt, stream};
use serde_json::{Value, json};

use crate::conflict::{Booking, TimeOfDay, detect_platform_conflicts};
use crate::models::Outcome;
use crate::runner::{Case, CaseContext, TestCase};

const PROBED_ENDPOINTS: [&str; 4] = [
    "/api/trains",
    "/api/conflicts",
    "/api/performance",
    "/api/scenarios",
];

const LOAD_ENDPOINT: &str = "/api/trains";

const SLOT_MINUTES: u16 = 5;

pub fn cases() -> Vec<Box<dyn TestCase>> {
    let mut cases: Vec<Box<dyn TestCase>> = PROBED_ENDPOINTS
        .into_iter()
        .map(|endpoint| Box::new(ResponseTime::new(endpoint)) as Box<dyn TestCase>)
        .collect();

    cases.push(Box::new(Case::new("PERF_CONCURRENT", "Concurrent Requests", |ctx| {
        concurrent_requests(ctx).boxed()
    })));
    cases.push(Box::new(Case::new(
        "PERF_LARGE_DATASET",
        "Large Dataset Handling",
        |ctx| large_dataset_handling(ctx).boxed(),
    )));

    cases
}

/// A single GET that must come back `200 OK` within the response-time limit.
pub struct ResponseTime {
    id: String,
    name: String,
    endpoint: &'static str,
}

impl ResponseTime {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            id: format!("PERF_{}", endpoint.replace('/', "_")),
            name: format!("Response Time {endpoint}"),
            endpoint,
        }
    }
}

#[async_trait]
impl TestCase for ResponseTime {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: &CaseContext) -> Result<Outcome> {
        let elapsed = ctx
            .client
            .probe(self.endpoint, ctx.config.service.probe_timeout())
            .await?;
        let limit = ctx.config.performance.response_time_limit();
        ensure!(
            elapsed < limit,
            "Response time {:.2}s exceeds {}s limit",
            elapsed.as_secs_f64(),
            limit.as_secs_f64()
        );
        Ok(Outcome::pass())
    }
}

async fn concurrent_requests(ctx: &CaseContext) -> Result<Outcome> {
    let perf = &ctx.config.performance;
    ensure!(perf.concurrent_requests > 0, "no concurrent requests configured");
    ensure!(perf.concurrency > 0, "concurrency must be at least 1");

    let timeout = ctx.config.service.probe_timeout();
    let responses: Vec<Result<Duration>> = stream::iter(0..perf.concurrent_requests)
        .map(|_| ctx.client.probe(LOAD_ENDPOINT, timeout))
        .buffer_unordered(perf.concurrency)
        .collect()
        .await;

    let mut latencies = Vec::with_capacity(responses.len());
    let mut failures = Vec::new();
    for response in responses {
        match response {
            Ok(latency) => latencies.push(latency),
            Err(e) => failures.push(format!("{e:#}")),
        }
    }
    if let Some(first) = failures.first() {
        anyhow::bail!(
            "{} of {} concurrent requests failed, first: {first}",
            failures.len(),
            perf.concurrent_requests
        );
    }

    let stats = LatencyStats::from_samples(&mut latencies)
        .context("no latencies recorded")?;
    let limit = perf.response_time_limit();
    ensure!(
        stats.p95 < limit,
        "p95 latency {:.2}s exceeds {}s limit",
        stats.p95.as_secs_f64(),
        limit.as_secs_f64()
    );

    Ok(Outcome::pass_with(
        stats.to_details(perf.concurrent_requests, perf.concurrency),
    ))
}

async fn large_dataset_handling(ctx: &CaseContext) -> Result<Outcome> {
    let perf = &ctx.config.performance;
    let (bookings, duplicates) =
        synthetic_timetable(perf.large_dataset_platforms, perf.large_dataset_slots)?;

    let start = Instant::now();
    let conflicts = detect_platform_conflicts(&bookings);
    let elapsed = start.elapsed();

    ensure!(
        conflicts.len() == duplicates,
        "Expected {duplicates} conflicts, got {}",
        conflicts.len()
    );
    let budget = perf.large_dataset_budget();
    ensure!(
        elapsed <= budget,
        "conflict detection over {} bookings took {}ms, budget is {}ms",
        bookings.len(),
        elapsed.as_millis(),
        budget.as_millis()
    );

    Ok(Outcome::pass_with(json!({
        "bookings": bookings.len(),
        "conflicts": conflicts.len(),
        "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
    })))
}

/// Back-to-back slots on every platform, with every tenth slot double-booked.
///
/// Returns the bookings and the number of double bookings, which is exactly
/// the number of conflicts the timetable contains.
fn synthetic_timetable(platforms: usize, slots: usize) -> Result<(Vec<Booking>, usize)> {
    let mut bookings = Vec::with_capacity(platforms * slots + platforms * slots / 10 + 1);
    let mut duplicates = 0;

    for platform in 0..platforms {
        for slot in 0..slots {
            let start = u16::try_from(slot)
                .ok()
                .and_then(|s| s.checked_mul(SLOT_MINUTES))
                .and_then(TimeOfDay::from_minutes)
                .with_context(|| format!("{slots} slots of {SLOT_MINUTES} minutes overrun the day"))?;
            let end = start
                .checked_add_minutes(SLOT_MINUTES)
                .with_context(|| format!("{slots} slots of {SLOT_MINUTES} minutes overrun the day"))?;

            let booking = Booking::new(
                format!("T{platform:02}{slot:03}"),
                (platform + 1).to_string(),
                start,
                end,
            );

            if (platform * slots + slot) % 10 == 0 {
                bookings.push(Booking {
                    id: format!("{}X", booking.id),
                    ..booking.clone()
                });
                duplicates += 1;
            }
            bookings.push(booking);
        }
    }

    Ok((bookings, duplicates))
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LatencyStats {
    min: Duration,
    mean: Duration,
    p50: Duration,
    p95: Duration,
    max: Duration,
}

impl LatencyStats {
    /// Sorts `samples` in place.
    fn from_samples(samples: &mut [Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable();

        let total: Duration = samples.iter().sum();
        Some(Self {
            min: samples[0],
            mean: total / samples.len() as u32,
            p50: percentile(samples, 50),
            p95: percentile(samples, 95),
            max: samples[samples.len() - 1],
        })
    }

    fn to_details(self, requests: usize, concurrency: usize) -> Value {
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;
        json!({
            "requests": requests,
            "concurrency": concurrency,
            "min_ms": ms(self.min),
            "mean_ms": ms(self.mean),
            "p50_ms": ms(self.p50),
            "p95_ms": ms(self.p95),
            "max_ms": ms(self.max),
        })
    }
}

/// Nearest-rank percentile of sorted, non-empty samples.
fn percentile(sorted: &[Duration], pct: usize) -> Duration {
    let rank = (pct * sorted.len()).div_ceil(100).max(1);
    sorted[rank - 1]
}
