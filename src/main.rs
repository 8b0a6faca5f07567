mod app;
mod config;
mod conflict;
mod models;
mod report;
mod runner;
mod suites;
mod ui;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;

use app::{Orchestrator, RunEvent, Verdict};
use config::Config;
use report::Report;
use runner::CaseContext;
use ui::Console;

/// Exit status for harness faults, as opposed to failing tests.
const EXIT_HARNESS_ERROR: u8 = 2;

/// Run the railway traffic control test catalogue against a live service.
#[derive(Debug, Parser)]
#[command(name = "railcheck", version)]
struct Cli {
    /// Base URL of the service under test.
    #[arg(long, env = "RAILCHECK_BASE_URL")]
    base_url: Option<String>,

    /// Config file (defaults to ./railcheck.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the JSON report.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .try_init();

    match run(cli).await {
        Ok(verdict) => verdict.exit_code(),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("railcheck: {e:#}");
            ExitCode::from(EXIT_HARNESS_ERROR)
        }
    }
}

async fn run(cli: Cli) -> Result<Verdict> {
    let workdir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut config = Config::load(&workdir, cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.service.base_url = base_url;
    }
    if let Some(path) = cli.report {
        config.report.path = path;
    }

    execute_run(config, io::stdout()).await
}

/// Run the catalogue, printing progress to `out`, and write the report.
///
/// Console output is best-effort: a broken `out` never stops the run or the
/// report. Only a report that cannot be written is an error.
async fn execute_run<W>(config: Config, out: W) -> Result<Verdict>
where
    W: Write + Send + 'static,
{
    let report_path = config.report.path.clone();
    let base_url = config.service.base_url.clone();
    let ctx = CaseContext::new(config)?;

    let mut console = Console::new(out);
    let banner_ok = console_step(console.banner(&base_url));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_events(console, banner_ok, event_rx));

    let store = Orchestrator::new(ctx, app::catalogue())
        .with_events(event_tx)
        .run()
        .await;

    // The orchestrator dropped its sender, so the printer drains and exits.
    let console = match printer.await {
        Ok((console, true)) => Some(console),
        Ok((_, false)) => None,
        Err(e) => {
            tracing::warn!("console task failed: {e}");
            None
        }
    };

    let report = Report::generate(&store);
    report.write_to(&report_path)?;

    if let Some(mut console) = console
        && console_step(console.summary(&report))
    {
        console_step(console.report_saved(&report_path));
    }

    Ok(Verdict::from_summary(&report.summary))
}

/// Log a console write failure. Returns whether the console is still usable.
fn console_step(result: io::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("console output failed, continuing without it: {e}");
            false
        }
    }
}

async fn print_events<W: Write>(
    mut console: Console<W>,
    mut ok: bool,
    mut rx: mpsc::UnboundedReceiver<RunEvent>,
) -> (Console<W>, bool) {
    while let Some(event) = rx.recv().await {
        if ok {
            ok = console_step(console.handle_event(&event));
        }
    }
    (console, ok)
}
