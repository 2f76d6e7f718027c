//! Demo: a retained download-like task tracked in store state.
//!
//! Usage:
//!   unistore-demo                          # five values, 200ms apart
//!   unistore-demo --values 3 --fail        # source fails after three values
//!   unistore-demo --cancel-after 500       # stop the source early

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use futures::stream::{self, Stream};
use tokio_util::sync::CancellationToken;

use unistore::logging::init_tracing;
use unistore::mvi::{FnReducer, Intent, StoreState};
use unistore::status::{TaskState, TaskStatus, Tracker};
use unistore::store::Store;
use unistore::task::{RetainedTaskAction, TaskScope};
use unistore::{StoreConfig, TaskError};

#[derive(Parser)]
#[command(name = "unistore-demo")]
#[command(about = "Track a simulated download through a unistore store")]
struct Args {
    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of values the source emits
    #[arg(long, default_value_t = 5)]
    values: u64,

    /// Delay between values in milliseconds
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,

    /// Fail the source after its last value
    #[arg(long)]
    fail: bool,

    /// Cancel the source after this many milliseconds
    #[arg(long)]
    cancel_after: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Download {
    runs: u32,
    progress: TaskState<u64>,
    status: TaskStatus,
}

impl StoreState for Download {}

#[derive(Debug, Clone)]
enum DownloadIntent {
    Begin,
}

impl Intent for DownloadIntent {}

fn progress_field(state: &mut Download) -> &mut TaskState<u64> {
    &mut state.progress
}

fn status_field(state: &mut Download) -> &mut TaskStatus {
    &mut state.status
}

fn reduce(state: Download, intent: &DownloadIntent) -> Download {
    match intent {
        DownloadIntent::Begin => Download {
            runs: state.runs + 1,
            ..Download::default()
        },
    }
}

/// Percent-complete values on a timer, optionally ending in an error.
fn progress_source(
    values: u64,
    every: Duration,
    fail: bool,
) -> impl Stream<Item = Result<u64, TaskError>> + Send + 'static {
    let last = values + u64::from(fail);
    stream::unfold(1u64, move |step| async move {
        if step > last {
            return None;
        }
        tokio::time::sleep(every).await;
        let item = if step > values {
            Err(TaskError::source_failed("simulated source failure"))
        } else {
            Ok(step * 100 / values)
        };
        Some((item, step + 1))
    })
}

fn download_task(
    values: u64,
    every: Duration,
    fail: bool,
    stop: CancellationToken,
) -> RetainedTaskAction<Download, DownloadIntent> {
    RetainedTaskAction::new(move |scope: &mut TaskScope<Download, DownloadIntent>| {
        scope.dispatch().send(DownloadIntent::Begin);

        let progress = Tracker::new(scope.dispatch().clone(), "progress", progress_field);
        let source = progress_source(values, every, fail);
        let token = stop.clone();
        scope.spawn(move |_ctx| async move { progress.drive(source, token).await })?;

        let status = Tracker::new(scope.dispatch().clone(), "status", status_field);
        let source = progress_source(values, every, fail);
        let token = stop.clone();
        scope.spawn(move |_ctx| async move { status.drive(source, token).await })?;

        Ok(())
    })
    .with_label("download")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => StoreConfig::load_from(path),
        None => StoreConfig::load(),
    }
    .context("Failed to load configuration")?;

    let store = Store::builder(FnReducer::new(reduce), Download::default())
        .config(&config)
        .with_tasks()
        .build();

    let mut changes =
        store.subscribe(|state: &Download| (state.progress.clone(), state.status.clone()));

    let stop = CancellationToken::new();
    if let Some(ms) = args.cancel_after {
        let stop = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            stop.cancel();
        });
    }

    let every = Duration::from_millis(args.interval_ms);
    store.dispatch(download_task(args.values, every, args.fail, stop));
    tracing::info!(retained = store.retained_tasks(), "Download started");

    while let Some((progress, status)) = changes.recv().await {
        println!("progress={:?} status={:?}", progress, status);
        if progress.is_done() && status.is_done() {
            break;
        }
    }

    let state = store.state();
    println!(
        "final: runs={} value={:?} error={:?}",
        state.runs,
        state.progress.value(),
        state.progress.error()
    );
    Ok(())
}
