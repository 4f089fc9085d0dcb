// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fault;
pub mod fs;
pub mod hierarchy;
pub mod logging;
pub mod pipeline;
pub mod spectral;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::anyhow;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::engine::{CoreRuntime, Placement, Runtime, Services};
use crate::errors::{Result, SpectreeError};
use crate::exec::WorkerPool;
use crate::fault::{Environment, ProcessEnvironment};
use crate::fs::{FileSystem, RealFileSystem};
use crate::pipeline::{Kernel, MainTask, RunSummary};
use crate::spectral::scan_directories;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - the real filesystem and process environment
/// - the pipeline run (or the dry-run listing)
pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let mut raw = load_or_default(args.config.as_deref())?;
    if let Some(dir) = args.output_dir {
        raw.output.dir = dir;
    }
    if let Some(workers) = args.workers {
        raw.runtime.remote_workers = workers;
    }
    if let Some(target) = args.group_placement {
        raw.placement.group = target;
    }
    let config = ConfigFile::try_from(raw)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    if args.dry_run {
        print_dry_run(fs.as_ref(), &args.inputs, &config)?;
        return Ok(());
    }

    let env: Arc<dyn Environment> = Arc::new(ProcessEnvironment::detect());
    let services = Arc::new(Services::new(fs, env, config));

    let summary = run_pipeline(args.inputs, services).await?;
    println!("{summary}");
    Ok(())
}

/// Run the whole pipeline over `inputs` and return the totals.
///
/// Starts the remote worker contexts the placement needs, drives the main
/// task in the current context and shuts the workers down afterwards. A
/// worker that fails (including a simulated crash) fails the run.
pub async fn run_pipeline(inputs: Vec<PathBuf>, services: Arc<Services>) -> Result<RunSummary> {
    let workers = if services.config.uses_remote_placement() {
        services.config.runtime.remote_workers
    } else {
        0
    };

    let (pool, mut handles) = WorkerPool::spawn::<Kernel>(workers, services.clone());
    let core = CoreRuntime::<Kernel>::new(services.clone(), Placement::new(pool.size() > 0));
    let runtime = Runtime::new(core, pool.clone());
    let root = Kernel::Main(MainTask::new(inputs));

    let outcome = tokio::select! {
        result = runtime.run_root(root) => result,
        Some(joined) = handles.join_next() => Err(worker_exit(joined)),
    };

    pool.shutdown();
    while let Some(joined) = handles.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "worker context failed while shutting down"),
            Err(err) => warn!(error = %err, "worker context panicked"),
        }
    }
    debug!("worker contexts stopped");

    match outcome? {
        Kernel::Main(main) => {
            let summary = main.into_summary().ok_or_else(|| {
                SpectreeError::HierarchyError("main task committed without a summary".to_string())
            })?;
            info!(groups = summary.groups, spectra = summary.spectra, "run finished");
            Ok(summary)
        }
        other => Err(SpectreeError::HierarchyError(format!(
            "root finished as a {} task",
            engine::Task::kind(&other)
        ))),
    }
}

fn worker_exit(joined: std::result::Result<Result<()>, JoinError>) -> SpectreeError {
    match joined {
        Ok(Err(err)) => err,
        Ok(Ok(())) => SpectreeError::HierarchyError(
            "worker context stopped before the run finished".to_string(),
        ),
        Err(err) => SpectreeError::Other(anyhow!("worker context panicked: {err}")),
    }
}

/// Dry-run output: print configuration and the groups that would run.
fn print_dry_run(fs: &dyn FileSystem, inputs: &[PathBuf], cfg: &ConfigFile) -> Result<()> {
    let outcome = scan_directories(fs, inputs)?;

    println!("spectree dry-run");
    println!("  output.dir = {}", cfg.output.dir.display());
    println!("  placement.directory = {}", cfg.placement.directory);
    println!(
        "  placement.directory_carries_parent = {}",
        cfg.placement.directory_carries_parent
    );
    println!("  placement.group = {}", cfg.placement.group);
    println!("  runtime.remote_workers = {}", cfg.runtime.remote_workers);
    println!();

    println!("complete groups ({}):", outcome.complete.len());
    for group in &outcome.complete {
        println!("  - {}", group.key);
    }

    if !outcome.incomplete.is_empty() {
        println!("incomplete groups ({}):", outcome.incomplete.len());
        for group in &outcome.incomplete {
            let variables: String = group.files.iter().map(|f| f.variable.code()).collect();
            println!("  - {} (variables: {variables})", group.key);
        }
    }

    debug!(files = outcome.files_seen, "dry-run complete (no execution)");
    Ok(())
}
