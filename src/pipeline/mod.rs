// src/pipeline/mod.rs

//! The spectral-variance pipeline expressed as a task tree:
//!
//! ```text
//! main ── directory ──┬─ group ──┬─ file (x5)
//!                     │          └─ variance (one per timestamp)
//!                     └─ group ...
//! ```
//!
//! - [`main_task`] starts the run and records the wall-clock time.
//! - [`directory`] scans the inputs, fans out one group per complete
//!   (station, year) and writes the per-year outputs and totals logs.
//! - [`group`] reads its five files, repairs the matrix and fans out one
//!   variance computation per timestamp.
//! - [`file_task`] and [`variance_task`] are the leaves.

pub mod directory;
pub mod file_task;
pub mod group;
pub mod main_task;
pub mod variance_task;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::wire::any_f64;
use crate::engine::{Services, Task, TaskContext};
use crate::errors::{Result, SpectreeError};

pub use directory::DirectoryTask;
pub use file_task::FileTask;
pub use group::{GroupPhase, GroupTask};
pub use main_task::MainTask;
pub use variance_task::VarianceTask;

/// Closed set of task variants making up the pipeline.
#[derive(Debug, Serialize, Deserialize)]
pub enum Kernel {
    Main(MainTask),
    Directory(DirectoryTask),
    Group(GroupTask),
    File(FileTask),
    Variance(VarianceTask),
}

impl Task for Kernel {
    fn kind(&self) -> &'static str {
        match self {
            Kernel::Main(_) => "main",
            Kernel::Directory(_) => "directory",
            Kernel::Group(_) => "group",
            Kernel::File(_) => "file",
            Kernel::Variance(_) => "variance",
        }
    }

    fn act(&mut self, ctx: &mut TaskContext<'_, Self>) -> Result<()> {
        match self {
            Kernel::Main(task) => task.act(ctx),
            Kernel::Directory(task) => task.act(ctx),
            Kernel::Group(task) => task.act(ctx),
            Kernel::File(task) => task.act(ctx),
            Kernel::Variance(task) => task.act(ctx),
        }
    }

    fn react(&mut self, child: Self, ctx: &mut TaskContext<'_, Self>) -> Result<()> {
        let parent = self.kind();
        match self {
            Kernel::Main(task) => task.react(child, ctx),
            Kernel::Directory(task) => task.react(child, ctx),
            Kernel::Group(task) => task.react(child, ctx),
            Kernel::File(_) | Kernel::Variance(_) => Err(SpectreeError::UnexpectedChild {
                parent,
                child: child.kind(),
            }),
        }
    }
}

/// Totals handed back to the caller once the main task committed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Complete (station, year) groups processed.
    pub groups: usize,
    /// Timestamps that produced a variance.
    pub spectra: u64,
    #[serde(with = "any_f64")]
    pub variance_sum: f64,
    pub elapsed_us: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "groups: {}", self.groups)?;
        writeln!(f, "spectra: {}", self.spectra)?;
        writeln!(f, "variance sum: {:.6}", self.variance_sum)?;
        write!(f, "elapsed: {} us", self.elapsed_us)
    }
}

/// Append `text` to an artifact through the configured filesystem.
pub(crate) fn append_artifact(services: &Services, path: &Path, text: &str) -> Result<()> {
    services.fs.append(path, text.as_bytes())?;
    Ok(())
}

fn unexpected(parent: &'static str, child: &Kernel) -> SpectreeError {
    SpectreeError::UnexpectedChild {
        parent,
        child: child.kind(),
    }
}
