// src/pipeline/main_task.rs

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::TaskContext;
use crate::errors::Result;
use crate::fault::FaultPoint;
use crate::pipeline::{DirectoryTask, Kernel, RunSummary, append_artifact, unexpected};
use crate::types::Target;

/// Root of the run.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MainTask {
    inputs: Vec<PathBuf>,
    #[serde(skip)]
    started: Option<Instant>,
    started_at: Option<DateTime<Utc>>,
    summary: Option<RunSummary>,
}

impl MainTask {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            ..Self::default()
        }
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Set once the directory task reported back.
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn into_summary(self) -> Option<RunSummary> {
        self.summary
    }

    pub(crate) fn act(&mut self, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        self.started = Some(Instant::now());
        self.started_at = Some(Utc::now());
        info!(inputs = ?self.inputs, "processing input directories");

        let placement = &ctx.services().config.placement;
        let directory = Kernel::Directory(DirectoryTask::new(self.inputs.clone()));
        if placement.directory == Target::Remote && placement.directory_carries_parent {
            ctx.upstream_carrying_parent(directory, Target::Remote)?;
        } else {
            ctx.upstream(directory, placement.directory)?;
        }

        ctx.crash_if_armed(FaultPoint::Superior);
        Ok(())
    }

    pub(crate) fn react(&mut self, child: Kernel, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        let Kernel::Directory(directory) = child else {
            return Err(unexpected("main", &child));
        };

        let elapsed_us = self
            .started
            .map(|started| started.elapsed().as_micros() as u64)
            .unwrap_or_default();

        let services = ctx.services();
        append_artifact(
            services,
            &services.config.time_log_path(),
            &format!("{elapsed_us}\n"),
        )?;

        let summary = RunSummary {
            groups: directory.groups_total(),
            spectra: directory.spectra(),
            variance_sum: directory.variance_sum(),
            elapsed_us,
            started_at: self.started_at,
        };
        info!(
            groups = summary.groups,
            spectra = summary.spectra,
            elapsed_us,
            "finished all"
        );
        self.summary = Some(summary);

        ctx.commit(Target::Local)
    }
}
