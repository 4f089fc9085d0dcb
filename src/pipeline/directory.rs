// src/pipeline/directory.rs

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::TaskContext;
use crate::engine::wire::any_f64;
use crate::errors::Result;
use crate::fault::FaultPoint;
use crate::pipeline::{GroupTask, Kernel, append_artifact, unexpected};
use crate::spectral::scan_directories;
use crate::types::Target;

/// Scans the inputs and aggregates the group results.
///
/// Owns the per-year output files and the totals logs.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DirectoryTask {
    inputs: Vec<PathBuf>,
    groups_total: usize,
    groups_done: usize,
    spectra: u64,
    #[serde(with = "any_f64")]
    variance_sum: f64,
    /// Input count of the main task snapshot, when one travelled along.
    carried_inputs: Option<usize>,
}

impl DirectoryTask {
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            ..Self::default()
        }
    }

    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn groups_total(&self) -> usize {
        self.groups_total
    }

    pub fn spectra(&self) -> u64 {
        self.spectra
    }

    pub fn variance_sum(&self) -> f64 {
        self.variance_sum
    }

    pub fn carried_inputs(&self) -> Option<usize> {
        self.carried_inputs
    }

    pub(crate) fn act(&mut self, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        if let Some(Kernel::Main(main)) = ctx.carried_parent()? {
            self.carried_inputs = Some(main.inputs().len());
            debug!(inputs = ?main.inputs(), "directory carries the main task");
        }

        if ctx.crash_if_armed(FaultPoint::SuperiorCopy) {
            return Ok(());
        }

        let services = ctx.services();
        let outcome = scan_directories(services.fs.as_ref(), &self.inputs)?;
        if !outcome.incomplete.is_empty() {
            warn!(
                skipped = outcome.incomplete.len(),
                "skipping incomplete groups"
            );
        }
        info!(
            groups = outcome.complete.len(),
            files = outcome.files_seen,
            "scanned input directories"
        );

        self.groups_total = outcome.complete.len();
        if self.groups_total == 0 {
            return self.finish(ctx);
        }

        let placement = &services.config.placement;
        for group in outcome.complete {
            let child = Kernel::Group(GroupTask::new(group));
            if placement.group_carries_parent {
                ctx.upstream_carrying_parent(child, Target::Remote)?;
            } else {
                ctx.upstream(child, placement.group)?;
            }
        }
        Ok(())
    }

    pub(crate) fn react(&mut self, child: Kernel, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        let Kernel::Group(group) = child else {
            return Err(unexpected("directory", &child));
        };

        let services = ctx.services();
        let rows = group.output_rows();
        if !rows.is_empty() {
            let path = services.config.year_output_path(group.key().year);
            append_artifact(services, &path, &rows)?;
        }

        self.groups_done += 1;
        self.spectra += group.num_processed() as u64;
        self.variance_sum += group.variance_sum();
        info!(
            "[{}/{}] finished {}",
            self.groups_done,
            self.groups_total,
            group.key()
        );

        if ctx.pending_children() == 0 {
            self.finish(ctx)?;
        }
        Ok(())
    }

    fn finish(&mut self, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        let services = ctx.services();
        let config = &services.config;
        info!(spectra = self.spectra, sum = self.variance_sum, "total processed spectra");
        append_artifact(
            services,
            &config.spectra_count_log_path(),
            &format!("{}\n", self.spectra),
        )?;
        append_artifact(
            services,
            &config.spectra_sum_log_path(),
            &format!("{:.6}\n", self.variance_sum),
        )?;
        ctx.commit(config.placement.directory)
    }
}
