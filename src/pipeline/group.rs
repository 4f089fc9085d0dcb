// src/pipeline/group.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::TaskContext;
use crate::engine::wire::any_f64;
use crate::errors::Result;
use crate::pipeline::{FileTask, Kernel, VarianceTask, unexpected};
use crate::spectral::{
    GroupKey, SpectrumFile, SpectrumGroup, SpectrumMatrix, Timestamp, VARIABLE_COUNT, Variable,
};
use crate::types::Target;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupPhase {
    /// Waiting for the five file tasks.
    #[default]
    Reading,
    /// Waiting for the per-timestamp variance tasks.
    Processing,
}

/// One complete (station, year): five files in, one variance per timestamp
/// out.
#[derive(Debug, Serialize, Deserialize)]
pub struct GroupTask {
    key: GroupKey,
    files: Vec<SpectrumFile>,
    phase: GroupPhase,
    frequency_sets: [Vec<f64>; VARIABLE_COUNT],
    matrix: SpectrumMatrix,
    #[serde(with = "any_f64::values")]
    out: BTreeMap<Timestamp, f64>,
}

impl GroupTask {
    pub fn new(group: SpectrumGroup) -> Self {
        Self {
            key: group.key,
            files: group.files,
            phase: GroupPhase::Reading,
            frequency_sets: Default::default(),
            matrix: SpectrumMatrix::new(),
            out: BTreeMap::new(),
        }
    }

    pub fn key(&self) -> GroupKey {
        self.key
    }

    pub fn phase(&self) -> GroupPhase {
        self.phase
    }

    pub fn num_processed(&self) -> usize {
        self.out.len()
    }

    pub fn variance_sum(&self) -> f64 {
        self.out.values().sum()
    }

    pub fn variances(&self) -> &BTreeMap<Timestamp, f64> {
        &self.out
    }

    /// `year,station,variance` lines in timestamp order.
    pub fn output_rows(&self) -> String {
        self.out
            .values()
            .map(|variance| format!("{},{},{variance:.6}\n", self.key.year, self.key.station))
            .collect()
    }

    /// The density header, or the first non-empty header in variable order.
    ///
    /// Independent of the order in which the files reported.
    pub fn frequencies(&self) -> &[f64] {
        let density = &self.frequency_sets[Variable::DENSITY.slot()];
        if !density.is_empty() {
            return density;
        }
        Variable::ALL
            .iter()
            .map(|variable| &self.frequency_sets[variable.slot()])
            .find(|set| !set.is_empty())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn act(&mut self, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        if let Some(Kernel::Directory(parent)) = ctx.carried_parent()? {
            debug!(
                key = %self.key,
                parent_inputs = parent.inputs().len(),
                "group carries its directory task"
            );
        }

        for file in &self.files {
            ctx.upstream(Kernel::File(FileTask::new(file.clone())), Target::Local)?;
        }
        Ok(())
    }

    pub(crate) fn react(&mut self, child: Kernel, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        match (self.phase, child) {
            (GroupPhase::Reading, Kernel::File(file)) => {
                let variable = file.file().variable;
                let spectrum = file.into_spectrum();
                self.frequency_sets[variable.slot()] = spectrum.frequencies;
                self.matrix.insert_variable(variable, spectrum.records);

                if ctx.pending_children() == 0 {
                    self.process_spectra(ctx)?;
                }
                Ok(())
            }
            (GroupPhase::Processing, Kernel::Variance(variance)) => {
                self.out.insert(variance.timestamp(), variance.variance());
                if ctx.pending_children() == 0 {
                    self.finish(ctx)?;
                }
                Ok(())
            }
            (_, other) => Err(unexpected("group", &other)),
        }
    }

    fn process_spectra(&mut self, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        self.phase = GroupPhase::Processing;
        debug!(
            key = %self.key,
            records = self.matrix.len(),
            frequencies = self.frequencies().len(),
            "all files read"
        );

        let removed = self.matrix.remove_incomplete_records();
        if removed > 0 {
            info!(
                station = self.key.station,
                year = self.key.year,
                removed,
                "removed incomplete records"
            );
        }

        if self.matrix.is_empty() {
            return self.finish(ctx);
        }

        let frequencies = self.frequencies().to_vec();
        for (timestamp, slots) in self.matrix.drain() {
            let task = VarianceTask::new(timestamp, slots, frequencies.clone());
            ctx.upstream(Kernel::Variance(task), Target::Local)?;
        }
        Ok(())
    }

    fn finish(&mut self, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        info!(station = self.key.station, year = self.key.year, "finished group");
        // Only the key travels back; the inputs are no longer needed.
        self.files.truncate(1);
        self.frequency_sets = Default::default();
        ctx.commit(ctx.services().config.placement.group)
    }
}
