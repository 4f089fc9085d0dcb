// src/pipeline/variance_task.rs

use serde::{Deserialize, Serialize};

use crate::engine::TaskContext;
use crate::errors::Result;
use crate::pipeline::Kernel;
use crate::spectral::{SpectrumSlots, Timestamp, compute_variance};
use crate::types::Target;

#[derive(Debug, Serialize, Deserialize)]
pub struct VarianceTask {
    timestamp: Timestamp,
    slots: SpectrumSlots,
    frequencies: Vec<f64>,
    variance: f64,
}

impl VarianceTask {
    pub fn new(timestamp: Timestamp, slots: SpectrumSlots, frequencies: Vec<f64>) -> Self {
        Self {
            timestamp,
            slots,
            frequencies,
            variance: 0.0,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub(crate) fn act(&mut self, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        self.variance = compute_variance(&self.slots, &self.frequencies);
        self.slots = Default::default();
        self.frequencies.clear();
        ctx.commit(Target::Local)
    }
}
