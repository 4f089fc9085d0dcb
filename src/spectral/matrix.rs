// src/spectral/matrix.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::spectral::timestamp::Timestamp;
use crate::spectral::variable::{VARIABLE_COUNT, Variable};

/// Five value vectors of one timestamp, indexed by [`Variable::slot`].
pub type SpectrumSlots = [Vec<f64>; VARIABLE_COUNT];

/// Per-timestamp assembly of the five variables of one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectrumMatrix {
    records: BTreeMap<Timestamp, SpectrumSlots>,
}

impl SpectrumMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the records of one variable. Files can arrive in any order.
    pub fn insert_variable(&mut self, variable: Variable, records: BTreeMap<Timestamp, Vec<f64>>) {
        for (timestamp, values) in records {
            self.records.entry(timestamp).or_default()[variable.slot()] = values;
        }
    }

    /// Drop every timestamp whose five vectors differ in length.
    ///
    /// Returns the number of removed timestamps.
    pub fn remove_incomplete_records(&mut self) -> usize {
        let before = self.records.len();
        self.records.retain(|_, slots| {
            let len = slots[0].len();
            slots.iter().all(|slot| slot.len() == len)
        });
        before - self.records.len()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, timestamp: Timestamp) -> Option<&SpectrumSlots> {
        self.records.get(&timestamp)
    }

    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.records.keys().copied()
    }

    /// Hand out all records, leaving the matrix empty.
    pub fn drain(&mut self) -> BTreeMap<Timestamp, SpectrumSlots> {
        std::mem::take(&mut self.records)
    }
}
