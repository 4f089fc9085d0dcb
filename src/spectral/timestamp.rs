// src/spectral/timestamp.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sortable key for one observation.
///
/// Composed with a fixed radix (60 s, 60 min, 24 h, 31 days, 12 months), so
/// it orders like the calendar date but is not a real epoch offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// `second + 60*(minute + 60*(hour + 24*(day + 31*(month + 12*year))))`.
    ///
    /// `None` on overflow.
    pub fn from_fields(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
    ) -> Option<Self> {
        let months = year.checked_mul(12)?.checked_add(month)?;
        let days = months.checked_mul(31)?.checked_add(day)?;
        let hours = days.checked_mul(24)?.checked_add(hour)?;
        let minutes = hours.checked_mul(60)?.checked_add(minute)?;
        let seconds = minutes.checked_mul(60)?.checked_add(second)?;
        Some(Self(seconds))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
