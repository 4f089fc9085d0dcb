// src/spectral/parser.rs

//! Parsing of gzip-compressed spectrum text files.
//!
//! Layout:
//!
//! ```text
//! # label 0.03 0.04 0.05
//! 2010 01 01 00 00 1.0 2.0 3.0
//! 2010 01 01 01 00 999.0 2.5 0.0
//! ```
//!
//! The first `#` line lists the frequency bins. Every data line starts with
//! year, month, day, hour and minute followed by one value per bin.

use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::fs::FileSystem;
use crate::spectral::timestamp::Timestamp;

/// Sentinel used by the data provider for missing observations.
pub const DEFAULT_MISSING_VALUE: f64 = 999.0;
pub const DEFAULT_MISSING_TOLERANCE: f64 = 0.1;

/// Replaces missing-value sentinels with zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissingValue {
    pub sentinel: f64,
    /// Strict: a value exactly `tolerance` away is kept.
    pub tolerance: f64,
}

impl Default for MissingValue {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_MISSING_VALUE,
            tolerance: DEFAULT_MISSING_TOLERANCE,
        }
    }
}

impl MissingValue {
    pub fn normalize(&self, value: f64) -> f64 {
        if (value - self.sentinel).abs() < self.tolerance {
            0.0
        } else {
            value
        }
    }
}

/// Contents of one spectrum file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedSpectrum {
    pub frequencies: Vec<f64>,
    pub records: BTreeMap<Timestamp, Vec<f64>>,
    /// Non-comment lines seen, parsed or not.
    pub lines: usize,
}

/// Parse decompressed spectrum text.
pub fn parse_spectrum<R: BufRead>(reader: R, missing: MissingValue) -> io::Result<ParsedSpectrum> {
    let mut spectrum = ParsedSpectrum::default();
    let mut header_seen = false;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('#') {
            if !header_seen {
                header_seen = true;
                spectrum.frequencies = header
                    .split_whitespace()
                    .filter_map(parse_value)
                    .collect();
            }
            continue;
        }

        spectrum.lines += 1;
        let mut tokens = line.split_whitespace();
        let Some(timestamp) = parse_timestamp(&mut tokens) else {
            continue;
        };

        let values = tokens
            .map_while(parse_value)
            .map(|value| missing.normalize(value))
            .collect();
        spectrum.records.insert(timestamp, values);
    }

    Ok(spectrum)
}

/// Finite numbers only: `NaN` and `inf` end a row like any other label.
fn parse_value(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn parse_timestamp<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<Timestamp> {
    let mut fields = [0i64; 5];
    for field in fields.iter_mut() {
        *field = tokens.next()?.parse().ok()?;
    }
    let [year, month, day, hour, minute] = fields;
    Timestamp::from_fields(year, month, day, hour, minute, 0)
}

/// Decompress and parse the file at `path`.
pub fn read_spectrum_file(
    fs: &dyn FileSystem,
    path: &Path,
    missing: MissingValue,
) -> anyhow::Result<ParsedSpectrum> {
    let file = fs.open_read(path)?;
    let reader = BufReader::new(GzDecoder::new(file));
    parse_spectrum(reader, missing).with_context(|| format!("parsing spectrum file {:?}", path))
}
