// src/spectral/mod.rs

//! Data layer of the spectral-variance pipeline: file discovery, parsing,
//! per-timestamp assembly and the variance formula. Nothing here knows about
//! tasks.

pub mod matrix;
pub mod parser;
pub mod scan;
pub mod timestamp;
pub mod variable;
pub mod variance;

pub use matrix::{SpectrumMatrix, SpectrumSlots};
pub use parser::{MissingValue, ParsedSpectrum, parse_spectrum, read_spectrum_file};
pub use scan::{FileNamePattern, GroupKey, ScanOutcome, SpectrumFile, SpectrumGroup, scan_directories};
pub use timestamp::Timestamp;
pub use variable::{VARIABLE_COUNT, Variable};
pub use variance::compute_variance;
