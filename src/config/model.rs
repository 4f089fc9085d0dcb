// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::spectral::MissingValue;
use crate::spectral::parser::{DEFAULT_MISSING_TOLERANCE, DEFAULT_MISSING_VALUE};
use crate::types::Target;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [output]
/// dir = "results"
/// suffix = ".out"
///
/// [parser]
/// missing_value = 999.0
/// missing_tolerance = 0.1
///
/// [runtime]
/// remote_workers = 4
///
/// [placement]
/// directory = "remote"
/// directory_carries_parent = true
/// group = "remote"
/// group_carries_parent = false
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub parser: ParserSection,

    #[serde(default)]
    pub runtime: RuntimeSection,

    #[serde(default)]
    pub placement: PlacementSection,
}

/// Validated configuration.
///
/// Obtained through `ConfigFile::try_from(raw)` (see `validate.rs`) or
/// [`ConfigFile::default`].
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub output: OutputSection,
    pub parser: ParserSection,
    pub runtime: RuntimeSection,
    pub placement: PlacementSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            output: raw.output,
            parser: raw.parser,
            runtime: raw.runtime,
            placement: raw.placement,
        }
    }

    /// Path of the per-year output artifact.
    pub fn year_output_path(&self, year: i32) -> PathBuf {
        self.output.dir.join(format!("{year}{}", self.output.suffix))
    }

    pub fn spectra_count_log_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.spectra_count_log)
    }

    pub fn spectra_sum_log_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.spectra_sum_log)
    }

    pub fn time_log_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.time_log)
    }

    pub fn missing_value(&self) -> MissingValue {
        MissingValue {
            sentinel: self.parser.missing_value,
            tolerance: self.parser.missing_tolerance,
        }
    }

    /// Whether any pipeline stage asks for a remote context.
    pub fn uses_remote_placement(&self) -> bool {
        self.placement.directory == Target::Remote || self.placement.group == Target::Remote
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(RawConfigFile::default())
    }
}

/// `[output]` section: where artifacts are appended.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Appended to the year to name the per-year output file.
    #[serde(default = "default_suffix")]
    pub suffix: String,

    #[serde(default = "default_spectra_count_log")]
    pub spectra_count_log: String,

    #[serde(default = "default_spectra_sum_log")]
    pub spectra_sum_log: String,

    #[serde(default = "default_time_log")]
    pub time_log: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_suffix() -> String {
    ".out".to_string()
}

fn default_spectra_count_log() -> String {
    "nspectra.log".to_string()
}

fn default_spectra_sum_log() -> String {
    "sumspectra.log".to_string()
}

fn default_time_log() -> String {
    "time.log".to_string()
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            suffix: default_suffix(),
            spectra_count_log: default_spectra_count_log(),
            spectra_sum_log: default_spectra_sum_log(),
            time_log: default_time_log(),
        }
    }
}

/// `[parser]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ParserSection {
    /// Sentinel marking a missing observation.
    #[serde(default = "default_missing_value")]
    pub missing_value: f64,

    /// Values strictly closer than this to the sentinel become 0.
    #[serde(default = "default_missing_tolerance")]
    pub missing_tolerance: f64,
}

fn default_missing_value() -> f64 {
    DEFAULT_MISSING_VALUE
}

fn default_missing_tolerance() -> f64 {
    DEFAULT_MISSING_TOLERANCE
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            missing_value: default_missing_value(),
            missing_tolerance: default_missing_tolerance(),
        }
    }
}

/// `[runtime]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeSection {
    /// Number of remote execution contexts. `0` means everything runs in the
    /// main context, which requires local placements.
    #[serde(default = "default_remote_workers")]
    pub remote_workers: usize,
}

fn default_remote_workers() -> usize {
    4
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            remote_workers: default_remote_workers(),
        }
    }
}

/// `[placement]` section: where the directory and group tasks run.
///
/// File and variance tasks always run next to their group.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacementSection {
    #[serde(default = "default_remote")]
    pub directory: Target,

    /// Ship a snapshot of the main task along with a remote directory task.
    /// Has no effect when the directory runs locally.
    #[serde(default = "default_true")]
    pub directory_carries_parent: bool,

    #[serde(default = "default_remote")]
    pub group: Target,

    /// Ship a snapshot of the directory task along with every group task.
    #[serde(default)]
    pub group_carries_parent: bool,
}

fn default_remote() -> Target {
    Target::Remote
}

fn default_true() -> bool {
    true
}

impl Default for PlacementSection {
    fn default() -> Self {
        Self {
            directory: default_remote(),
            directory_carries_parent: default_true(),
            group: default_remote(),
            group_carries_parent: false,
        }
    }
}
