// src/spectral/scan.rs

//! Discovery of spectrum files and grouping into complete five-file groups.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::spectral::variable::{VARIABLE_COUNT, Variable};

const FILE_NAME_PATTERN: &str = r"^([0-9]+)([dijkw])([0-9]+)\.txt\.gz$";

/// Matcher for `<station><variable><year>.txt.gz` file names.
#[derive(Debug, Clone)]
pub struct FileNamePattern(Regex);

impl FileNamePattern {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(FILE_NAME_PATTERN).context("compiling spectrum file name pattern")?;
        Ok(Self(regex))
    }

    /// Describe `path` if its file name follows the naming scheme.
    pub fn parse(&self, path: &Path) -> Option<SpectrumFile> {
        let name = path.file_name()?.to_str()?;
        let caps = self.0.captures(name)?;
        let station = caps[1].parse().ok()?;
        let variable = Variable::from_code(caps[2].chars().next()?)?;
        let year = caps[3].parse().ok()?;
        Some(SpectrumFile {
            path: path.to_path_buf(),
            station,
            variable,
            year,
            station_digits: caps[1].to_string(),
            year_digits: caps[3].to_string(),
        })
    }
}

/// One input file: `<station><variable><year>.txt.gz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectrumFile {
    pub path: PathBuf,
    pub station: u32,
    pub variable: Variable,
    pub year: i32,
    /// Station and year exactly as written in the name; files are grouped on
    /// these, so `012` and `12` stay apart.
    pub station_digits: String,
    pub year_digits: String,
}

impl SpectrumFile {
    pub fn key(&self) -> GroupKey {
        GroupKey {
            year: self.year,
            station: self.station,
        }
    }

    fn grouping(&self) -> (GroupKey, String, String) {
        (self.key(), self.year_digits.clone(), self.station_digits.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub year: i32,
    pub station: u32,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station {} year {}", self.station, self.year)
    }
}

/// Files sharing one (year, station).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectrumGroup {
    pub key: GroupKey,
    pub files: Vec<SpectrumFile>,
}

impl SpectrumGroup {
    /// Exactly five files covering all five variables.
    pub fn is_complete(&self) -> bool {
        let distinct: BTreeSet<Variable> = self.files.iter().map(|f| f.variable).collect();
        self.files.len() == VARIABLE_COUNT && distinct.len() == VARIABLE_COUNT
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Complete groups ordered by (year, station), numerically.
    pub complete: Vec<SpectrumGroup>,
    pub incomplete: Vec<SpectrumGroup>,
    /// Files whose names matched the naming scheme.
    pub files_seen: usize,
}

/// Recursively scan `dirs` and group the spectrum files found.
///
/// Unreadable directories are logged and skipped; names that do not match
/// the scheme are ignored.
pub fn scan_directories(fs: &dyn FileSystem, dirs: &[PathBuf]) -> Result<ScanOutcome> {
    let pattern = FileNamePattern::new()?;
    let mut seen: BTreeSet<PathBuf> = BTreeSet::new();
    let mut groups: BTreeMap<(GroupKey, String, String), Vec<SpectrumFile>> = BTreeMap::new();

    for dir in dirs {
        let files = match fs.walk_files(dir) {
            Ok(files) => files,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "skipping unreadable input directory");
                continue;
            }
        };

        for path in files {
            let Some(file) = pattern.parse(&path) else {
                continue;
            };
            if !seen.insert(path) {
                continue;
            }
            groups.entry(file.grouping()).or_default().push(file);
        }
    }

    let mut outcome = ScanOutcome {
        files_seen: seen.len(),
        ..ScanOutcome::default()
    };

    for ((key, _, _), mut files) in groups {
        files.sort_by_key(|f| f.variable);
        let group = SpectrumGroup { key, files };
        if group.is_complete() {
            outcome.complete.push(group);
        } else {
            debug!(%key, files = group.files.len(), "incomplete group");
            outcome.incomplete.push(group);
        }
    }

    Ok(outcome)
}
