#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use spectree::config::{ConfigFile, RawConfigFile};
use spectree::fs::mock::MockFileSystem;
use spectree::spectral::Variable;
use spectree::types::Target;

/// Gzip `text` the way the data provider ships spectrum files.
pub fn gzip_bytes(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(text.as_bytes())
        .expect("writing to an in-memory encoder");
    encoder.finish().expect("finishing an in-memory encoder")
}

/// `<station><variable><year>.txt.gz`
pub fn spectrum_file_name(station: u32, variable: Variable, year: i32) -> String {
    format!("{station}{}{year}.txt.gz", variable.code())
}

/// Builder for the text of one spectrum file.
#[derive(Debug, Clone, Default)]
pub struct SpectrumFileBuilder {
    header: Option<String>,
    lines: Vec<String>,
}

impl SpectrumFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header line listing the frequency bins, with a leading label.
    pub fn frequencies(mut self, frequencies: &[f64]) -> Self {
        let bins: Vec<String> = frequencies.iter().map(|f| f.to_string()).collect();
        self.header = Some(format!("# freq {}", bins.join(" ")));
        self
    }

    /// One observation at `year-month-day hour:minute`.
    pub fn row(mut self, fields: [i64; 5], values: &[f64]) -> Self {
        let [year, month, day, hour, minute] = fields;
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.lines.push(format!(
            "{year:04} {month:02} {day:02} {hour:02} {minute:02} {}",
            values.join(" ")
        ));
        self
    }

    /// Arbitrary line, e.g. garbage or an extra comment.
    pub fn line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn text(&self) -> String {
        let mut text = String::new();
        if let Some(header) = &self.header {
            text.push_str(header);
            text.push('\n');
        }
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    pub fn gzip(&self) -> Vec<u8> {
        gzip_bytes(&self.text())
    }
}

/// Five files of one (station, year), one builder per variable.
#[derive(Debug, Clone)]
pub struct StationFixture {
    pub station: u32,
    pub year: i32,
    files: Vec<(Variable, SpectrumFileBuilder)>,
}

impl StationFixture {
    pub fn new(station: u32, year: i32) -> Self {
        Self {
            station,
            year,
            files: Vec::new(),
        }
    }

    /// Same builder for every variable.
    pub fn uniform(station: u32, year: i32, builder: SpectrumFileBuilder) -> Self {
        let mut fixture = Self::new(station, year);
        for variable in Variable::ALL {
            fixture = fixture.with(variable, builder.clone());
        }
        fixture
    }

    pub fn with(mut self, variable: Variable, builder: SpectrumFileBuilder) -> Self {
        self.files.retain(|(v, _)| *v != variable);
        self.files.push((variable, builder));
        self
    }

    pub fn without(mut self, variable: Variable) -> Self {
        self.files.retain(|(v, _)| *v != variable);
        self
    }

    pub fn path_of(&self, dir: &Path, variable: Variable) -> PathBuf {
        dir.join(spectrum_file_name(self.station, variable, self.year))
    }

    /// Write the files into a real directory.
    pub fn write_to(&self, dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        for (variable, builder) in &self.files {
            std::fs::write(self.path_of(dir, *variable), builder.gzip())?;
        }
        Ok(())
    }

    /// Add the files to an in-memory filesystem.
    pub fn add_to(&self, fs: &MockFileSystem, dir: &Path) {
        for (variable, builder) in &self.files {
            fs.add_file(self.path_of(dir, *variable), builder.gzip());
        }
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output.dir = dir.into();
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.runtime.remote_workers = workers;
        self
    }

    pub fn directory_placement(mut self, target: Target) -> Self {
        self.config.placement.directory = target;
        self
    }

    pub fn directory_carries_parent(mut self, carries: bool) -> Self {
        self.config.placement.directory_carries_parent = carries;
        self
    }

    pub fn group_placement(mut self, target: Target) -> Self {
        self.config.placement.group = target;
        self
    }

    pub fn group_carries_parent(mut self, carries: bool) -> Self {
        self.config.placement.group_carries_parent = carries;
        self
    }

    /// Everything in the main context, no workers.
    pub fn all_local(self) -> Self {
        self.directory_placement(Target::Local)
            .group_placement(Target::Local)
            .workers(0)
    }

    pub fn missing(mut self, sentinel: f64, tolerance: f64) -> Self {
        self.config.parser.missing_value = sentinel;
        self.config.parser.missing_tolerance = tolerance;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
