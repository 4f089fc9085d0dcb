// src/pipeline/file_task.rs

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::TaskContext;
use crate::errors::Result;
use crate::fault::FaultPoint;
use crate::pipeline::Kernel;
use crate::spectral::{ParsedSpectrum, SpectrumFile, read_spectrum_file};
use crate::types::Target;

/// Reads one spectrum file.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileTask {
    file: SpectrumFile,
    spectrum: ParsedSpectrum,
}

impl FileTask {
    pub fn new(file: SpectrumFile) -> Self {
        Self {
            file,
            spectrum: ParsedSpectrum::default(),
        }
    }

    pub fn file(&self) -> &SpectrumFile {
        &self.file
    }

    pub fn spectrum(&self) -> &ParsedSpectrum {
        &self.spectrum
    }

    pub fn into_spectrum(self) -> ParsedSpectrum {
        self.spectrum
    }

    pub(crate) fn act(&mut self, ctx: &mut TaskContext<'_, Kernel>) -> Result<()> {
        if ctx.crash_if_armed(FaultPoint::Subordinate) {
            return Ok(());
        }

        let services = ctx.services();
        match read_spectrum_file(
            services.fs.as_ref(),
            &self.file.path,
            services.config.missing_value(),
        ) {
            Ok(spectrum) => {
                info!(
                    file = %self.file.path.display(),
                    records = spectrum.records.len(),
                    lines = spectrum.lines,
                    "read spectrum file"
                );
                self.spectrum = spectrum;
            }
            Err(err) => {
                warn!(
                    file = %self.file.path.display(),
                    error = %format!("{err:#}"),
                    "unreadable spectrum file; reporting no records"
                );
            }
        }

        ctx.commit(Target::Local)
    }
}
