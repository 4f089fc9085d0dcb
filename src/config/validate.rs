// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, SpectreeError};
use crate::types::Target;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::SpectreeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_output(cfg)?;
    validate_parser(cfg)?;
    validate_placement(cfg)?;
    Ok(())
}

fn validate_output(cfg: &RawConfigFile) -> Result<()> {
    let names = [
        ("suffix", &cfg.output.suffix),
        ("spectra_count_log", &cfg.output.spectra_count_log),
        ("spectra_sum_log", &cfg.output.spectra_sum_log),
        ("time_log", &cfg.output.time_log),
    ];
    for (key, value) in names {
        if value.trim().is_empty() {
            return Err(SpectreeError::ConfigError(format!(
                "[output].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_parser(cfg: &RawConfigFile) -> Result<()> {
    if !cfg.parser.missing_value.is_finite() {
        return Err(SpectreeError::ConfigError(format!(
            "[parser].missing_value must be finite (got {})",
            cfg.parser.missing_value
        )));
    }

    let tolerance = cfg.parser.missing_tolerance;
    if !tolerance.is_finite() || tolerance <= 0.0 {
        return Err(SpectreeError::ConfigError(format!(
            "[parser].missing_tolerance must be a finite number > 0 (got {tolerance})"
        )));
    }

    Ok(())
}

fn validate_placement(cfg: &RawConfigFile) -> Result<()> {
    let placement = &cfg.placement;
    let uses_remote = placement.directory == Target::Remote || placement.group == Target::Remote;

    if uses_remote && cfg.runtime.remote_workers == 0 {
        return Err(SpectreeError::ConfigError(
            "[runtime].remote_workers is 0 but [placement] asks for remote tasks".to_string(),
        ));
    }

    if placement.group_carries_parent && placement.group != Target::Remote {
        return Err(SpectreeError::ConfigError(
            "[placement].group_carries_parent requires group = \"remote\"".to_string(),
        ));
    }

    Ok(())
}
