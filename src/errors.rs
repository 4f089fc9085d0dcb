// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::fault::FaultPoint;

#[derive(Error, Debug)]
pub enum SpectreeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A spawn or commit asked for a placement the execution context cannot
    /// satisfy. Raised before any side effect takes place.
    #[error("Placement error: {0}")]
    PlacementError(String),

    /// The task tree contract was violated (commit with unresolved children,
    /// double commit, unknown task id, ...).
    #[error("Hierarchy violation: {0}")]
    HierarchyError(String),

    #[error("Task '{parent}' cannot react to a '{child}' child")]
    UnexpectedChild {
        parent: &'static str,
        child: &'static str,
    },

    #[error("Simulated {point} failure on host '{host}'")]
    SimulatedCrash { point: FaultPoint, host: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Wire codec error: {0}")]
    CodecError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SpectreeError>;
