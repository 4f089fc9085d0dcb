// src/engine/placement.rs

use crate::errors::{Result, SpectreeError};
use crate::types::Target;

/// What a spawn may ask for in the current execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    remote_available: bool,
}

impl Placement {
    pub fn new(remote_available: bool) -> Self {
        Self { remote_available }
    }

    pub fn local_only() -> Self {
        Self::new(false)
    }

    /// Validate a spawn request.
    pub fn check(&self, target: Target, carries_parent: bool) -> Result<()> {
        match target {
            Target::Local if carries_parent => Err(SpectreeError::PlacementError(
                "a child carrying its parent must be placed remotely".to_string(),
            )),
            Target::Remote if !self.remote_available => Err(SpectreeError::PlacementError(
                "remote placement requested but no remote context is available".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
