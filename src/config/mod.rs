// src/config/mod.rs

//! Configuration loading and validation for spectree.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into a `ConfigFile` (`validate.rs`).
//!
//! Fault-injection settings are not part of the file; they come from the
//! environment (see [`crate::fault`]).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_or_default};
pub use model::{
    ConfigFile, OutputSection, ParserSection, PlacementSection, RawConfigFile, RuntimeSection,
};
