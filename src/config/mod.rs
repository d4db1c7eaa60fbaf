// src/config/mod.rs

//! Job configuration for powhegctl.
//!
//! Responsibilities:
//! - Define the TOML-backed job file model (`model.rs`).
//! - Load a job file from disk (`loader.rs`).
//! - Validate it against the selected process family (`validate.rs`).
//! - Capture the environment the generator runs in (`env.rs`).

pub mod env;
pub mod loader;
pub mod model;
pub mod validate;

pub use env::PowhegEnvironment;
pub use loader::{load_and_validate, load_from_path, load_job};
pub use model::{
    FilterSection, GenerationSection, GroupOverrides, JobFile, ProcessOverrides, RawJobFile,
    RunCardOverrides,
};
pub use validate::validate_process_overrides;
