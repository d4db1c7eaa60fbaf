// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

use crate::exec::SessionState;

#[derive(Error, Debug)]
pub enum PowhegError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("Invalid session transition: {from:?} -> {to:?}")]
    InvalidTransition { from: SessionState, to: SessionState },

    #[error("A generation session is already active in {0:?}")]
    SessionBusy(PathBuf),

    /// The generator finished but its event file could not be moved into
    /// place. Usually the external process crashed or wrote nothing.
    #[error("Generator output {path:?} could not be renamed: {source}")]
    MissingOutput {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// In filtered mode the generator died while the filter was still
    /// reading; whatever the filter wrote is incomplete.
    #[error("Generator exited with {status} before the filter finished")]
    GeneratorFailed { status: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PowhegError>;
