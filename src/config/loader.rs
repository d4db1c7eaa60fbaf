// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::model::{JobFile, RawJobFile};
use crate::errors::Result;

/// Load a job file from a given path and return the raw `RawJobFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawJobFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let job: RawJobFile = toml::from_str(&contents)?;

    Ok(job)
}

/// Load a job file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks event counts, grid sizes, folding, heartbeat interval,
///   process-specific keys against the selected family, and the filter
///   section.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<JobFile> {
    let raw = load_from_path(&path)?;
    let job = JobFile::try_from(raw)?;
    Ok(job)
}

/// Load the job file named on the command line.
///
/// An explicit path must exist. Without one, `powheg.toml` in the current
/// directory is used if present; otherwise every value comes from defaults.
pub fn load_job(explicit: Option<&Path>) -> Result<JobFile> {
    match explicit {
        Some(path) => load_and_validate(path),
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_and_validate(&path)
            } else {
                warn!(path = %path.display(), "no job file found; using defaults");
                Ok(JobFile::default())
            }
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("powheg.toml")
}
