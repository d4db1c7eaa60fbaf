// src/config/validate.rs

use crate::config::model::{JobFile, ProcessOverrides, RawJobFile};
use crate::errors::{PowhegError, Result};
use crate::types::{parse_duration, ProcessKind};

impl TryFrom<RawJobFile> for JobFile {
    type Error = crate::errors::PowhegError;

    fn try_from(raw: RawJobFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_job(&raw)?;
        Ok(JobFile::new_unchecked(raw))
    }
}

fn validate_raw_job(job: &RawJobFile) -> Result<()> {
    validate_generation(job)?;
    validate_runcard(job)?;
    validate_process_overrides(job.generation.process, &job.process)?;
    validate_filter(job)?;
    Ok(())
}

fn validate_generation(job: &RawJobFile) -> Result<()> {
    let interval = parse_duration(&job.generation.heartbeat_interval).map_err(|e| {
        PowhegError::ConfigError(format!("[generation].heartbeat_interval: {e}"))
    })?;
    if interval.is_zero() {
        return Err(PowhegError::ConfigError(
            "[generation].heartbeat_interval must be > 0".to_string(),
        ));
    }
    Ok(())
}

fn validate_runcard(job: &RawJobFile) -> Result<()> {
    let rc = &job.runcard;

    if let Some(n) = rc.numevts {
        if n <= 0 {
            return Err(PowhegError::ConfigError(format!(
                "[runcard].numevts must be >= 1 (got {n})"
            )));
        }
    }

    for (key, value) in [
        ("ncall1", rc.ncall1),
        ("itmx1", rc.itmx1),
        ("ncall2", rc.ncall2),
        ("itmx2", rc.itmx2),
        ("foldcsi", rc.foldcsi),
        ("foldy", rc.foldy),
        ("foldphi", rc.foldphi),
    ] {
        if let Some(v) = value {
            if v < 1 {
                return Err(PowhegError::ConfigError(format!(
                    "[runcard].{key} must be >= 1 (got {v})"
                )));
            }
        }
    }

    for (key, value) in [("ebeam1", rc.ebeam1), ("ebeam2", rc.ebeam2)] {
        if let Some(v) = value {
            if v.is_nan() || v <= 0.0 {
                return Err(PowhegError::ConfigError(format!(
                    "[runcard].{key} must be positive (got {v})"
                )));
            }
        }
    }

    Ok(())
}

/// Reject `[process]` keys the given process family does not understand.
///
/// Exposed so a process chosen on the command line can be re-checked
/// against the job file's overrides.
pub fn validate_process_overrides(kind: ProcessKind, overrides: &ProcessOverrides) -> Result<()> {
    let allowed: &[&str] = match kind {
        ProcessKind::Bb => &["qmass"],
        ProcessKind::Tt => &["qmass", "topdecaymode"],
        ProcessKind::Dijet => &[],
        ProcessKind::Ggh | ProcessKind::Vbfh => &["hmass", "hwidth", "hdecaymode"],
        ProcessKind::W => &["idvecbos", "vdecaymode"],
        ProcessKind::Z => &["vdecaymode"],
        ProcessKind::Ww | ProcessKind::Wz | ProcessKind::Zz => &[
            "vdecaymode1",
            "vdecaymode2",
            "delg1_z",
            "delg1_g",
            "lambda_z",
            "lambda_g",
            "delk_g",
            "delk_z",
            "tevscale",
        ],
    };

    for key in overrides.set_keys() {
        if !allowed.contains(&key) {
            return Err(PowhegError::ConfigError(format!(
                "[process].{key} is not applicable to process '{kind}'"
            )));
        }
    }

    if let Some(id) = overrides.idvecbos {
        if id.abs() != 24 {
            return Err(PowhegError::ConfigError(format!(
                "[process].idvecbos must be 24 or -24 (got {id})"
            )));
        }
    }

    Ok(())
}

fn validate_filter(job: &RawJobFile) -> Result<()> {
    let Some(filter) = &job.filter else {
        return Ok(());
    };

    if filter.executable.trim().is_empty() {
        return Err(PowhegError::ConfigError(
            "[filter].executable must not be empty".to_string(),
        ));
    }
    if filter.output.trim().is_empty() {
        return Err(PowhegError::ConfigError(
            "[filter].output must not be empty".to_string(),
        ));
    }
    if job.generation.reweight {
        return Err(PowhegError::ConfigError(
            "[filter] cannot be combined with [generation].reweight".to_string(),
        ));
    }
    Ok(())
}
