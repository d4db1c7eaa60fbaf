// src/exec/registry.rs

//! In-process guard against two sessions sharing a working directory.
//!
//! `pwhg_main` writes fixed file names into its working directory, so two
//! concurrent sessions there would clobber each other. Sessions in other
//! processes are not detected.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};

use tracing::debug;

use crate::errors::{PowhegError, Result};

fn active() -> MutexGuard<'static, HashSet<PathBuf>> {
    static ACTIVE: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();
    ACTIVE
        .get_or_init(|| Mutex::new(HashSet::new()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

/// Held for the lifetime of a session; releases the directory on drop.
#[derive(Debug)]
pub struct WorkdirGuard {
    key: PathBuf,
}

impl WorkdirGuard {
    pub fn acquire(workdir: &Path) -> Result<Self> {
        let key = std::fs::canonicalize(workdir).unwrap_or_else(|_| workdir.to_path_buf());
        let mut set = active();
        if !set.insert(key.clone()) {
            return Err(PowhegError::SessionBusy(key));
        }
        debug!(workdir = %key.display(), "working directory claimed");
        Ok(Self { key })
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        active().remove(&self.key);
        debug!(workdir = %self.key.display(), "working directory released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused_until_release() {
        let dir = tempfile::tempdir().unwrap();

        let first = WorkdirGuard::acquire(dir.path()).unwrap();
        assert!(matches!(
            WorkdirGuard::acquire(dir.path()),
            Err(PowhegError::SessionBusy(_))
        ));

        drop(first);
        assert!(WorkdirGuard::acquire(dir.path()).is_ok());
    }

    #[test]
    fn distinct_directories_do_not_conflict() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let _ga = WorkdirGuard::acquire(a.path()).unwrap();
        let _gb = WorkdirGuard::acquire(b.path()).unwrap();
    }
}
