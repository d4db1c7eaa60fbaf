// src/exec/output.rs

//! Fixed file names shared with `pwhg_main`, stale output cleanup and the
//! final rename into place.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use tracing::{debug, info, warn};

use crate::errors::{PowhegError, Result};
use crate::fs::FileSystem;

/// Run-card read by `pwhg_main` from its working directory.
pub const RUN_CARD_FILE: &str = "powheg.input";
/// Event file written by `pwhg_main` (a FIFO in filtered mode).
pub const EVENTS_FILE: &str = "pwgevents.lhe";
/// Integration grid cache reused when `use-old-grid` is set.
pub const GRIDS_FILE: &str = "pwggrids.dat";
/// Upper-bound cache reused when `use-old-ubound` is set.
pub const UBOUND_FILE: &str = "pwgubound.dat";
/// Name downstream tooling expects the final events under.
pub const FINAL_OUTPUT_FILE: &str = "PowhegOTF._1.events";
/// Leftovers from earlier runs that must not be mistaken for new output.
pub const STALE_EVENTS_GLOB: &str = "pwgevents*.lhe";

fn stale_matcher() -> Result<GlobMatcher> {
    let glob = Glob::new(STALE_EVENTS_GLOB)
        .map_err(|e| PowhegError::Other(anyhow::anyhow!("invalid stale-output glob: {e}")))?;
    Ok(glob.compile_matcher())
}

/// Remove event files left in `workdir` by an earlier run.
///
/// Failures are logged and otherwise ignored: if a stale file really gets in
/// the way, the generator fails loudly on its own. In reweight mode nothing
/// is removed since the existing events are the input.
///
/// Returns the files that were removed.
pub fn clear_stale_output(fs: &dyn FileSystem, workdir: &Path, reweight: bool) -> Vec<PathBuf> {
    if reweight {
        warn!(
            workdir = %workdir.display(),
            "reweighting mode: keeping existing {} files",
            STALE_EVENTS_GLOB
        );
        return Vec::new();
    }

    let matcher = match stale_matcher() {
        Ok(m) => m,
        Err(e) => {
            debug!(error = %e, "skipping stale output cleanup");
            return Vec::new();
        }
    };

    let entries = match fs.read_dir(workdir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(error = %e, "could not list working directory; skipping cleanup");
            return Vec::new();
        }
    };

    let mut removed = Vec::new();
    for path in entries {
        let matches = path
            .file_name()
            .is_some_and(|name| matcher.is_match(Path::new(name)));
        if !matches {
            continue;
        }
        match fs.remove_file(&path) {
            Ok(()) => {
                info!(path = %path.display(), "removed stale event file");
                removed.push(path);
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "could not remove stale event file; continuing");
            }
        }
    }
    removed
}

/// Move `produced` (relative to `workdir`) to [`FINAL_OUTPUT_FILE`].
///
/// A missing file means the generator produced nothing; that is fatal.
pub fn finalize_output(fs: &dyn FileSystem, workdir: &Path, produced: &str) -> Result<PathBuf> {
    let from = workdir.join(produced);
    let to = workdir.join(FINAL_OUTPUT_FILE);

    fs.rename(&from, &to)
        .map_err(|source| PowhegError::MissingOutput {
            path: from.clone(),
            source,
        })?;

    info!(from = %from.display(), to = %to.display(), "moved generator output into place");
    Ok(to)
}
