// src/exec/filter.rs

//! Filtered mode: `pwhg_main` writes events into a FIFO that an LHEF filter
//! reads. The session ends when the filter exits; a generator still running
//! at that point is killed. A generator that exits first releases the filter
//! from the FIFO, and a non-zero exit fails the session.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use anyhow::Context;
use tokio::process::Child;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::errors::{PowhegError, Result};
use crate::exec::heartbeat::Heartbeat;
use crate::exec::output::{clear_stale_output, finalize_output, EVENTS_FILE};
use crate::exec::process::{make_fifo, spawn_child, spawn_stderr_drain, spawn_stdout_logger};
use crate::exec::session::GenerationSession;
use crate::exec::{emit, SessionEvent, SessionReport, SessionState};

/// Default name of the file the filter writes.
pub const DEFAULT_FILTER_OUTPUT: &str = "pwgevents_filtered.lhe";

/// How long the filter may keep running once the generator is gone.
pub const FILTER_GRACE: Duration = Duration::from_secs(30);

enum FirstExit {
    Filter(io::Result<ExitStatus>),
    Generator(io::Result<ExitStatus>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOptions {
    pub executable: PathBuf,
    /// Passed verbatim; the filter is expected to read `pwgevents.lhe`.
    pub args: Vec<String>,
    /// Relative to the working directory.
    pub output: String,
}

impl FilterOptions {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            output: DEFAULT_FILTER_OUTPUT.to_string(),
        }
    }
}

impl GenerationSession {
    pub(super) async fn run_filtered(&mut self, filter: FilterOptions) -> Result<SessionReport> {
        self.state.advance(SessionState::Launching)?;

        let workdir = self.options.workdir.clone();
        clear_stale_output(self.fs.as_ref(), &workdir, false);

        let filter_output = workdir.join(&filter.output);
        if self.fs.exists(&filter_output) {
            if let Err(e) = self.fs.remove_file(&filter_output) {
                debug!(path = %filter_output.display(), error = %e, "could not remove stale filter output");
            }
        }

        let fifo = workdir.join(EVENTS_FILE);
        make_fifo(&fifo).await?;

        let started = Instant::now();
        let heartbeat = Heartbeat::spawn(
            self.options.heartbeat_interval,
            started,
            self.events.clone(),
        );

        let mut generator =
            match spawn_child(&self.options.executable, &self.options.args, &workdir) {
                Ok(child) => child,
                Err(e) => {
                    heartbeat.stop().await?;
                    self.remove_fifo(&fifo);
                    return Err(e.into());
                }
            };
        emit(&self.events, SessionEvent::Started { pid: generator.id() });

        let generator_stdout = generator
            .stdout
            .take()
            .map(|s| spawn_stdout_logger("pwhg_main", s, self.events.clone()));
        if let Some(stderr) = generator.stderr.take() {
            spawn_stderr_drain("pwhg_main", stderr);
        }

        let mut filter_child = match spawn_child(&filter.executable, &filter.args, &workdir) {
            Ok(child) => child,
            Err(e) => {
                // Blocked opening the FIFO with no reader; kill it.
                if let Err(kill_err) = generator.kill().await {
                    warn!(error = %kill_err, "failed to kill generator");
                }
                heartbeat.stop().await?;
                self.remove_fifo(&fifo);
                return Err(e.into());
            }
        };
        self.state.advance(SessionState::Running)?;

        let filter_stdout = filter_child
            .stdout
            .take()
            .map(|s| spawn_stdout_logger("filter", s, None));
        if let Some(stderr) = filter_child.stderr.take() {
            spawn_stderr_drain("filter", stderr);
        }

        let first = tokio::select! {
            status = filter_child.wait() => FirstExit::Filter(status),
            status = generator.wait() => FirstExit::Generator(status),
        };

        let (filter_status, generator_status) = match first {
            FirstExit::Filter(status) => (status.context("waiting for filter to exit"), None),
            FirstExit::Generator(status) => {
                // A filter still blocked opening the FIFO never sees EOF
                // unless a writer comes and goes.
                release_fifo_reader(&fifo);
                let filter_status = wait_for_filter(&mut filter_child).await;
                (filter_status, Some(status.context("waiting for generator to exit")))
            }
        };

        self.state.advance(SessionState::Finalizing)?;
        let generator_terminated = if generator_status.is_some() {
            false
        } else {
            terminate_generator(&mut generator).await
        };
        if generator_terminated {
            emit(&self.events, SessionEvent::GeneratorTerminated);
        }

        let mut output_lines = 0;
        if let Some(handle) = generator_stdout {
            output_lines = handle.await.unwrap_or_default();
        }
        if let Some(handle) = filter_stdout {
            let _ = handle.await;
        }
        let heartbeats = heartbeat.stop().await?;
        self.remove_fifo(&fifo);

        let filter_status = filter_status?;
        if !filter_status.success() {
            warn!(status = %filter_status, "filter exited unsuccessfully");
        }

        let exit_code = match generator_status {
            Some(status) => {
                let status = status?;
                if !status.success() {
                    warn!(status = %status, "generator exited before the filter finished");
                    return Err(PowhegError::GeneratorFailed {
                        status: status.to_string(),
                    });
                }
                status.code()
            }
            None if generator_terminated => None,
            None => generator
                .wait()
                .await
                .context("collecting generator exit status")?
                .code(),
        };

        let (elapsed, events_per_second) = self.log_finished(started);
        let output = finalize_output(self.fs.as_ref(), &workdir, &filter.output)?;
        self.state.advance(SessionState::Done)?;

        Ok(SessionReport {
            elapsed,
            events_per_second,
            output,
            exit_code,
            generator_terminated,
            heartbeats,
            output_lines,
        })
    }

    fn remove_fifo(&self, fifo: &Path) {
        if let Err(e) = self.fs.remove_file(fifo) {
            debug!(path = %fifo.display(), error = %e, "could not remove FIFO");
        }
    }
}

/// Open and close the write end of the FIFO once. A reader blocked in
/// `open` is woken and then reads EOF. Opening read-write never blocks.
fn release_fifo_reader(fifo: &Path) {
    match OpenOptions::new().read(true).write(true).open(fifo) {
        Ok(handle) => drop(handle),
        Err(e) => debug!(path = %fifo.display(), error = %e, "could not open FIFO to release the filter"),
    }
}

/// Wait up to [`FILTER_GRACE`] for the filter, then kill it.
async fn wait_for_filter(filter: &mut Child) -> anyhow::Result<ExitStatus> {
    match timeout(FILTER_GRACE, filter.wait()).await {
        Ok(status) => status.context("waiting for filter to exit"),
        Err(_) => {
            warn!(
                grace_secs = FILTER_GRACE.as_secs(),
                "filter still running after the generator exited; killing it"
            );
            filter.kill().await.context("killing filter")?;
            filter.wait().await.context("waiting for killed filter")
        }
    }
}

/// Kill the generator if it outlived the filter. Returns whether it was killed.
async fn terminate_generator(generator: &mut Child) -> bool {
    match generator.try_wait() {
        Ok(Some(status)) => {
            debug!(status = %status, "generator had already exited");
            false
        }
        Ok(None) => match generator.kill().await {
            Ok(()) => {
                info!("filter finished; generator terminated");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to kill generator");
                false
            }
        },
        Err(e) => {
            warn!(error = %e, "could not query generator status");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_name() {
        let opts = FilterOptions::new("/opt/filters/lhef_filter");
        assert_eq!(opts.output, "pwgevents_filtered.lhe");
        assert!(opts.args.is_empty());
    }
}
