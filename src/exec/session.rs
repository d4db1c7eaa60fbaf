// src/exec/session.rs

//! One invocation of the generator, from stale-file cleanup to the final
//! rename.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::io::BufReader;
use tokio::process::Child;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::errors::Result;
use crate::exec::filter::FilterOptions;
use crate::exec::heartbeat::{format_elapsed, Heartbeat};
use crate::exec::output::{clear_stale_output, finalize_output, EVENTS_FILE, RUN_CARD_FILE};
use crate::exec::process::{next_line_lossy, spawn_child, spawn_stderr_drain};
use crate::exec::registry::WorkdirGuard;
use crate::exec::{emit, EventSink, SessionEvent, SessionReport, SessionState};
use crate::fs::FileSystem;
use crate::runcard::{write_run_card, RunConfiguration};

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub workdir: PathBuf,
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub heartbeat_interval: Duration,
    /// Keep existing event files (reweighting pass).
    pub reweight: bool,
    /// Event count used for the throughput figure.
    pub expected_events: i64,
}

impl SessionOptions {
    pub fn new(workdir: impl Into<PathBuf>, executable: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            executable: executable.into(),
            args: Vec::new(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            reweight: false,
            expected_events: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub enum GenerationMode {
    /// Wait for the generator to finish on its own.
    Direct,
    /// Stream events through a FIFO into a filter; stop when it exits.
    Filtered(FilterOptions),
}

/// Supervises one generator run in a working directory.
#[derive(Debug)]
pub struct GenerationSession {
    pub(super) options: SessionOptions,
    pub(super) mode: GenerationMode,
    pub(super) fs: Arc<dyn FileSystem>,
    pub(super) state: SessionState,
    pub(super) events: Option<EventSink>,
    run_card: Option<RunConfiguration>,
}

impl GenerationSession {
    pub fn new(options: SessionOptions, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            options,
            mode: GenerationMode::Direct,
            fs,
            state: SessionState::Idle,
            events: None,
            run_card: None,
        }
    }

    pub fn filtered(mut self, filter: FilterOptions) -> Self {
        self.mode = GenerationMode::Filtered(filter);
        self
    }

    /// Write `powheg.input` for `config` once the working directory is
    /// claimed, before anything is launched.
    pub fn with_run_card(mut self, config: RunConfiguration) -> Self {
        self.run_card = Some(config);
        self
    }

    /// Mirror session milestones into `sink`.
    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Run the session to completion.
    ///
    /// Fails with `SessionBusy` if another session in this process already
    /// uses the working directory, and with `MissingOutput` if the generator
    /// left no events behind. Nothing in the working directory is touched
    /// before the directory is claimed.
    pub async fn run(&mut self) -> Result<SessionReport> {
        let _guard = WorkdirGuard::acquire(&self.options.workdir)?;

        if let Some(config) = &self.run_card {
            let path = self.options.workdir.join(RUN_CARD_FILE);
            write_run_card(self.fs.as_ref(), &path, config)?;
        }

        info!(
            workdir = %self.options.workdir.display(),
            executable = %self.options.executable.display(),
            heartbeat_secs = self.options.heartbeat_interval.as_secs(),
            "starting generation session"
        );

        match self.mode.clone() {
            GenerationMode::Direct => self.run_direct().await,
            GenerationMode::Filtered(filter) => self.run_filtered(filter).await,
        }
    }

    async fn run_direct(&mut self) -> Result<SessionReport> {
        self.state.advance(SessionState::Launching)?;
        clear_stale_output(self.fs.as_ref(), &self.options.workdir, self.options.reweight);

        let started = Instant::now();
        let heartbeat = Heartbeat::spawn(
            self.options.heartbeat_interval,
            started,
            self.events.clone(),
        );

        let mut child = match spawn_child(
            &self.options.executable,
            &self.options.args,
            &self.options.workdir,
        ) {
            Ok(child) => child,
            Err(e) => {
                heartbeat.stop().await?;
                return Err(e.into());
            }
        };

        self.state.advance(SessionState::Running)?;
        emit(&self.events, SessionEvent::Started { pid: child.id() });

        if let Some(stderr) = child.stderr.take() {
            spawn_stderr_drain("pwhg_main", stderr);
        }

        let streamed = self.stream_stdout(&mut child).await;

        // stdout EOF: the generator is done writing. The heartbeat is joined
        // before anything else is logged.
        self.state.advance(SessionState::Finalizing)?;
        let heartbeats = heartbeat.stop().await?;
        let output_lines = streamed?;

        let status = child
            .wait()
            .await
            .context("waiting for generator to exit")?;
        if !status.success() {
            warn!(status = %status, "generator exited unsuccessfully");
        }

        let (elapsed, events_per_second) = self.log_finished(started);
        let output = finalize_output(self.fs.as_ref(), &self.options.workdir, EVENTS_FILE)?;
        self.state.advance(SessionState::Done)?;

        Ok(SessionReport {
            elapsed,
            events_per_second,
            output,
            exit_code: status.code(),
            generator_terminated: false,
            heartbeats,
            output_lines,
        })
    }

    /// Forward generator stdout to the log line by line until EOF.
    async fn stream_stdout(&self, child: &mut Child) -> Result<u64> {
        let stdout = child
            .stdout
            .take()
            .context("generator stdout was not captured")?;

        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        let mut count = 0u64;
        while let Some(line) = next_line_lossy(&mut reader, &mut buf)
            .await
            .context("reading generator output")?
        {
            count += 1;
            info!(target: "powhegctl::child", process = "pwhg_main", "{}", line);
            emit(&self.events, SessionEvent::Output { line });
        }
        Ok(count)
    }

    pub(super) fn log_finished(&self, started: Instant) -> (Duration, f64) {
        let elapsed = started.elapsed();
        let events_per_second = throughput(self.options.expected_events, elapsed);

        info!(
            elapsed_secs = elapsed.as_secs_f64(),
            events = self.options.expected_events,
            events_per_second,
            "Finished: {} events in {} ({:.2} events/s)",
            self.options.expected_events,
            format_elapsed(elapsed),
            events_per_second
        );
        emit(
            &self.events,
            SessionEvent::Finished {
                elapsed,
                events_per_second,
            },
        );
        (elapsed, events_per_second)
    }
}

/// Events per wall-clock second; zero for an unmeasurably short run.
pub fn throughput(events: i64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        events as f64 / secs
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn throughput_per_second() {
        assert_eq!(throughput(5000, Duration::from_secs(100)), 50.0);
        assert_eq!(throughput(5000, Duration::ZERO), 0.0);
    }

    #[tokio::test]
    async fn spawn_failure_surfaces_and_stops_in_launching() {
        let dir = tempfile::tempdir().unwrap();
        let options = SessionOptions::new(dir.path(), dir.path().join("no-such-pwhg_main"));
        let mut session = GenerationSession::new(options, Arc::new(MockFileSystem::new()));

        assert!(session.run().await.is_err());
        assert_eq!(session.state(), SessionState::Launching);
    }
}
