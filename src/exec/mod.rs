// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs `pwhg_main` (and, in filtered mode, an LHEF filter)
//! using `tokio::process::Command`, and moves the result into place.
//!
//! - [`session`] owns the session state machine and the direct mode.
//! - [`filter`] implements the FIFO-based filtered mode.
//! - [`heartbeat`] is the periodic "still running" task.
//! - [`process`] spawns children and drains their streams.
//! - [`output`] knows the fixed file names, clears stale output and performs
//!   the final rename.
//! - [`registry`] keeps two sessions out of the same working directory.
//! - [`state`] is the linear session lifecycle.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;

pub mod filter;
pub mod heartbeat;
pub mod output;
pub mod process;
pub mod registry;
pub mod session;
pub mod state;

pub use filter::FilterOptions;
pub use heartbeat::Heartbeat;
pub use output::{
    clear_stale_output, finalize_output, EVENTS_FILE, FINAL_OUTPUT_FILE, GRIDS_FILE,
    RUN_CARD_FILE, UBOUND_FILE,
};
pub use session::{GenerationMode, GenerationSession, SessionOptions};
pub use state::SessionState;

/// Observable milestones of a session, mirrored from the log.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Generator spawned.
    Started { pid: Option<u32> },
    /// One line of generator stdout.
    Output { line: String },
    Heartbeat { elapsed: Duration },
    /// Filtered mode: the generator was killed after the filter finished.
    GeneratorTerminated,
    Finished {
        elapsed: Duration,
        events_per_second: f64,
    },
}

pub type EventSink = mpsc::UnboundedSender<SessionEvent>;

pub(crate) fn emit(sink: &Option<EventSink>, event: SessionEvent) {
    if let Some(tx) = sink {
        // Nobody listening is fine.
        let _ = tx.send(event);
    }
}

/// Summary of a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub elapsed: Duration,
    pub events_per_second: f64,
    /// Final location of the events (`PowhegOTF._1.events`).
    pub output: PathBuf,
    /// Exit code of the generator, if it exited on its own.
    pub exit_code: Option<i32>,
    pub generator_terminated: bool,
    pub heartbeats: u64,
    /// Stdout lines seen from the generator.
    pub output_lines: u64,
}
