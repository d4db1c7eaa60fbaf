// src/exec/heartbeat.rs

//! Periodic "still running" log line while the generator works.

use std::time::Duration;

use anyhow::Context;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::{emit, EventSink, SessionEvent};

/// Handle to the background heartbeat task.
///
/// The task is a plain Tokio task, so it never keeps the runtime alive on
/// its own. [`Heartbeat::stop`] cancels it and waits for it to finish; after
/// `stop` returns no further heartbeat is logged or emitted.
#[derive(Debug)]
pub struct Heartbeat {
    cancel: Option<oneshot::Sender<()>>,
    handle: JoinHandle<u64>,
}

impl Heartbeat {
    /// Start beating every `interval`, measuring elapsed time from `started`.
    /// The first beat fires one full interval after spawning.
    pub fn spawn(interval: Duration, started: Instant, events: Option<EventSink>) -> Self {
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut beats = 0u64;

            loop {
                tokio::select! {
                    biased;

                    _ = &mut cancel_rx => break,

                    _ = ticker.tick() => {
                        beats += 1;
                        let elapsed = started.elapsed();
                        info!(
                            elapsed_secs = elapsed.as_secs(),
                            "generator still running ({} elapsed)",
                            format_elapsed(elapsed)
                        );
                        emit(&events, SessionEvent::Heartbeat { elapsed });
                    }
                }
            }

            debug!(beats, "heartbeat stopped");
            beats
        });

        Self {
            cancel: Some(cancel_tx),
            handle,
        }
    }

    /// Cancel and join. Returns the number of beats emitted.
    pub async fn stop(mut self) -> Result<u64> {
        if let Some(cancel) = self.cancel.take() {
            // The task only exits on cancellation, so a closed receiver means
            // it already panicked; the join below reports that.
            let _ = cancel.send(());
        }
        let beats = self.handle.await.context("joining heartbeat task")?;
        Ok(beats)
    }
}

/// `HH:MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
