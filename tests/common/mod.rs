#![allow(dead_code)]

use std::sync::Arc;

use powhegctl::exec::{SessionEvent, SessionOptions};
use powhegctl::fs::{FileSystem, RealFileSystem};
use tokio::sync::mpsc;

pub use powhegctl_test_utils::{init_tracing, with_timeout};

pub fn real_fs() -> Arc<dyn FileSystem> {
    Arc::new(RealFileSystem)
}

/// Drain everything a finished session sent.
pub fn collect_events(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    events
}

pub fn with_interval(mut opts: SessionOptions, interval: std::time::Duration) -> SessionOptions {
    opts.heartbeat_interval = interval;
    opts
}
