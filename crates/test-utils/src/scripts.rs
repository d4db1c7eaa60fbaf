#![allow(dead_code)]

//! Small `sh` scripts standing in for `pwhg_main` and LHEF filters.
//!
//! Scripts are run as `/bin/sh <script> ...` rather than executed directly,
//! which sidesteps `ETXTBSY` when a test writes and runs a file while other
//! test threads fork.

use std::fs;
use std::path::{Path, PathBuf};

use powhegctl::exec::{FilterOptions, SessionOptions};

/// Program plus arguments for a script.
#[derive(Debug, Clone)]
pub struct ScriptCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ScriptCommand {
    pub fn with_args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    /// Session options running this script in `workdir`.
    pub fn session_options(&self, workdir: &Path) -> SessionOptions {
        let mut opts = SessionOptions::new(workdir, &self.program);
        opts.args = self.args.clone();
        opts
    }

    pub fn filter_options(&self, output: &str) -> FilterOptions {
        FilterOptions {
            executable: self.program.clone(),
            args: self.args.clone(),
            output: output.to_string(),
        }
    }
}

/// Write `body` to `dir/name` and return the command that runs it.
pub fn sh_script(dir: &Path, name: &str, body: &str) -> ScriptCommand {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("failed to write script");
    ScriptCommand {
        program: PathBuf::from("/bin/sh"),
        args: vec![path.to_string_lossy().into_owned()],
    }
}

/// A generator that prints `lines` log lines, optionally sleeps, then writes
/// `events` events to `pwgevents.lhe`.
pub fn fake_generator(dir: &Path, lines: usize, sleep_secs: Option<f64>, events: usize) -> ScriptCommand {
    let mut body = String::new();
    for i in 1..=lines {
        body.push_str(&format!("echo \"pwhg_main: step {i}\"\n"));
    }
    if let Some(secs) = sleep_secs {
        body.push_str(&format!("sleep {secs}\n"));
    }
    body.push_str(": > pwgevents.lhe\n");
    for i in 1..=events {
        body.push_str(&format!("echo \"<event> {i} </event>\" >> pwgevents.lhe\n"));
    }
    sh_script(dir, "fake_pwhg_main.sh", &body)
}

/// A generator that logs, then exits with `code` without writing events.
pub fn silent_generator(dir: &Path, code: i32) -> ScriptCommand {
    sh_script(
        dir,
        "silent_pwhg_main.sh",
        &format!("echo \"pwhg_main: nothing to do\"\nexit {code}"),
    )
}

/// A generator that writes events into the `pwgevents.lhe` FIFO forever.
///
/// SIGPIPE is ignored so it keeps running after the reader goes away and
/// has to be killed by the supervisor.
pub fn endless_fifo_generator(dir: &Path) -> ScriptCommand {
    sh_script(
        dir,
        "fifo_pwhg_main.sh",
        r#"trap '' PIPE
echo "pwhg_main: streaming events"
exec 3> pwgevents.lhe
i=0
while true; do
  i=$((i+1))
  echo "<event> $i </event>" >&3 2>/dev/null || sleep 0.05
done"#,
    )
}

/// A generator that writes `events` events into the FIFO and exits.
pub fn finite_fifo_generator(dir: &Path, events: usize) -> ScriptCommand {
    sh_script(
        dir,
        "finite_fifo_pwhg_main.sh",
        &format!(
            r#"i=0
while [ $i -lt {events} ]; do
  i=$((i+1))
  echo "<event> $i </event>"
done > pwgevents.lhe
echo "pwhg_main: done""#
        ),
    )
}

/// A filter keeping the first `$1` lines of `pwgevents.lhe` in `$2`.
pub fn head_filter(dir: &Path) -> ScriptCommand {
    sh_script(dir, "head_filter.sh", r#"head -n "$1" pwgevents.lhe > "$2""#)
}

/// A filter that reads everything from the FIFO into `$1`.
pub fn copy_filter(dir: &Path) -> ScriptCommand {
    sh_script(dir, "copy_filter.sh", r#"cat pwgevents.lhe > "$1""#)
}
