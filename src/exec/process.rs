// src/exec/process.rs

//! Spawning child processes and draining their output streams.

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::exec::{emit, EventSink, SessionEvent};

/// Spawn `program` in `workdir` with stdout/stderr piped.
///
/// The child is killed if its handle is dropped, so an early return from the
/// supervisor never leaves an orphaned generator behind.
pub fn spawn_child(program: &Path, args: &[String], workdir: &Path) -> Result<Child> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd
        .spawn()
        .with_context(|| format!("spawning {:?} in {:?}", program, workdir))?;

    info!(
        program = %program.display(),
        pid = child.id(),
        "child process started"
    );
    Ok(child)
}

/// Read one line, replacing invalid UTF-8 rather than failing on it.
///
/// The trailing `\n` (and `\r`) is stripped. Returns `None` at EOF.
pub async fn next_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Log every stdout line of a child at INFO from a background task.
pub fn spawn_stdout_logger<R>(
    name: &'static str,
    stream: R,
    events: Option<EventSink>,
) -> JoinHandle<u64>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        let mut count = 0u64;
        loop {
            match next_line_lossy(&mut reader, &mut buf).await {
                Ok(Some(line)) => {
                    count += 1;
                    info!(target: "powhegctl::child", process = name, "{}", line);
                    emit(&events, SessionEvent::Output { line });
                }
                Ok(None) => break,
                Err(e) => {
                    debug!(process = name, error = %e, "stdout read failed");
                    break;
                }
            }
        }
        debug!(process = name, lines = count, "stdout closed");
        count
    })
}

/// Always consume stderr so buffers don't fill; log at debug.
pub fn spawn_stderr_drain<R>(name: &'static str, stream: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        while let Ok(Some(line)) = next_line_lossy(&mut reader, &mut buf).await {
            debug!(target: "powhegctl::child", process = name, "stderr: {}", line);
        }
    })
}

/// Create a named pipe at `path` with the system `mkfifo`.
pub async fn make_fifo(path: &Path) -> Result<()> {
    let status = Command::new("mkfifo")
        .arg(path)
        .status()
        .await
        .with_context(|| format!("running mkfifo for {:?}", path))?;

    if !status.success() {
        bail!("mkfifo {:?} exited with {}", path, status);
    }
    debug!(path = %path.display(), "created FIFO");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lossy_lines_survive_invalid_utf8() {
        let input: &[u8] = b"caf\xe9\r\nplain\nno newline";
        let mut reader = BufReader::new(input);
        let mut buf = Vec::new();

        let mut lines = Vec::new();
        while let Some(line) = next_line_lossy(&mut reader, &mut buf).await.unwrap() {
            lines.push(line);
        }
        assert_eq!(lines, vec!["caf\u{FFFD}", "plain", "no newline"]);
    }
}
