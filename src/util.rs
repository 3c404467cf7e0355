//! Shared helpers: streaming hashes, timestamps, bounded subprocess runs.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Chunk size for streaming reads; large enough to amortize I/O while keeping
/// memory use independent of file size.
pub const HASH_CHUNK_BYTES: usize = 1024 * 1024;

/// Streaming SHA-256 of a file's contents, read in fixed-size chunks.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut chunk = vec![0u8; HASH_CHUNK_BYTES];
    loop {
        let read = file.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// UTC ISO-8601 rendering of a unix timestamp (seconds + nanoseconds).
pub fn iso8601(secs: i64, nanos: u32) -> String {
    match DateTime::<Utc>::from_timestamp(secs, nanos) {
        Some(stamp) => stamp.to_rfc3339_opts(SecondsFormat::Micros, true),
        None => format!("@{secs}"),
    }
}

/// Current wall-clock time in UTC ISO-8601.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Captured output of a bounded subprocess run.
pub struct RunOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

impl RunOutput {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Run a subprocess with a wall-clock bound, killing it on deadline.
///
/// Pipes are drained off-thread so a chatty child cannot deadlock against a
/// full pipe buffer while we wait.
pub fn run_bounded(command: &mut Command, timeout: Duration) -> Result<RunOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn().context("spawn subprocess")?;
    let stdout = child.stdout.take().map(drain_pipe);
    let stderr = child.stderr.take().map(drain_pipe);

    let deadline = Instant::now() + timeout;
    let (status, timed_out) = wait_with_deadline(&mut child, deadline)?;

    Ok(RunOutput {
        status,
        stdout: join_pipe(stdout),
        stderr: join_pipe(stderr),
        timed_out,
    })
}

fn wait_with_deadline(child: &mut Child, deadline: Instant) -> Result<(ExitStatus, bool)> {
    loop {
        if let Some(status) = child.try_wait().context("wait for subprocess")? {
            return Ok((status, false));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let status = child.wait().context("reap subprocess")?;
            return Ok((status, true));
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

fn drain_pipe<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        bytes
    })
}

fn join_pipe(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}
