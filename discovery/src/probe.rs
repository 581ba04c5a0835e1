//! Running `<binary> [path...] --help` as a child process.

use std::collections::BTreeMap;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;
use wait_timeout::ChildExt;

use crate::error::{DiscoverError, Result};

/// Default timeout for one help probe.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment applied to every probe before the caller's overrides.
pub fn default_probe_env() -> BTreeMap<String, String> {
    [
        // Keep help plain and non-interactive.
        ("NO_COLOR", "1"),
        ("TERM", "dumb"),
        ("PAGER", "cat"),
        ("MANPAGER", "cat"),
        ("DISPLAY", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Runs `argv` with stdin closed and returns the longer of its stdout and
/// stderr. A non-zero exit status is not an error; many tools print help
/// to stderr and exit 1.
///
/// # Errors
///
/// Returns [`Spawn`](DiscoverError::Spawn) if the process cannot start,
/// [`Timeout`](DiscoverError::Timeout) if it outlives `timeout`, and
/// [`EmptyOutput`](DiscoverError::EmptyOutput) if both streams are empty.
pub fn probe_help(
    argv: &[String],
    env: &BTreeMap<String, String>,
    timeout: Duration,
) -> Result<String> {
    let command_line = argv.join(" ");
    let Some((program, args)) = argv.split_first() else {
        return Err(DiscoverError::EmptyOutput { command: command_line });
    };

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (key, value) in default_probe_env().iter().chain(env) {
        command.env(key, value);
    }

    let mut child = command.spawn().map_err(|source| {
        debug!(command = %command_line, error = %source, "Failed to spawn help command");
        DiscoverError::Spawn {
            command: command_line.clone(),
            source,
        }
    })?;

    // Drain both pipes so a chatty child never blocks on a full buffer.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            debug!(
                command = %command_line,
                timeout_ms = timeout.as_millis() as u64,
                "Help command timed out, killing process"
            );
            let _ = child.kill();
            let _ = child.wait();
            return Err(DiscoverError::Timeout {
                command: command_line,
                timeout,
            });
        }
        Err(err) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(err.into());
        }
    };

    let stdout = collect(stdout)?;
    let stderr = collect(stderr)?;
    debug!(
        command = %command_line,
        exit_code = ?status.code(),
        stdout_len = stdout.len(),
        stderr_len = stderr.len(),
        "Probed help"
    );

    let text = if stdout.len() >= stderr.len() {
        stdout
    } else {
        stderr
    };
    if text.trim().is_empty() {
        return Err(DiscoverError::EmptyOutput { command: command_line });
    }
    Ok(text)
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let buf = handle
        .join()
        .map_err(|_| std::io::Error::other("pipe reader panicked"))??;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
