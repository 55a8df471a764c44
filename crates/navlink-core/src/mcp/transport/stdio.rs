//! Standard I/O transport for MCP
//!
//! Spawns a subprocess and communicates via stdin/stdout. Stderr is drained
//! opportunistically during reads into a bounded tail so a chatty provider
//! can never stall on a full pipe, and so timeouts can quote what it said.

use super::{McpTransport, ProcessCommand, ReadOutcome};
use crate::mcp::error::McpError;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::time::{Instant, sleep_until, timeout};
use tracing::{debug, warn};

/// Size of a single pipe read
const READ_CHUNK: usize = 4096;

/// Bytes of stderr retained for diagnostics
const STDERR_TAIL_BYTES: usize = 4096;

/// Characters of stderr quoted in error messages
const STDERR_HINT_CHARS: usize = 400;

/// Stdio transport for MCP communication
pub struct StdioTransport {
    /// Child process
    child: Option<Child>,
    /// Stdin writer
    stdin: Option<ChildStdin>,
    /// Stdout reader
    stdout: Option<ChildStdout>,
    /// Stderr reader, dropped once it reaches EOF
    stderr: Option<ChildStderr>,
    /// Most recent stderr bytes
    stderr_tail: Vec<u8>,
    /// Program name for logs
    program: String,
    /// Wait between SIGTERM and kill
    shutdown_grace: Duration,
    /// Whether connected
    connected: bool,
}

impl StdioTransport {
    /// Spawn a new MCP server process with all three streams piped
    pub fn spawn(command: &ProcessCommand) -> Result<Self, McpError> {
        let mut cmd = Command::new(&command.program);

        cmd.args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            McpError::connection(format!(
                "Failed to spawn MCP server '{}': {}",
                command.program, e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::connection("Failed to get stdin handle"))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::connection("Failed to get stdout handle"))?;

        let stderr = child.stderr.take();

        debug!(command = %command.display(), pid = ?child.id(), "spawned MCP server");

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            stdout: Some(stdout),
            stderr,
            stderr_tail: Vec::new(),
            program: command.program.clone(),
            shutdown_grace: command.shutdown_grace,
            connected: true,
        })
    }

    /// Process id of the child, while it is running
    pub fn pid(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    fn remember_stderr(tail: &mut Vec<u8>, bytes: &[u8]) {
        tail.extend_from_slice(bytes);
        if tail.len() > STDERR_TAIL_BYTES {
            let excess = tail.len() - STDERR_TAIL_BYTES;
            tail.drain(..excess);
        }
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn write_all(&mut self, bytes: &[u8]) -> Result<(), McpError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| McpError::connection("stdin already closed"))?;

        stdin.write_all(bytes).await?;
        stdin.flush().await?;

        Ok(())
    }

    async fn read_available(&mut self, wait: Duration) -> Result<ReadOutcome, McpError> {
        let Self {
            stdout,
            stderr,
            stderr_tail,
            connected,
            ..
        } = self;

        let stdout = stdout
            .as_mut()
            .ok_or_else(|| McpError::connection("stdout already closed"))?;

        let deadline = Instant::now() + wait;
        let mut out_buf = [0u8; READ_CHUNK];
        let mut err_buf = [0u8; READ_CHUNK];

        loop {
            let stderr_read = async {
                match stderr.as_mut() {
                    Some(pipe) => pipe.read(&mut err_buf).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;

                read = stdout.read(&mut out_buf) => {
                    return match read? {
                        0 => {
                            *connected = false;
                            Ok(ReadOutcome::Closed)
                        }
                        n => Ok(ReadOutcome::Data(out_buf[..n].to_vec())),
                    };
                }
                read = stderr_read => match read {
                    Ok(0) | Err(_) => *stderr = None,
                    Ok(n) => Self::remember_stderr(stderr_tail, &err_buf[..n]),
                },
                _ = sleep_until(deadline) => return Ok(ReadOutcome::Idle),
            }
        }
    }

    async fn error_hint(&mut self) -> Option<String> {
        if let Some(pipe) = self.stderr.as_mut() {
            let mut buf = [0u8; READ_CHUNK];
            // A zero timeout still polls the read once.
            match timeout(Duration::ZERO, pipe.read(&mut buf)).await {
                Ok(Ok(0)) | Ok(Err(_)) => self.stderr = None,
                Ok(Ok(n)) => Self::remember_stderr(&mut self.stderr_tail, &buf[..n]),
                Err(_) => {}
            }
        }

        let text = String::from_utf8_lossy(&self.stderr_tail);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let skip = text.chars().count().saturating_sub(STDERR_HINT_CHARS);
        Some(text.chars().skip(skip).collect())
    }

    async fn close(&mut self) {
        self.connected = false;

        // Close stdin to signal EOF
        self.stdin.take();

        let Some(mut child) = self.child.take() else {
            return;
        };

        if let Ok(Some(status)) = child.try_wait() {
            debug!(program = %self.program, %status, "MCP server already exited");
            return;
        }

        request_termination(&mut child, &self.program);

        match timeout(self.shutdown_grace, child.wait()).await {
            Ok(Ok(status)) => debug!(program = %self.program, %status, "MCP server exited"),
            Ok(Err(e)) => warn!(program = %self.program, error = %e, "waiting for MCP server failed"),
            Err(_) => {
                warn!(
                    program = %self.program,
                    grace = ?self.shutdown_grace,
                    "MCP server ignored termination, killing"
                );
                if let Err(e) = child.kill().await {
                    warn!(program = %self.program, error = %e, "failed to kill MCP server");
                }
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(unix)]
fn request_termination(child: &mut Child, program: &str) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return;
    };
    if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
        warn!(program, pid, error = %e, "failed to SIGTERM MCP server");
    }
}

#[cfg(not(unix))]
fn request_termination(child: &mut Child, program: &str) {
    if let Err(e) = child.start_kill() {
        warn!(program, error = %e, "failed to stop MCP server");
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        // Best effort cleanup
        if let Some(mut child) = self.child.take() {
            // Start kill but don't wait
            let _ = child.start_kill();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sh(script: &str) -> ProcessCommand {
        ProcessCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env: HashMap::new(),
            shutdown_grace: Duration::from_millis(500),
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_is_connection_error() {
        let cmd = ProcessCommand::parse("/nonexistent/navlink-peer --stdio", HashMap::new()).unwrap();
        let err = StdioTransport::spawn(&cmd).err().unwrap();
        assert!(matches!(err, McpError::Connection { .. }));
        assert!(err.to_string().contains("/nonexistent/navlink-peer"));
    }

    #[tokio::test]
    async fn test_echo_round_trip_and_env() {
        let mut cmd = sh("printf '%s\\n' \"$NAVLINK_GREETING\"; cat");
        cmd.env.insert("NAVLINK_GREETING".to_string(), "hello".to_string());
        let mut transport = StdioTransport::spawn(&cmd).unwrap();

        let mut seen = Vec::new();
        transport.write_all(b"ping\n").await.unwrap();
        while !String::from_utf8_lossy(&seen).contains("ping") {
            match transport.read_available(Duration::from_secs(5)).await.unwrap() {
                ReadOutcome::Data(bytes) => seen.extend(bytes),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(String::from_utf8_lossy(&seen), "hello\nping\n");

        transport.close().await;
        assert!(!transport.is_connected());
        assert!(transport.pid().is_none());
    }

    #[tokio::test]
    async fn test_idle_then_closed() {
        let mut transport = StdioTransport::spawn(&sh("read line; exit 0")).unwrap();

        let idle = transport.read_available(Duration::from_millis(50)).await.unwrap();
        assert_eq!(idle, ReadOutcome::Idle);

        transport.write_all(b"bye\n").await.unwrap();
        let closed = transport.read_available(Duration::from_secs(5)).await.unwrap();
        assert_eq!(closed, ReadOutcome::Closed);
        transport.close().await;
    }

    #[tokio::test]
    async fn test_stderr_collected_as_hint() {
        let mut transport = StdioTransport::spawn(&sh("echo 'missing API key' >&2; sleep 5")).unwrap();

        let outcome = transport.read_available(Duration::from_millis(300)).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Idle);
        assert_eq!(transport.error_hint().await.as_deref(), Some("missing API key"));

        let started = std::time::Instant::now();
        transport.close().await;
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_close_kills_process_ignoring_sigterm() {
        let mut transport =
            StdioTransport::spawn(&sh("trap '' TERM; echo ready; while true; do sleep 1; done"))
                .unwrap();
        assert!(transport.pid().is_some());

        // SIGTERM must not arrive before the trap is installed
        let mut seen = Vec::new();
        while !String::from_utf8_lossy(&seen).contains("ready") {
            match transport.read_available(Duration::from_secs(5)).await.unwrap() {
                ReadOutcome::Data(bytes) => seen.extend(bytes),
                other => panic!("unexpected {:?}", other),
            }
        }

        let started = std::time::Instant::now();
        transport.close().await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(400), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(5), "{elapsed:?}");
    }
}
