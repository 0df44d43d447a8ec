// Process launcher implementation
// reason: tokio::process for async spawn/wait, nix for SIGTERM on Unix
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info};

use jumper_core::domain::{
    KernelLogLevel, KernelLogLine, KernelLogSender, LaunchSpec, SpawnError,
};
use jumper_core::port::{ProcessHandle, ProcessLauncher, TimeProvider};

/// Launches the managed process with tokio
///
/// stdin is closed; stdout lines are forwarded as `info`, stderr lines as
/// `error`. Children are killed if their handle is dropped.
pub struct TokioProcessLauncher {
    time_provider: Arc<dyn TimeProvider>,
}

impl TokioProcessLauncher {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn spawn(
        &self,
        spec: &LaunchSpec,
        logs: KernelLogSender,
    ) -> Result<Box<dyn ProcessHandle>, SpawnError> {
        let mut command = Command::new(spec.binary_path());
        command
            .args(spec.arguments())
            .envs(spec.environment())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = spec.working_directory() {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| SpawnError::os(spec.binary_path(), e))?;

        let pid = child.id().ok_or_else(|| {
            SpawnError::os(spec.binary_path(), "process exited before its pid was read")
        })?;

        info!(
            pid = %pid,
            command = %spec.binary_path(),
            args = ?spec.arguments(),
            working_dir = ?spec.working_directory(),
            "Spawned managed process"
        );

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(
                stdout,
                KernelLogLevel::Info,
                pid,
                logs.clone(),
                self.time_provider.clone(),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(
                stderr,
                KernelLogLevel::Error,
                pid,
                logs,
                self.time_provider.clone(),
            ));
        }

        Ok(Box::new(TokioProcessHandle { child, pid }))
    }
}

/// Drain one output stream into the kernel log channel until EOF
async fn forward_lines<R>(
    reader: R,
    level: KernelLogLevel,
    pid: u32,
    logs: KernelLogSender,
    time_provider: Arc<dyn TimeProvider>,
) where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let message = line.trim_end();
                if message.is_empty() {
                    continue;
                }
                debug!(target: "jumper::kernel", pid = %pid, level = ?level, "{}", message);
                // No subscribers is fine; the line is still in the debug log
                let _ = logs.send(KernelLogLine {
                    level,
                    message: message.to_string(),
                    timestamp_ms: time_provider.now_millis(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(pid = %pid, error = %e, "Stopped reading managed process output");
                break;
            }
        }
    }
}

struct TokioProcessHandle {
    child: Child,
    pid: u32,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn terminate(&mut self) -> io::Result<()> {
        // Already exited and reaped: nothing to signal
        if self.child.try_wait()?.is_some() {
            return Ok(());
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let raw = i32::try_from(self.pid)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            debug!(pid = %self.pid, "Sending SIGTERM");
            kill(Pid::from_raw(raw), Signal::SIGTERM).map_err(io::Error::from)
        }

        #[cfg(not(unix))]
        {
            // TerminateProcess
            debug!(pid = %self.pid, "Terminating process");
            self.child.start_kill()
        }
    }

    async fn wait_timeout(&mut self, limit: Duration) -> io::Result<bool> {
        match timeout(limit, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!(pid = %self.pid, status = %status, "Managed process reaped");
                Ok(true)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(false),
        }
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }

    fn start_kill(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!(pid = %self.pid, error = %e, "start_kill failed");
        }
    }
}
