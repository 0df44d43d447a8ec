// Process Supervisor - owns the single managed process slot

use crate::application::constants::{DEFAULT_STOP_GRACE_PERIOD, FORCED_REAP_TIMEOUT};
use crate::domain::{KernelLogSender, LaunchSpec, SpawnError};
use crate::port::{ProcessHandle, ProcessLauncher};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What a start/restart ended up running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A real OS process was spawned
    Real { pid: u32 },
    /// No launch spec was available; nothing is running
    Simulated,
}

/// Starts, stops and restarts the managed process
///
/// Invariant: at most one live handle. Every launch tears down the previous
/// process before spawning.
pub struct ProcessSupervisor {
    launcher: Arc<dyn ProcessLauncher>,
    logs: KernelLogSender,
    grace_period: Duration,
    handle: Option<Box<dyn ProcessHandle>>,
    last_spec: Option<LaunchSpec>,
}

impl ProcessSupervisor {
    pub fn new(launcher: Arc<dyn ProcessLauncher>, logs: KernelLogSender) -> Self {
        Self {
            launcher,
            logs,
            grace_period: DEFAULT_STOP_GRACE_PERIOD,
            handle: None,
            last_spec: None,
        }
    }

    pub fn set_grace_period(&mut self, grace_period: Duration) {
        self.grace_period = grace_period;
    }

    pub fn has_process(&self) -> bool {
        self.handle.is_some()
    }

    pub fn last_launch_spec(&self) -> Option<&LaunchSpec> {
        self.last_spec.as_ref()
    }

    /// Stop any managed process, then spawn `spec`
    ///
    /// On success `spec` becomes the last launch spec.
    ///
    /// # Errors
    /// - SpawnError::Os if the OS refuses to create the process; the slot is left empty
    pub async fn start(&mut self, spec: LaunchSpec) -> Result<u32, SpawnError> {
        self.stop().await;

        let handle = match self.launcher.spawn(&spec, self.logs.clone()).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(binary = %spec.binary_path(), error = %e, "Managed process failed to spawn");
                return Err(e);
            }
        };

        let pid = handle.pid();
        info!(
            pid = pid,
            binary = %spec.binary_path(),
            args = spec.arguments().len(),
            "Managed process started"
        );

        self.handle = Some(handle);
        self.last_spec = Some(spec);
        Ok(pid)
    }

    /// Start `spec` if given, otherwise stop and report simulated mode
    pub async fn launch(&mut self, spec: Option<LaunchSpec>) -> Result<LaunchOutcome, SpawnError> {
        match spec {
            Some(spec) => self.start(spec).await.map(|pid| LaunchOutcome::Real { pid }),
            None => {
                self.stop().await;
                debug!("No launch spec available, running in simulator mode");
                Ok(LaunchOutcome::Simulated)
            }
        }
    }

    /// Launch with `spec`, falling back to the last launch spec
    pub async fn restart(&mut self, spec: Option<LaunchSpec>) -> Result<LaunchOutcome, SpawnError> {
        let spec = spec.or_else(|| self.last_spec.clone());
        self.launch(spec).await
    }

    /// Terminate the managed process, if any
    ///
    /// Sends the termination request, waits up to the grace period, then
    /// force-kills. Never fails and never blocks past the grace period plus
    /// the reap timeout.
    pub async fn stop(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };
        let pid = handle.pid();

        if let Err(e) = handle.terminate() {
            warn!(pid = pid, error = %e, "Termination request failed");
        }

        match handle.wait_timeout(self.grace_period).await {
            Ok(true) => {
                info!(pid = pid, "Managed process exited");
                return;
            }
            Ok(false) => {
                warn!(
                    pid = pid,
                    grace_ms = self.grace_period.as_millis() as u64,
                    "Managed process ignored termination, killing"
                );
            }
            Err(e) => {
                warn!(pid = pid, error = %e, "Waiting for managed process failed, killing");
            }
        }

        match tokio::time::timeout(FORCED_REAP_TIMEOUT, handle.kill()).await {
            Ok(Ok(())) => info!(pid = pid, "Managed process killed"),
            Ok(Err(e)) => error!(pid = pid, error = %e, "Failed to kill managed process"),
            Err(_) => error!(pid = pid, "Timed out reaping killed process"),
        }
    }

    /// Host shutdown: release the managed process
    pub async fn shutdown(&mut self) {
        self.stop().await;
    }
}

impl Drop for ProcessSupervisor {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            warn!(pid = handle.pid(), "Supervisor dropped with live process, killing");
            handle.start_kill();
        }
    }
}
