// Process Launcher Port
// Platform shim for spawning and signalling the managed process

use crate::domain::{KernelLogSender, LaunchSpec, SpawnError};
use async_trait::async_trait;
use std::time::Duration;

/// Spawns managed processes
///
/// Implementations:
/// - TokioProcessLauncher (infra-system): tokio::process + nix signals
/// - MockProcessLauncher: in-memory, for supervisor tests
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn `spec` as a new OS process
    ///
    /// stdout/stderr lines of the child are forwarded to `logs`.
    ///
    /// # Errors
    /// - SpawnError::Os if the OS refuses to create the process
    async fn spawn(
        &self,
        spec: &LaunchSpec,
        logs: KernelLogSender,
    ) -> Result<Box<dyn ProcessHandle>, SpawnError>;
}

/// Exclusive handle to one spawned process
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// OS-assigned process identifier
    fn pid(&self) -> u32;

    /// Request graceful termination (SIGTERM / TerminateProcess)
    fn terminate(&mut self) -> std::io::Result<()>;

    /// Wait up to `timeout` for the process to exit
    ///
    /// Returns `Ok(true)` once the process has exited and been reaped.
    async fn wait_timeout(&mut self, timeout: Duration) -> std::io::Result<bool>;

    /// Force-kill and reap. Must not block indefinitely.
    async fn kill(&mut self) -> std::io::Result<()>;

    /// Best-effort synchronous kill for teardown paths that cannot await
    fn start_kill(&mut self);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// How mock processes react to `terminate`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ExitBehavior {
        /// Exits as soon as it is asked to
        Graceful,
        /// Ignores the termination request; only `kill` reclaims it
        IgnoresTerminate,
    }

    #[derive(Debug, Default)]
    struct Stats {
        spawned: usize,
        live: usize,
        max_live: usize,
        terminated: usize,
        killed: usize,
    }

    /// Mock launcher that tracks how many handles are alive at once
    pub struct MockProcessLauncher {
        next_pid: Mutex<u32>,
        fail_with: Mutex<Option<String>>,
        behavior: Mutex<ExitBehavior>,
        specs: Mutex<Vec<LaunchSpec>>,
        stats: Arc<Mutex<Stats>>,
    }

    impl MockProcessLauncher {
        pub fn new() -> Self {
            Self {
                next_pid: Mutex::new(1000),
                fail_with: Mutex::new(None),
                behavior: Mutex::new(ExitBehavior::Graceful),
                specs: Mutex::new(Vec::new()),
                stats: Arc::new(Mutex::new(Stats::default())),
            }
        }

        /// Make every following spawn fail with `reason`
        pub fn fail_spawns(&self, reason: impl Into<String>) {
            *self.fail_with.lock().unwrap() = Some(reason.into());
        }

        pub fn set_exit_behavior(&self, behavior: ExitBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn spawn_count(&self) -> usize {
            self.stats.lock().unwrap().spawned
        }

        pub fn live_count(&self) -> usize {
            self.stats.lock().unwrap().live
        }

        pub fn max_live(&self) -> usize {
            self.stats.lock().unwrap().max_live
        }

        pub fn terminate_count(&self) -> usize {
            self.stats.lock().unwrap().terminated
        }

        pub fn kill_count(&self) -> usize {
            self.stats.lock().unwrap().killed
        }

        pub fn spawned_specs(&self) -> Vec<LaunchSpec> {
            self.specs.lock().unwrap().clone()
        }

        /// PID the next successful spawn will receive
        pub fn peek_next_pid(&self) -> u32 {
            *self.next_pid.lock().unwrap()
        }
    }

    impl Default for MockProcessLauncher {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ProcessLauncher for MockProcessLauncher {
        async fn spawn(
            &self,
            spec: &LaunchSpec,
            _logs: KernelLogSender,
        ) -> Result<Box<dyn ProcessHandle>, SpawnError> {
            if let Some(reason) = self.fail_with.lock().unwrap().clone() {
                return Err(SpawnError::os(spec.binary_path(), reason));
            }

            let pid = {
                let mut next = self.next_pid.lock().unwrap();
                let pid = *next;
                *next += 1;
                pid
            };

            {
                let mut stats = self.stats.lock().unwrap();
                stats.spawned += 1;
                stats.live += 1;
                stats.max_live = stats.max_live.max(stats.live);
            }
            self.specs.lock().unwrap().push(spec.clone());

            Ok(Box::new(MockProcessHandle {
                pid,
                behavior: *self.behavior.lock().unwrap(),
                terminate_requested: false,
                released: false,
                stats: self.stats.clone(),
            }))
        }
    }

    struct MockProcessHandle {
        pid: u32,
        behavior: ExitBehavior,
        terminate_requested: bool,
        released: bool,
        stats: Arc<Mutex<Stats>>,
    }

    impl MockProcessHandle {
        fn release(&mut self) {
            if !self.released {
                self.released = true;
                self.stats.lock().unwrap().live -= 1;
            }
        }
    }

    #[async_trait]
    impl ProcessHandle for MockProcessHandle {
        fn pid(&self) -> u32 {
            self.pid
        }

        fn terminate(&mut self) -> std::io::Result<()> {
            self.stats.lock().unwrap().terminated += 1;
            self.terminate_requested = true;
            Ok(())
        }

        async fn wait_timeout(&mut self, _timeout: Duration) -> std::io::Result<bool> {
            if self.terminate_requested && self.behavior == ExitBehavior::Graceful {
                self.release();
                return Ok(true);
            }
            Ok(false)
        }

        async fn kill(&mut self) -> std::io::Result<()> {
            self.stats.lock().unwrap().killed += 1;
            self.release();
            Ok(())
        }

        fn start_kill(&mut self) {
            self.stats.lock().unwrap().killed += 1;
            self.release();
        }
    }
}
