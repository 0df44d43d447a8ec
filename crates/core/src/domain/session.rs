// Session State Domain Model

use serde::{Deserialize, Serialize};

/// Network mode reported until a caller supplies one
pub const DEFAULT_NETWORK_MODE: &str = "tunnel";

/// Whether the session is backed by a real OS process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Simulator,
    Real,
}

impl std::fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeMode::Simulator => write!(f, "simulator"),
            RuntimeMode::Real => write!(f, "real"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoreStatus {
    Running,
    Stopped,
}

impl std::fmt::Display for CoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreStatus::Running => write!(f, "running"),
            CoreStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Caller-visible session state
///
/// The process handle and the last launch spec live in the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    is_running: bool,
    pid: u64,
    runtime_mode: RuntimeMode,
    network_mode: String,
    profile_id: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_running: false,
            pid: 0,
            runtime_mode: RuntimeMode::Simulator,
            network_mode: DEFAULT_NETWORK_MODE.to_string(),
            profile_id: None,
        }
    }
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn pid(&self) -> u64 {
        self.pid
    }

    pub fn runtime_mode(&self) -> RuntimeMode {
        self.runtime_mode
    }

    pub fn network_mode(&self) -> &str {
        &self.network_mode
    }

    pub fn profile_id(&self) -> Option<&str> {
        self.profile_id.as_deref()
    }

    /// A real process was spawned with `pid`
    pub fn mark_real(&mut self, pid: u32) {
        self.is_running = true;
        self.runtime_mode = RuntimeMode::Real;
        self.pid = u64::from(pid);
    }

    /// Logically running without a child process
    pub fn mark_simulated(&mut self, synthetic_pid: u64) {
        self.is_running = true;
        self.runtime_mode = RuntimeMode::Simulator;
        self.pid = synthetic_pid;
    }

    /// Spawn failed: fall back to a safe, stopped simulator state
    pub fn mark_spawn_failed(&mut self) {
        self.is_running = false;
        self.runtime_mode = RuntimeMode::Simulator;
        self.pid = 0;
    }

    /// Explicit stop keeps the last runtime mode for reporting
    pub fn mark_stopped(&mut self) {
        self.is_running = false;
        self.pid = 0;
    }

    /// Refresh the synthetic pid of a simulated session
    pub fn refresh_synthetic_pid(&mut self, synthetic_pid: u64) {
        if self.is_running && self.runtime_mode == RuntimeMode::Simulator {
            self.pid = synthetic_pid;
        }
    }

    /// Replace (never merge) the profile id
    pub fn replace_profile(&mut self, profile_id: Option<String>) {
        self.profile_id = profile_id;
    }

    /// Empty modes are ignored
    pub fn apply_network_mode(&mut self, network_mode: Option<&str>) {
        if let Some(mode) = network_mode.filter(|m| !m.is_empty()) {
            self.network_mode = mode.to_string();
        }
    }

    pub fn report(&self) -> CoreStateReport {
        CoreStateReport {
            status: if self.is_running {
                CoreStatus::Running
            } else {
                CoreStatus::Stopped
            },
            runtime_mode: self.runtime_mode,
            network_mode: self.network_mode.clone(),
            pid: (self.pid > 0).then_some(self.pid),
            profile_id: self.profile_id.clone(),
        }
    }
}

/// `getCoreState` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreStateReport {
    pub status: CoreStatus,
    pub runtime_mode: RuntimeMode,
    pub network_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
}
