// Core Service - session state, supervisor and provisioner behind one command surface

use crate::application::args::{parse_args, parse_runtime_request, RestartCoreArgs, StartCoreArgs};
use crate::application::command::CommandName;
use crate::application::events::EventHub;
use crate::application::provisioner::RuntimeProvisioner;
use crate::application::supervisor::{LaunchOutcome, ProcessSupervisor};
use crate::domain::{
    CapabilityCommand, CoreEvent, CoreStateReport, InspectReport, InstallReport, PlatformCapabilities, RuntimeMode,
    RuntimeRequest, SessionState, SpawnError, SystemProxyStatus, TrayStatus, DEFAULT_NETWORK_MODE,
};
use crate::error::{AppError, CommandError, ErrorCode, Result};
use crate::port::{PlatformProbe, ProcessLauncher, RuntimeStorage, TimeProvider};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

struct Inner {
    session: SessionState,
    supervisor: ProcessSupervisor,
}

/// Owned host core, built once at startup and shared with the RPC layer
///
/// Mutating commands are serialized by one async mutex over the session and
/// the supervisor.
pub struct CoreService {
    inner: Mutex<Inner>,
    provisioner: RuntimeProvisioner,
    platform_probe: Arc<dyn PlatformProbe>,
    time_provider: Arc<dyn TimeProvider>,
    events: EventHub,
}

impl CoreService {
    pub fn new(
        launcher: Arc<dyn ProcessLauncher>,
        storage: Arc<dyn RuntimeStorage>,
        platform_probe: Arc<dyn PlatformProbe>,
        time_provider: Arc<dyn TimeProvider>,
        events: EventHub,
    ) -> Self {
        let supervisor = ProcessSupervisor::new(launcher, events.log_sender());
        Self {
            inner: Mutex::new(Inner {
                session: SessionState::default(),
                supervisor,
            }),
            provisioner: RuntimeProvisioner::new(storage),
            platform_probe,
            time_provider,
            events,
        }
    }

    /// Override how long a stopping process may take before it is killed
    pub fn with_stop_grace_period(mut self, grace_period: Duration) -> Self {
        self.inner.get_mut().supervisor.set_grace_period(grace_period);
        self
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn platform_version(&self) -> String {
        self.platform_probe.platform_version()
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        PlatformCapabilities::host()
    }

    pub async fn core_state(&self) -> CoreStateReport {
        self.inner.lock().await.session.report()
    }

    /// `startCore`
    ///
    /// The profile id is replaced on every call. Without a usable launch spec
    /// the session runs in simulator mode.
    ///
    /// # Errors
    /// - AppError::Spawn if the process could not be created; the session is
    ///   left stopped in simulator mode
    #[instrument(skip(self, args), fields(profile_id = ?args.profile_id))]
    pub async fn start_core(&self, args: StartCoreArgs) -> Result<()> {
        let spec = args.launch_spec();
        let mut guard = self.inner.lock().await;
        let Inner {
            session,
            supervisor,
        } = &mut *guard;

        session.replace_profile(args.profile_id);
        session.apply_network_mode(args.network_mode.as_deref());

        let outcome = supervisor.launch(spec).await;
        self.apply_outcome(session, outcome, "core started", "core start failed")
    }

    /// `restartCore`
    ///
    /// The profile id is only replaced when supplied. Falls back to the last
    /// launch spec, then to simulator mode.
    #[instrument(skip(self, args), fields(profile_id = ?args.profile_id))]
    pub async fn restart_core(&self, args: RestartCoreArgs) -> Result<()> {
        let spec = args.launch_spec();
        let mut guard = self.inner.lock().await;
        let Inner {
            session,
            supervisor,
        } = &mut *guard;

        if args.profile_id.is_some() {
            session.replace_profile(args.profile_id);
        }
        session.apply_network_mode(args.network_mode.as_deref());

        let outcome = supervisor.restart(spec).await;
        self.apply_outcome(session, outcome, "core restarted", "core restart failed")
    }

    /// `stopCore`; stopping an idle core is a no-op
    #[instrument(skip(self))]
    pub async fn stop_core(&self) {
        let mut guard = self.inner.lock().await;
        let was_running = guard.session.is_running();

        guard.supervisor.stop().await;
        guard.session.mark_stopped();

        if was_running {
            info!("Core stopped");
            self.publish(&guard.session, "core stopped");
        }
    }

    /// `resetTunnel`
    ///
    /// A stopped core is left alone. A simulated core gets a fresh synthetic
    /// pid. A real core is switched back to tunnel mode and relaunched with
    /// its last launch spec.
    #[instrument(skip(self))]
    pub async fn reset_tunnel(&self) -> Result<()> {
        let mut guard = self.inner.lock().await;
        let Inner {
            session,
            supervisor,
        } = &mut *guard;

        if !session.is_running() {
            return Ok(());
        }

        match session.runtime_mode() {
            RuntimeMode::Simulator => {
                session.refresh_synthetic_pid(self.synthetic_pid());
                self.publish(session, "tunnel reset");
                Ok(())
            }
            RuntimeMode::Real => {
                session.apply_network_mode(Some(DEFAULT_NETWORK_MODE));
                let outcome = supervisor.restart(None).await;
                self.apply_outcome(session, outcome, "tunnel reset", "tunnel reset failed")
            }
        }
    }

    /// `setupRuntime`
    pub async fn setup_runtime(&self, request: &RuntimeRequest) -> Result<InstallReport> {
        Ok(self.provisioner.install(request).await?)
    }

    /// `inspectRuntime`
    pub async fn inspect_runtime(&self, request: &RuntimeRequest) -> Result<InspectReport> {
        Ok(self.provisioner.inspect(request).await?)
    }

    /// Route a named command with a loosely typed argument map
    ///
    /// # Errors
    /// - CommandError with UNKNOWN_COMMAND for names outside the command set
    /// - CommandError with the command's own failure code otherwise
    pub async fn dispatch(
        &self,
        method: &str,
        arguments: Value,
    ) -> std::result::Result<Value, CommandError> {
        let command: CommandName = method
            .parse()
            .map_err(|e| CommandError::from_app(ErrorCode::UnknownCommand, e))?;

        self.execute(command, arguments).await.map_err(|e| {
            let err = CommandError::from_app(command.failure_code(), e);
            warn!(command = %command, code = %err.code, detail = ?err.detail, "Command failed");
            err
        })
    }

    async fn execute(&self, command: CommandName, arguments: Value) -> Result<Value> {
        match command {
            CommandName::GetPlatformVersion => Ok(Value::String(self.platform_version())),
            CommandName::StartCore => {
                self.start_core(parse_args(arguments)?).await?;
                Ok(Value::Null)
            }
            CommandName::StopCore => {
                self.stop_core().await;
                Ok(Value::Null)
            }
            CommandName::RestartCore => {
                self.restart_core(parse_args(arguments)?).await?;
                Ok(Value::Null)
            }
            CommandName::ResetTunnel => {
                self.reset_tunnel().await?;
                Ok(Value::Null)
            }
            CommandName::GetCoreState => Ok(serde_json::to_value(self.core_state().await)?),
            CommandName::SetupRuntime => {
                let request = parse_runtime_request(arguments)?;
                Ok(serde_json::to_value(self.setup_runtime(&request).await?)?)
            }
            CommandName::InspectRuntime => {
                let request = parse_runtime_request(arguments)?;
                Ok(serde_json::to_value(self.inspect_runtime(&request).await?)?)
            }
            CommandName::GetPlatformCapabilities => Ok(serde_json::to_value(self.capabilities())?),
            CommandName::GetSystemProxyStatus => {
                Ok(serde_json::to_value(SystemProxyStatus::disabled())?)
            }
            CommandName::GetNotificationPermissionStatus => Ok(Value::Bool(false)),
            CommandName::GetTrayStatus => Ok(serde_json::to_value(TrayStatus::hidden())?),
            CommandName::EnableSystemProxy => unsupported(CapabilityCommand::EnableSystemProxy),
            CommandName::DisableSystemProxy => unsupported(CapabilityCommand::DisableSystemProxy),
            CommandName::RequestNotificationPermission => {
                unsupported(CapabilityCommand::RequestNotificationPermission)
            }
            CommandName::ShowNotification => unsupported(CapabilityCommand::ShowNotification),
            CommandName::ShowTray => unsupported(CapabilityCommand::ShowTray),
            CommandName::UpdateTray => unsupported(CapabilityCommand::UpdateTray),
            CommandName::HideTray => unsupported(CapabilityCommand::HideTray),
        }
    }

    /// Host shutdown: stop the managed process and mark the session stopped
    pub async fn shutdown(&self) {
        let mut guard = self.inner.lock().await;
        guard.supervisor.shutdown().await;
        if guard.session.is_running() {
            guard.session.mark_stopped();
            self.publish(&guard.session, "core stopped");
        }
        info!("Core service shut down");
    }

    fn apply_outcome(
        &self,
        session: &mut SessionState,
        outcome: std::result::Result<LaunchOutcome, SpawnError>,
        success: &str,
        failure: &str,
    ) -> Result<()> {
        match outcome {
            Ok(LaunchOutcome::Real { pid }) => {
                session.mark_real(pid);
                info!(pid = pid, network_mode = %session.network_mode(), "Core running (real)");
                self.publish(session, &format!("{success} (real runtime)"));
                Ok(())
            }
            Ok(LaunchOutcome::Simulated) => {
                session.mark_simulated(self.synthetic_pid());
                info!(pid = session.pid(), "Core running (simulator)");
                self.publish(session, success);
                Ok(())
            }
            Err(e) => {
                session.mark_spawn_failed();
                self.publish(session, failure);
                Err(e.into())
            }
        }
    }

    /// Millisecond timestamp standing in for a pid in simulator mode
    fn synthetic_pid(&self) -> u64 {
        u64::try_from(self.time_provider.now_millis())
            .unwrap_or(1)
            .max(1)
    }

    fn publish(&self, session: &SessionState, message: &str) {
        self.events.publish(CoreEvent::state_changed(
            self.time_provider.now_millis(),
            session.report(),
            message,
        ));
    }
}

fn unsupported(capability: CapabilityCommand) -> Result<Value> {
    Err(AppError::CapabilityUnsupported(capability))
}
