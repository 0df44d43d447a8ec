// Event fan-out for core state changes and kernel output

use crate::application::constants::{CORE_EVENT_CHANNEL_CAPACITY, KERNEL_LOG_CHANNEL_CAPACITY};
use crate::domain::{CoreEvent, KernelLogLine, KernelLogSender};
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcast hub shared by the core service and its subscribers
///
/// Publishing never blocks; subscribers that fall behind lose the oldest
/// events.
#[derive(Clone)]
pub struct EventHub {
    core: broadcast::Sender<CoreEvent>,
    logs: KernelLogSender,
}

impl EventHub {
    pub fn new() -> Self {
        Self::with_capacity(CORE_EVENT_CHANNEL_CAPACITY, KERNEL_LOG_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(core_capacity: usize, log_capacity: usize) -> Self {
        let (core, _) = broadcast::channel(core_capacity);
        let (logs, _) = broadcast::channel(log_capacity);
        Self { core, logs }
    }

    pub fn subscribe_core(&self) -> broadcast::Receiver<CoreEvent> {
        self.core.subscribe()
    }

    pub fn subscribe_logs(&self) -> broadcast::Receiver<KernelLogLine> {
        self.logs.subscribe()
    }

    /// Sender handed to the process launcher
    pub fn log_sender(&self) -> KernelLogSender {
        self.logs.clone()
    }

    pub fn publish(&self, event: CoreEvent) {
        // Err only means nobody is listening
        if self.core.send(event).is_err() {
            trace!("Core event dropped: no subscribers");
        }
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}
