// Supervisor constants (no magic values)
use std::time::Duration;

/// Time a managed process gets to exit after the termination request (2s)
pub const DEFAULT_STOP_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Upper bound on reaping a force-killed process (1s)
pub const FORCED_REAP_TIMEOUT: Duration = Duration::from_secs(1);

/// Buffered core events per subscriber before lagging
pub const CORE_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Buffered kernel log lines per subscriber before lagging
pub const KERNEL_LOG_CHANNEL_CAPACITY: usize = 1024;
