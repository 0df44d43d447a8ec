//! Simple SDK Example
//!
//! Starts the core, prints a few lifecycle events, then stops it.
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package jumper-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --package jumper-sdk --example simple
//!    ```

use jumper_sdk::{CoreEvent, JumperClient, StartCoreRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Jumper SDK - Simple Example");
    println!("===========================\n");

    // 1. Connect to daemon
    println!("1. Connecting to daemon...");
    let client = JumperClient::connect("http://127.0.0.1:9630").await?;
    println!("   ✓ Connected to {}\n", client.get_platform_version().await?);

    // 2. Watch lifecycle events
    let mut events = client.subscribe_core_events().await?;

    // 3. Start without launch options (simulated runtime)
    println!("2. Starting core...");
    client
        .start_core(&StartCoreRequest {
            profile_id: Some("example".to_string()),
            ..Default::default()
        })
        .await?;

    if let Some(event) = events.next().await {
        let CoreEvent::CoreStateChanged { payload, .. } = event?;
        println!("   ✓ {} (pid {:?})\n", payload.message, payload.state.pid);
    }

    // 4. Query state
    println!("3. Querying state...");
    let state = client.get_core_state().await?;
    println!("   - Status: {}", state.status);
    println!("   - Mode: {}", state.runtime_mode);
    println!("   - Network: {}\n", state.network_mode);

    // 5. Stop
    println!("4. Stopping core...");
    client.stop_core().await?;
    println!("   ✓ Stopped");

    events.unsubscribe().await?;
    Ok(())
}
