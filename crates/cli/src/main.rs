//! Jumper CLI - Command-line interface for the Jumper host daemon

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use jumper_sdk::{
    CoreEvent, CoreStateReport, InspectReport, InstallReport, JumperClient, KernelLogLevel,
    PlatformCapabilities,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "jumper")]
#[command(about = "Jumper host daemon CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "JUMPER_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show core state
    Status,

    /// Start the core (simulated when no binary is given)
    Start(LaunchArgs),

    /// Stop the core
    Stop,

    /// Restart the core, reusing the last launch when no binary is given
    Restart(LaunchArgs),

    /// Reset the tunnel of a running core
    ResetTunnel,

    /// Install the runtime payload from a source tree
    SetupRuntime {
        #[command(flatten)]
        runtime: RuntimeArgs,
    },

    /// Check the installed runtime against a version
    InspectRuntime {
        #[command(flatten)]
        runtime: RuntimeArgs,
    },

    /// Show host capabilities
    Capabilities,

    /// Show the host platform version
    Platform,

    /// Call any command by name
    Invoke {
        /// Command name (e.g., getTrayStatus)
        method: String,

        /// Arguments as JSON object
        #[arg(long)]
        arguments: Option<String>,
    },

    /// Follow core events (or managed process output with --logs)
    Watch {
        /// Stream managed process output instead of lifecycle events
        #[arg(long)]
        logs: bool,
    },
}

#[derive(Args)]
struct LaunchArgs {
    /// Runtime binary to launch
    #[arg(short, long)]
    binary: Option<String>,

    /// Argument passed to the binary (repeatable)
    #[arg(short = 'a', long = "arg", allow_hyphen_values = true)]
    args: Vec<String>,

    /// Working directory of the process
    #[arg(long)]
    cwd: Option<String>,

    /// Extra environment variable KEY=VALUE (repeatable)
    #[arg(short, long = "env", value_parser = parse_key_val)]
    env: Vec<(String, String)>,

    /// Opaque profile identifier
    #[arg(short, long)]
    profile: Option<String>,

    /// Network mode (default: tunnel)
    #[arg(short, long)]
    network_mode: Option<String>,
}

#[derive(Args)]
struct RuntimeArgs {
    /// Runtime version (e.g., 1.10.0)
    #[arg(long)]
    runtime_version: String,

    /// Platform/arch directory name (e.g., linux-amd64)
    #[arg(long)]
    arch: String,

    /// Source tree containing engine/runtime-assets
    #[arg(long)]
    base_path: Option<String>,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: Value,
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    data: Option<Value>,
}

#[derive(Deserialize)]
struct ErrorData {
    code: String,
    detail: Option<Value>,
}

#[derive(Tabled)]
struct StateRow {
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Mode")]
    runtime_mode: String,
    #[tabled(rename = "Network")]
    network_mode: String,
    #[tabled(rename = "PID")]
    pid: String,
    #[tabled(rename = "Profile")]
    profile_id: String,
}

impl From<CoreStateReport> for StateRow {
    fn from(state: CoreStateReport) -> Self {
        Self {
            status: state.status.to_string(),
            runtime_mode: state.runtime_mode.to_string(),
            network_mode: state.network_mode,
            pid: state.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
            profile_id: state.profile_id.unwrap_or_else(|| "-".to_string()),
        }
    }
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "Check")]
    check: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn check(check: &'static str, value: impl ToString) -> CheckRow {
    CheckRow {
        check,
        value: value.to_string(),
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

impl LaunchArgs {
    fn to_params(&self) -> Value {
        let mut params = Map::new();

        if let Some(binary) = &self.binary {
            let env: Map<String, Value> = self
                .env
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            params.insert(
                "launchOptions".to_string(),
                json!({
                    "binaryPath": binary,
                    "arguments": self.args,
                    "workingDirectory": self.cwd,
                    "environment": env,
                }),
            );
        }
        if let Some(profile) = &self.profile {
            params.insert("profileId".to_string(), json!(profile));
        }
        if let Some(mode) = &self.network_mode {
            params.insert("networkMode".to_string(), json!(mode));
        }

        Value::Object(params)
    }
}

impl RuntimeArgs {
    fn to_params(&self) -> Value {
        json!({
            "version": self.runtime_version,
            "platformArch": self.arch,
            "basePath": self.base_path,
        })
    }
}

async fn call_rpc(url: &str, method: &str, params: Value) -> Result<Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        match error.data.and_then(|d| serde_json::from_value::<ErrorData>(d).ok()) {
            Some(data) => match data.detail {
                Some(detail) => anyhow::bail!("{} ({}): {}", error.message, data.code, detail),
                None => anyhow::bail!("{} ({})", error.message, data.code),
            },
            None => anyhow::bail!("RPC error ({}): {}", error.code, error.message),
        }
    }

    Ok(response.result.unwrap_or(Value::Null))
}

async fn print_state(url: &str) -> Result<()> {
    let result = call_rpc(url, "getCoreState", Value::Null).await?;
    let state: CoreStateReport = serde_json::from_value(result)?;
    println!("{}", Table::new(vec![StateRow::from(state)]));
    Ok(())
}

async fn watch(url: &str, logs: bool) -> Result<()> {
    let client = JumperClient::connect(url).await?;

    if logs {
        println!("{}", "Following managed process output (Ctrl+C to stop)".cyan().bold());
        let mut stream = client.subscribe_kernel_logs().await?;
        while let Some(line) = stream.next().await {
            let line = line?;
            match line.level {
                KernelLogLevel::Info => println!("{}", line.message),
                KernelLogLevel::Error => println!("{}", line.message.red()),
            }
        }
    } else {
        println!("{}", "Following core events (Ctrl+C to stop)".cyan().bold());
        let mut stream = client.subscribe_core_events().await?;
        while let Some(event) = stream.next().await {
            let CoreEvent::CoreStateChanged {
                timestamp_ms,
                payload,
            } = event?;
            println!(
                "{} {} {} [{} / {}]",
                timestamp_ms.to_string().dimmed(),
                "•".bold(),
                payload.message,
                payload.state.status,
                payload.state.runtime_mode
            );
        }
    }

    println!("{}", "Stream closed by daemon".yellow());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let url = cli.rpc_url.as_str();

    match cli.command {
        Commands::Status => {
            println!("{}", "Core Status".cyan().bold());
            println!();
            if let Err(e) = print_state(url).await {
                println!("  {} {}", "Daemon:".bold(), "UNREACHABLE".red());
                println!("  {} {}", "Error:".bold(), e);
            }
        }

        Commands::Start(launch) => {
            call_rpc(url, "startCore", launch.to_params()).await?;
            println!("{}", "✓ Core started".green().bold());
            println!();
            print_state(url).await?;
        }

        Commands::Stop => {
            call_rpc(url, "stopCore", Value::Null).await?;
            println!("{}", "✓ Core stopped".green().bold());
        }

        Commands::Restart(launch) => {
            call_rpc(url, "restartCore", launch.to_params()).await?;
            println!("{}", "✓ Core restarted".green().bold());
            println!();
            print_state(url).await?;
        }

        Commands::ResetTunnel => {
            call_rpc(url, "resetTunnel", Value::Null).await?;
            println!("{}", "✓ Tunnel reset".green().bold());
        }

        Commands::SetupRuntime { runtime } => {
            let result = call_rpc(url, "setupRuntime", runtime.to_params()).await?;
            let report: InstallReport = serde_json::from_value(result)?;

            println!("{}", "✓ Runtime installed".green().bold());
            println!();
            let rows = vec![
                check("Runtime root", report.runtime_root),
                check("Binary", report.binary_path),
                check("Config", report.config_path),
            ];
            println!("{}", Table::new(rows));
        }

        Commands::InspectRuntime { runtime } => {
            let result = call_rpc(url, "inspectRuntime", runtime.to_params()).await?;
            let report: InspectReport = serde_json::from_value(result)?;

            if report.ready {
                println!("{}", "✓ Runtime ready".green().bold());
            } else {
                println!("{}", "✗ Runtime not ready".red().bold());
            }
            println!();
            let installed = if report.runtime_version.is_empty() {
                "-".to_string()
            } else {
                report.runtime_version
            };
            let rows = vec![
                check("Binary present", report.binary_exists),
                check("Config present", report.config_exists),
                check("Installed version", installed),
                check("Expected version", report.expected_version),
                check("Version matches", report.version_matches),
            ];
            println!("{}", Table::new(rows));
        }

        Commands::Capabilities => {
            let result = call_rpc(url, "getPlatformCapabilities", Value::Null).await?;
            let caps: PlatformCapabilities = serde_json::from_value(result)?;
            let rows = vec![
                check("Tunnel", caps.tunnel_supported),
                check("System proxy", caps.system_proxy_supported),
                check("Notifications", caps.notify_supported),
                check("Tray", caps.tray_supported),
            ];
            println!("{}", Table::new(rows));
        }

        Commands::Platform => {
            let result = call_rpc(url, "getPlatformVersion", Value::Null).await?;
            println!("{}", result.as_str().unwrap_or_default());
        }

        Commands::Invoke { method, arguments } => {
            let arguments: Value = match arguments {
                Some(raw) => serde_json::from_str(&raw).context("Invalid JSON arguments")?,
                None => Value::Null,
            };
            let result = call_rpc(
                url,
                "invoke",
                json!({ "method": method, "arguments": arguments }),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Watch { logs } => watch(url, logs).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launch(binary: Option<&str>) -> LaunchArgs {
        LaunchArgs {
            binary: binary.map(str::to_string),
            args: vec!["run".to_string()],
            cwd: None,
            env: vec![("A".to_string(), "1".to_string())],
            profile: Some("p1".to_string()),
            network_mode: None,
        }
    }

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_launch_params_with_binary() {
        let params = launch(Some("/opt/sing-box")).to_params();

        assert_eq!(params["launchOptions"]["binaryPath"], "/opt/sing-box");
        assert_eq!(params["launchOptions"]["arguments"], json!(["run"]));
        assert_eq!(params["launchOptions"]["environment"], json!({"A": "1"}));
        assert_eq!(params["profileId"], "p1");
        assert!(params.get("networkMode").is_none());
    }

    #[test]
    fn test_launch_params_without_binary_are_simulated() {
        let params = launch(None).to_params();

        assert!(params.get("launchOptions").is_none());
    }

    #[test]
    fn test_cli_parses_start() {
        let cli = Cli::try_parse_from([
            "jumper", "start", "-b", "/opt/sing-box", "-a", "run", "-a", "-c", "-e", "K=V",
        ])
        .unwrap();

        match cli.command {
            Commands::Start(args) => {
                assert_eq!(args.args, vec!["run", "-c"]);
                assert_eq!(args.env, vec![("K".to_string(), "V".to_string())]);
            }
            _ => panic!("expected start"),
        }
    }
}
