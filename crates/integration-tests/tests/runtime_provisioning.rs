//! Runtime Provisioning Tests
//!
//! setupRuntime / inspectRuntime against a real directory tree.

use jumper_core::application::{CoreService, EventHub};
use jumper_core::domain::{InspectReport, InstallReport};
use jumper_core::port::time_provider::SystemTimeProvider;
use jumper_core::port::TimeProvider;
use jumper_core::ErrorCode;
use jumper_infra_system::{LocalRuntimeStorage, SysinfoPlatformProbe, TokioProcessLauncher};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

const ARCH: &str = "linux-amd64";

struct Fixture {
    _dir: TempDir,
    base: PathBuf,
    root: PathBuf,
    core: CoreService,
}

fn binary_name() -> String {
    format!("sing-box{}", std::env::consts::EXE_SUFFIX)
}

/// Source tree for `version` under `<tmp>/app` and an empty runtime root
fn fixture(version: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("app");
    let root = dir.path().join("runtime");
    write_source(&base, version, b"#!/bin/sh\necho sing-box\n");

    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let core = CoreService::new(
        Arc::new(TokioProcessLauncher::new(time_provider.clone())),
        Arc::new(LocalRuntimeStorage::with_root(Some(root.clone()))),
        Arc::new(SysinfoPlatformProbe),
        time_provider,
        EventHub::new(),
    );

    Fixture {
        _dir: dir,
        base,
        root,
        core,
    }
}

fn write_source(base: &Path, version: &str, binary: &[u8]) {
    let assets = base.join("engine").join("runtime-assets").join(ARCH);
    let release = assets.join(format!("sing-box-{version}-{ARCH}"));
    fs::create_dir_all(&release).unwrap();
    fs::write(release.join(binary_name()), binary).unwrap();
    fs::write(assets.join("minimal-config.json"), br#"{"log":{"level":"info"}}"#).unwrap();
}

fn request(f: &Fixture, version: &str) -> Value {
    json!({ "version": version, "platformArch": ARCH, "basePath": f.base })
}

async fn inspect(f: &Fixture, version: &str) -> InspectReport {
    let value = f
        .core
        .dispatch("inspectRuntime", json!({ "version": version, "platformArch": ARCH }))
        .await
        .unwrap();
    serde_json::from_value(value).unwrap()
}

/// Install copies binary and config, writes VERSION and reports the paths
#[tokio::test]
async fn test_install_then_inspect_ready() {
    let f = fixture("1.10.0");

    let value = f
        .core
        .dispatch("setupRuntime", request(&f, "1.10.0"))
        .await
        .unwrap();
    let report: InstallReport = serde_json::from_value(value).unwrap();

    assert!(report.installed);
    assert_eq!(PathBuf::from(&report.runtime_root), f.root);
    assert_eq!(PathBuf::from(&report.binary_path), f.root.join(binary_name()));
    assert_eq!(PathBuf::from(&report.config_path), f.root.join("config.json"));
    assert_eq!(fs::read_to_string(f.root.join("VERSION")).unwrap(), "1.10.0");
    assert_eq!(
        fs::read_to_string(f.root.join("config.json")).unwrap(),
        r#"{"log":{"level":"info"}}"#
    );

    let inspected = inspect(&f, "1.10.0").await;
    assert!(inspected.ready);
    assert!(inspected.binary_exists && inspected.config_exists);
    assert_eq!(inspected.runtime_version, "1.10.0");
}

/// Installed binary is executable on Unix
#[cfg(unix)]
#[tokio::test]
async fn test_installed_binary_is_executable() {
    use std::os::unix::fs::PermissionsExt;

    let f = fixture("1.10.0");
    f.core
        .dispatch("setupRuntime", request(&f, "1.10.0"))
        .await
        .unwrap();

    let mode = fs::metadata(f.root.join(binary_name()))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);
}

/// Reinstalling overwrites; the second payload wins
#[tokio::test]
async fn test_reinstall_overwrites() {
    let f = fixture("1.10.0");
    f.core
        .dispatch("setupRuntime", request(&f, "1.10.0"))
        .await
        .unwrap();

    write_source(&f.base, "1.11.0", b"new build");
    f.core
        .dispatch("setupRuntime", request(&f, "1.11.0"))
        .await
        .unwrap();

    assert_eq!(fs::read(f.root.join(binary_name())).unwrap(), b"new build");
    assert!(inspect(&f, "1.11.0").await.ready);
    assert!(!inspect(&f, "1.10.0").await.version_matches);
}

/// Inspect on an empty root reports, never fails
#[tokio::test]
async fn test_inspect_before_install() {
    let f = fixture("1.10.0");

    let report = inspect(&f, "1.10.0").await;

    assert!(!report.ready);
    assert!(!report.binary_exists);
    assert!(!report.config_exists);
    assert_eq!(report.runtime_version, "");
    assert!(!f.root.exists());
}

/// A hand-edited VERSION marker is trimmed before comparing
#[tokio::test]
async fn test_version_marker_whitespace_and_mismatch() {
    let f = fixture("1.0.0");
    f.core
        .dispatch("setupRuntime", request(&f, "1.0.0"))
        .await
        .unwrap();
    fs::write(f.root.join("VERSION"), "1.0.0\n").unwrap();

    assert!(inspect(&f, "1.0.0").await.ready);

    let mismatch = inspect(&f, "1.0.1").await;
    assert!(!mismatch.ready);
    assert!(!mismatch.version_matches);
    assert_eq!(mismatch.runtime_version, "1.0.0");
    assert_eq!(mismatch.expected_version, "1.0.1");
}

/// Missing source binary: structured failure naming the path
#[tokio::test]
async fn test_missing_source_fails_setup() {
    let f = fixture("1.10.0");

    let err = f
        .core
        .dispatch("setupRuntime", request(&f, "9.9.9"))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::SetupRuntimeFailed);
    let detail = err.detail_text().unwrap();
    assert!(detail.contains("sing-box-9.9.9"), "detail: {detail}");
}

/// setupRuntime needs basePath; malformed requests keep the command's code
#[tokio::test]
async fn test_malformed_requests() {
    let f = fixture("1.10.0");

    let no_base = f
        .core
        .dispatch("setupRuntime", json!({ "version": "1.10.0", "platformArch": ARCH }))
        .await
        .unwrap_err();
    assert_eq!(no_base.code, ErrorCode::SetupRuntimeFailed);

    let no_version = f
        .core
        .dispatch("inspectRuntime", json!({ "platformArch": ARCH }))
        .await
        .unwrap_err();
    assert_eq!(no_version.code, ErrorCode::InspectRuntimeFailed);
}
