// Runtime Provisioner - install and inspect the versioned runtime payload

use crate::domain::{InspectReport, InstallReport, ProvisionError, RuntimeLayout, RuntimeRequest};
use crate::port::RuntimeStorage;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct RuntimeProvisioner {
    storage: Arc<dyn RuntimeStorage>,
}

impl RuntimeProvisioner {
    pub fn new(storage: Arc<dyn RuntimeStorage>) -> Self {
        Self { storage }
    }

    /// Destination layout under the per-user runtime root
    pub fn layout(&self) -> Result<RuntimeLayout, ProvisionError> {
        self.storage.runtime_root().map(RuntimeLayout::new)
    }

    /// Copy binary and config from `basePath` into the runtime root and
    /// write the VERSION marker
    ///
    /// Existing files are overwritten. A failed step leaves earlier steps in
    /// place; running install again repairs the directory.
    ///
    /// # Errors
    /// - ProvisionError::MissingField if `basePath` is absent
    /// - ProvisionError::RootUnavailable if the runtime root cannot be resolved
    /// - ProvisionError::Io / Copy for the first failing filesystem step
    pub async fn install(&self, request: &RuntimeRequest) -> Result<InstallReport, ProvisionError> {
        let base = request.require_base_path()?;
        let layout = self.layout()?;

        self.storage
            .create_dir_all(layout.root())
            .await
            .map_err(|e| ProvisionError::io("create directory", layout.root(), e))?;

        let binary = layout.binary_path();
        self.copy(&request.source_binary(base), &binary).await?;
        self.copy(&request.source_config(base), &layout.config_path())
            .await?;

        let version_path = layout.version_path();
        self.storage
            .write(&version_path, request.version().as_bytes())
            .await
            .map_err(|e| ProvisionError::io("write", &version_path, e))?;

        self.storage
            .set_executable(&binary)
            .await
            .map_err(|e| ProvisionError::io("set permissions on", &binary, e))?;

        info!(
            version = %request.version(),
            platform_arch = %request.platform_arch(),
            root = %layout.root().display(),
            "Runtime installed"
        );

        Ok(InstallReport::installed(&layout))
    }

    /// Report what is currently installed
    ///
    /// Missing files are reported, not raised. `basePath` is not needed.
    ///
    /// # Errors
    /// - ProvisionError::RootUnavailable if the runtime root cannot be resolved
    pub async fn inspect(&self, request: &RuntimeRequest) -> Result<InspectReport, ProvisionError> {
        let layout = self.layout()?;

        let binary_exists = self.storage.exists(&layout.binary_path()).await;
        let config_exists = self.storage.exists(&layout.config_path()).await;
        let marker = self
            .storage
            .read_to_string(&layout.version_path())
            .await
            .ok();

        let report = InspectReport::evaluate(&layout, request, binary_exists, config_exists, marker);
        debug!(
            ready = report.ready,
            runtime_version = %report.runtime_version,
            expected_version = %report.expected_version,
            "Runtime inspected"
        );
        Ok(report)
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<(), ProvisionError> {
        self.storage
            .copy_replace(from, to)
            .await
            .map_err(|source| ProvisionError::Copy {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::runtime_storage::mocks::MemoryRuntimeStorage;
    use std::path::PathBuf;
    use tokio_test::{assert_err, assert_ok};

    const ARCH: &str = "linux-amd64";

    fn request(version: &str, base: Option<&str>) -> RuntimeRequest {
        RuntimeRequest::new(
            Some(version.to_string()),
            Some(ARCH.to_string()),
            base.map(str::to_string),
        )
        .unwrap()
    }

    fn seeded_storage(version: &str) -> Arc<MemoryRuntimeStorage> {
        let storage = Arc::new(MemoryRuntimeStorage::new("/home/u/.local/share/jumper-runtime"));
        let req = request(version, Some("/app"));
        let base = PathBuf::from("/app");
        storage.put_file(req.source_binary(&base), b"ELF".to_vec());
        storage.put_file(req.source_config(&base), b"{}".to_vec());
        storage
    }

    #[tokio::test]
    async fn test_install_writes_payload() {
        let storage = seeded_storage("1.12.0");
        let provisioner = RuntimeProvisioner::new(storage.clone());

        let report = provisioner.install(&request("1.12.0", Some("/app"))).await.unwrap();
        let layout = provisioner.layout().unwrap();

        assert!(report.installed);
        assert_eq!(storage.file(&layout.binary_path()).unwrap(), b"ELF");
        assert_eq!(storage.file(&layout.config_path()).unwrap(), b"{}");
        assert_eq!(storage.file(&layout.version_path()).unwrap(), b"1.12.0");
        assert!(storage.is_executable(&layout.binary_path()));
        assert!(storage.is_dir(layout.root()));
    }

    #[tokio::test]
    async fn test_install_twice_is_idempotent() {
        let storage = seeded_storage("1.12.0");
        let provisioner = RuntimeProvisioner::new(storage);
        let req = request("1.12.0", Some("/app"));

        let first = assert_ok!(provisioner.install(&req).await);
        let second = assert_ok!(provisioner.install(&req).await);

        assert_eq!(first, second);
        assert!(provisioner.inspect(&req).await.unwrap().ready);
    }

    #[tokio::test]
    async fn test_install_requires_base_path() {
        let provisioner = RuntimeProvisioner::new(seeded_storage("1.12.0"));

        let err = provisioner.install(&request("1.12.0", None)).await.unwrap_err();

        assert!(matches!(err, ProvisionError::MissingField("basePath")));
    }

    #[tokio::test]
    async fn test_install_missing_source_names_path() {
        let storage = Arc::new(MemoryRuntimeStorage::new("/rt"));
        let provisioner = RuntimeProvisioner::new(storage);

        let err = provisioner
            .install(&request("1.12.0", Some("/app")))
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Copy { .. }));
        assert!(err.to_string().contains("sing-box-1.12.0-linux-amd64"));
    }

    #[tokio::test]
    async fn test_retry_after_partial_failure_heals() {
        let storage = seeded_storage("1.12.0");
        let provisioner = RuntimeProvisioner::new(storage.clone());
        let req = request("1.12.0", Some("/app"));
        let version_path = provisioner.layout().unwrap().version_path();

        storage.fail_writes_to(&version_path);
        assert_err!(provisioner.install(&req).await);
        assert!(!provisioner.inspect(&req).await.unwrap().ready);

        storage.heal();
        provisioner.install(&req).await.unwrap();
        assert!(provisioner.inspect(&req).await.unwrap().ready);
    }

    #[tokio::test]
    async fn test_inspect_empty_root_never_fails() {
        let provisioner = RuntimeProvisioner::new(Arc::new(MemoryRuntimeStorage::new("/rt")));

        let report = provisioner.inspect(&request("1.12.0", None)).await.unwrap();

        assert!(!report.ready);
        assert!(!report.binary_exists);
        assert!(!report.config_exists);
        assert_eq!(report.runtime_version, "");
        assert!(!report.version_matches);
    }

    #[tokio::test]
    async fn test_inspect_detects_version_mismatch() {
        let storage = seeded_storage("1.0.0");
        let provisioner = RuntimeProvisioner::new(storage);
        provisioner.install(&request("1.0.0", Some("/app"))).await.unwrap();

        let report = provisioner.inspect(&request("1.0.1", None)).await.unwrap();

        assert!(report.binary_exists);
        assert!(report.config_exists);
        assert_eq!(report.runtime_version, "1.0.0");
        assert_eq!(report.expected_version, "1.0.1");
        assert!(!report.version_matches);
        assert!(!report.ready);
    }

    #[tokio::test]
    async fn test_unresolvable_root() {
        let provisioner = RuntimeProvisioner::new(Arc::new(MemoryRuntimeStorage::without_root()));

        let err = provisioner.inspect(&request("1.0.0", None)).await.unwrap_err();

        assert!(matches!(err, ProvisionError::RootUnavailable(_)));
    }
}
