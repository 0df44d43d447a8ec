// Local filesystem runtime storage
// reason: directories for the per-user data dir, tokio::fs for async I/O
use async_trait::async_trait;
use directories::BaseDirs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use jumper_core::domain::runtime::RUNTIME_DIR_NAME;
use jumper_core::domain::ProvisionError;
use jumper_core::port::RuntimeStorage;

/// Runtime payload on the local disk
///
/// The root defaults to `<user data dir>/jumper-runtime`:
/// - Linux: `$XDG_DATA_HOME` or `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `%LOCALAPPDATA%`
pub struct LocalRuntimeStorage {
    root_override: Option<PathBuf>,
}

impl LocalRuntimeStorage {
    pub fn new() -> Self {
        Self {
            root_override: None,
        }
    }

    /// Use `root` instead of the per-user default
    pub fn with_root(root: Option<PathBuf>) -> Self {
        Self {
            root_override: root,
        }
    }
}

impl Default for LocalRuntimeStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn default_runtime_root() -> Option<PathBuf> {
    let dirs = BaseDirs::new()?;

    #[cfg(windows)]
    let data = dirs.data_local_dir();
    #[cfg(not(windows))]
    let data = dirs.data_dir();

    Some(data.join(RUNTIME_DIR_NAME))
}

#[async_trait]
impl RuntimeStorage for LocalRuntimeStorage {
    fn runtime_root(&self) -> Result<PathBuf, ProvisionError> {
        if let Some(root) = &self.root_override {
            return Ok(root.clone());
        }
        default_runtime_root().ok_or_else(|| {
            ProvisionError::RootUnavailable("unable to determine the user data directory".into())
        })
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn copy_replace(&self, from: &Path, to: &Path) -> io::Result<()> {
        // Unlink first so a binary that is still executing can be replaced
        match fs::remove_file(to).await {
            Ok(()) => debug!(path = %to.display(), "Removed previous file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        fs::copy(from, to).await.map(|_| ())
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).await
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn set_executable(&self, path: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).await
        }

        #[cfg(not(unix))]
        {
            let _ = path;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[test]
    fn test_override_wins() {
        let storage = LocalRuntimeStorage::with_root(Some(PathBuf::from("/srv/jumper")));
        assert_eq!(storage.runtime_root().unwrap(), PathBuf::from("/srv/jumper"));
    }

    #[test]
    fn test_default_root_ends_with_runtime_dir() {
        if let Ok(root) = LocalRuntimeStorage::new().runtime_root() {
            assert!(root.ends_with(RUNTIME_DIR_NAME));
        }
    }

    #[tokio::test]
    async fn test_copy_replace_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalRuntimeStorage::with_root(Some(dir.path().to_path_buf()));
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        std::fs::write(&src, "new").unwrap();
        std::fs::write(&dst, "old").unwrap();

        assert_ok!(storage.copy_replace(&src, &dst).await);

        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_exists_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalRuntimeStorage::new();
        let file = dir.path().join("VERSION");

        assert!(!storage.exists(&file).await);
        assert!(storage.read_to_string(&file).await.is_err());

        storage.write(&file, b"1.12.0\n").await.unwrap();
        assert!(storage.exists(&file).await);
        assert_eq!(storage.read_to_string(&file).await.unwrap(), "1.12.0\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_set_executable_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sing-box");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();

        LocalRuntimeStorage::new().set_executable(&file).await.unwrap();

        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
