// Runtime Storage Port
// Filesystem primitives the provisioner needs, plus runtime root resolution

use crate::domain::ProvisionError;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Storage backing the per-user runtime root
#[async_trait]
pub trait RuntimeStorage: Send + Sync {
    /// Per-user runtime root directory (deterministic for a given user)
    ///
    /// # Errors
    /// - ProvisionError::RootUnavailable if no user data directory can be determined
    fn runtime_root(&self) -> Result<PathBuf, ProvisionError>;

    /// Create `path` and any missing parents
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy `from` to `to`, replacing whatever is at `to`
    async fn copy_replace(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Write `contents` to `path`, replacing it
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    async fn exists(&self, path: &Path) -> bool;

    /// Mark `path` executable; no-op where the platform has no such bit
    async fn set_executable(&self, path: &Path) -> io::Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory storage with optional write failure injection
    pub struct MemoryRuntimeStorage {
        root: Option<PathBuf>,
        files: Mutex<HashMap<PathBuf, Vec<u8>>>,
        dirs: Mutex<HashSet<PathBuf>>,
        executables: Mutex<HashSet<PathBuf>>,
        fail_writes_to: Mutex<Option<PathBuf>>,
    }

    impl MemoryRuntimeStorage {
        pub fn new(root: impl Into<PathBuf>) -> Self {
            Self {
                root: Some(root.into()),
                files: Mutex::new(HashMap::new()),
                dirs: Mutex::new(HashSet::new()),
                executables: Mutex::new(HashSet::new()),
                fail_writes_to: Mutex::new(None),
            }
        }

        /// Storage with no resolvable user directory
        pub fn without_root() -> Self {
            Self {
                root: None,
                ..Self::new("")
            }
        }

        pub fn put_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
            self.files
                .lock()
                .unwrap()
                .insert(path.into(), contents.into());
        }

        pub fn file(&self, path: &Path) -> Option<Vec<u8>> {
            self.files.lock().unwrap().get(path).cloned()
        }

        pub fn is_dir(&self, path: &Path) -> bool {
            self.dirs.lock().unwrap().contains(path)
        }

        pub fn is_executable(&self, path: &Path) -> bool {
            self.executables.lock().unwrap().contains(path)
        }

        /// Fail any copy or write whose destination is `path`
        pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
            *self.fail_writes_to.lock().unwrap() = Some(path.into());
        }

        pub fn heal(&self) {
            *self.fail_writes_to.lock().unwrap() = None;
        }

        fn check_writable(&self, path: &Path) -> io::Result<()> {
            if self.fail_writes_to.lock().unwrap().as_deref() == Some(path) {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "permission denied",
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RuntimeStorage for MemoryRuntimeStorage {
        fn runtime_root(&self) -> Result<PathBuf, ProvisionError> {
            self.root
                .clone()
                .ok_or_else(|| ProvisionError::RootUnavailable("no data directory".to_string()))
        }

        async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            let mut dirs = self.dirs.lock().unwrap();
            for ancestor in path.ancestors() {
                dirs.insert(ancestor.to_path_buf());
            }
            Ok(())
        }

        async fn copy_replace(&self, from: &Path, to: &Path) -> io::Result<()> {
            self.check_writable(to)?;
            let contents = self.file(from).ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "No such file or directory")
            })?;
            self.put_file(to, contents);
            Ok(())
        }

        async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
            self.check_writable(path)?;
            self.put_file(path, contents);
            Ok(())
        }

        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            let bytes = self.file(path).ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "No such file or directory")
            })?;
            String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        }

        async fn exists(&self, path: &Path) -> bool {
            self.files.lock().unwrap().contains_key(path) || self.is_dir(path)
        }

        async fn set_executable(&self, path: &Path) -> io::Result<()> {
            if self.file(path).is_none() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "No such file or directory",
                ));
            }
            self.executables.lock().unwrap().insert(path.to_path_buf());
            Ok(())
        }
    }
}
