//! File storage backends for evidence images.
//!
//! Paths handed to a backend are relative, `/`-separated storage keys such as
//! `evidence/1Z999AA1234567890/{uuid}.jpg`. The filesystem backend resolves
//! them under a media root.
//!
//! ## Example
//!
//! ```rust,ignore
//! use parcel_store::{FilesystemBackend, StorageBackend};
//!
//! let backend = FilesystemBackend::new("/var/lib/parcel/media");
//! backend.validate().await?;
//! backend.write("evidence/FDX123456789012/photo.png", &data).await?;
//! ```

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use parcel_core::{defaults::EVIDENCE_DIR, Error, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Storage backend trait for different storage implementations.
///
/// Allows abstracting over the local filesystem or any other blob store.
/// Implementations report their own failures as [`Error::Storage`].
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to the specified path, replacing any existing content.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Delete data at the specified path. Deleting a missing path succeeds.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;
}

/// Filesystem storage backend rooted at a media directory.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a storage key under the base path, refusing anything that
    /// could escape it.
    fn full_path(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = path.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(Error::InvalidInput(format!(
                "storage path '{}' must be relative and may not contain '..'",
                path
            )));
        }
        Ok(self.base_path.join(relative))
    }

    /// Validate that the storage backend can write, read, and delete files.
    ///
    /// Performs a full round trip at startup to catch permission errors and
    /// missing directories before the first upload does.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await; // Best-effort cleanup

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path)?;
        debug!(subsystem = "storage", storage_path = %path, full_path = %full_path.display(), size_bytes = data.len(), "file_storage: write");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(subsystem = "storage", parent = %parent.display(), error = %e, "file_storage: create_dir_all failed");
                e
            })?;
        }

        // Atomic write: temp file + rename
        let mut temp_name = full_path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);
        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(subsystem = "storage", temp_path = %temp_path.display(), error = %e, "file_storage: File::create failed");
            e
        })?;
        file.write_all(data).await.map_err(|e| {
            warn!(subsystem = "storage", error = %e, "file_storage: write_all failed");
            e
        })?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(subsystem = "storage", from = %temp_path.display(), to = %full_path.display(), error = %e, "file_storage: rename failed");
            e
        })?;

        // Set permissions to 0644 (rw-r--r--, no execute)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        if fs::try_exists(&full_path).await? {
            debug!(subsystem = "storage", storage_path = %path, "file_storage: delete");
            fs::remove_file(full_path).await?;
        }
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.full_path(path)?;
        Ok(fs::try_exists(full_path).await?)
    }
}

/// Storage key for an evidence file: `evidence/{tracking_number}/{filename}`.
pub fn evidence_storage_path(tracking_number: &str, filename: &str) -> String {
    format!("{}/{}/{}", EVIDENCE_DIR, tracking_number, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, FilesystemBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        (dir, backend)
    }

    #[test]
    fn test_evidence_storage_path() {
        assert_eq!(
            evidence_storage_path("FDX123456789012", "abc.png"),
            "evidence/FDX123456789012/abc.png"
        );
    }

    #[tokio::test]
    async fn test_write_read_roundtrip_creates_directories() {
        let (dir, backend) = backend();
        backend
            .write("evidence/FDX123456789012/a.png", b"payload")
            .await
            .unwrap();

        assert!(dir.path().join("evidence/FDX123456789012/a.png").is_file());
        assert_eq!(
            std::fs::read(dir.path().join("evidence/FDX123456789012/a.png")).unwrap(),
            b"payload"
        );
        // No temp file left behind
        assert!(!dir.path().join("evidence/FDX123456789012/a.png.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let (dir, backend) = backend();
        backend.write("x/y.bin", b"one").await.unwrap();
        backend.write("x/y.bin", b"two").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("x/y.bin")).unwrap(), b"two");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_files_are_not_executable() {
        use std::os::unix::fs::PermissionsExt;
        let (dir, backend) = backend();
        backend.write("p.bin", b"data").await.unwrap();
        let mode = std::fs::metadata(dir.path().join("p.bin"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, backend) = backend();
        backend.write("a/b.bin", b"data").await.unwrap();
        assert!(backend.exists("a/b.bin").await.unwrap());

        backend.delete("a/b.bin").await.unwrap();
        assert!(!backend.exists("a/b.bin").await.unwrap());

        // Second delete of a missing file is not an error
        backend.delete("a/b.bin").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let (_dir, backend) = backend();
        for path in ["../outside.bin", "a/../../b.bin", "/etc/passwd", ""] {
            let result = backend.write(path, b"x").await;
            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "{:?} should be rejected",
                path
            );
        }
    }

    #[tokio::test]
    async fn test_validate_succeeds_on_writable_dir() {
        let (dir, backend) = backend();
        backend.validate().await.unwrap();
        assert!(!dir.path().join(".health-check").exists());
    }

    #[tokio::test]
    async fn test_validate_fails_when_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("not-a-dir");
        std::fs::write(&file_path, b"x").unwrap();

        let backend = FilesystemBackend::new(&file_path);
        assert!(backend.validate().await.is_err());
    }
}
