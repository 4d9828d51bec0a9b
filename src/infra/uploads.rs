// ============================================================
// Layer 6: Upload Store
// ============================================================
// Uploaded images are written to disk before decoding. The
// client's filename is never used as the path: every upload gets
// a fresh UUID, so two customers sending "photo.jpg" at the same
// moment cannot overwrite each other. Only a short alphanumeric
// extension is carried over.
//
// Cleanup policy: the file is removed when the `StoredUpload`
// guard drops, on every outcome. Removal is best-effort; a
// failure is logged at debug level and otherwise ignored.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create the store, making the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create upload directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under a request-unique name.
    pub fn persist(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload> {
        let name = match safe_extension(original_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Cannot save upload to '{}'", path.display()))?;
        tracing::debug!("Saved upload '{}' as '{}'", original_name, path.display());
        Ok(StoredUpload { path })
    }
}

/// Extension of the client's filename, if it is short and
/// purely alphanumeric.
fn safe_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// An upload on disk, deleted on drop.
#[derive(Debug)]
pub struct StoredUpload {
    path: PathBuf,
}

impl StoredUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::debug!("Could not remove upload '{}': {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_gets_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();
        let a = store.persist("photo.jpg", b"a").unwrap();
        let b = store.persist("photo.jpg", b"b").unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(std::fs::read(a.path()).unwrap(), b"a");
        assert_eq!(std::fs::read(b.path()).unwrap(), b"b");
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();
        let upload = store.persist("x.png", b"data").unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());
        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();
        let upload = store.persist("x.png", b"data").unwrap();
        std::fs::remove_file(upload.path()).unwrap();
        drop(upload);
    }

    #[test]
    fn test_client_path_is_not_trusted() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();
        let upload = store.persist("../../etc/passwd", b"x").unwrap();
        assert_eq!(upload.path().parent(), Some(dir.path()));
    }

    #[test]
    fn test_safe_extension() {
        assert_eq!(safe_extension("Photo.JPG"), Some("jpg".to_string()));
        assert_eq!(safe_extension("noext"), None);
        assert_eq!(safe_extension("a.tar/../x"), None);
        assert_eq!(safe_extension("trailing."), None);
    }
}
