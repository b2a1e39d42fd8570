use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// The public path prefix under which stored images are served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

/// Local image storage for plant photos.
///
/// Plant records store the public `/uploads/<name>` path; only paths with
/// that prefix are ever considered locally owned (anything else, e.g. an
/// external URL, is left alone). Removal is best-effort: an artifact that is
/// already gone must never fail the enclosing delete or update.
#[derive(Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist uploaded bytes under a fresh uuid-based name, keeping the
    /// original extension. Returns the public path to store on the record.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let name = match extension_of(original_name) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::write(self.dir.join(&name), bytes).await?;
        Ok(format!("{}{}", PUBLIC_PREFIX, name))
    }

    /// Remove a locally owned artifact if it exists. Failures are logged and
    /// swallowed.
    pub async fn remove(&self, public_path: &str) {
        let Some(name) = public_path.strip_prefix(PUBLIC_PREFIX) else {
            return;
        };
        // Stored names are uuid-based; refuse anything that walks out of the dir
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to remove image {}: {}", public_path, e);
            }
        }
    }
}

fn extension_of(name: &str) -> Option<&str> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> ImageStore {
        let dir = std::env::temp_dir().join(format!("herbarium-test-{}", Uuid::new_v4()));
        ImageStore::new(dir).unwrap()
    }

    #[tokio::test]
    async fn save_then_remove() {
        let store = temp_store();
        let path = store.save("leaf.jpg", b"fake image bytes").await.unwrap();
        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".jpg"));

        let on_disk = store.dir().join(path.strip_prefix("/uploads/").unwrap());
        assert!(on_disk.exists());

        store.remove(&path).await;
        assert!(!on_disk.exists());
    }

    #[tokio::test]
    async fn removing_a_missing_artifact_is_a_no_op() {
        let store = temp_store();
        store.remove("/uploads/does-not-exist.jpg").await;
    }

    #[tokio::test]
    async fn external_urls_are_left_alone() {
        let store = temp_store();
        store.remove("https://example.com/photo.jpg").await;
        store.remove("").await;
    }

    #[tokio::test]
    async fn traversal_paths_are_refused() {
        let store = temp_store();
        store.remove("/uploads/../secrets.txt").await;
        store.remove("/uploads/a/b.jpg").await;
    }

    #[test]
    fn extension_handling() {
        assert_eq!(extension_of("photo.PNG"), Some("PNG"));
        assert_eq!(extension_of("no-extension"), None);
        assert_eq!(extension_of("weird.e%t"), None);
    }
}
