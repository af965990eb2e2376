//! Product image files on local disk, one folder per product.

use crate::errors::ServiceError;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Lowercased extension of `filename` when it is an accepted image type.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// `<slug>_<id>`
pub fn product_folder(slug: &str, product_id: i32) -> String {
    format!("{}_{}", slug, product_id)
}

/// Accepts bare base64 or a `data:<mime>;base64,` URL.
pub fn decode_payload(data: &str) -> Result<Vec<u8>, ServiceError> {
    let encoded = match data.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| ServiceError::ValidationError(format!("Image is not valid base64: {}", e)))
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a stored relative name. Names that would escape the root are refused.
    pub fn path_of(&self, relative: &str) -> Result<PathBuf, ServiceError> {
        let rel = Path::new(relative);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(ServiceError::ValidationError(format!(
                "Invalid image path: {}",
                relative
            )));
        }
        Ok(self.root.join(rel))
    }

    /// Writes the decoded image and returns its name relative to the root,
    /// `<folder>/prod_<id>_<timestamp>.<ext>`.
    pub async fn save_base64(
        &self,
        folder: &str,
        product_id: i32,
        original_name: &str,
        data: &str,
    ) -> Result<String, ServiceError> {
        let ext = allowed_extension(original_name).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Unsupported image type; allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;
        let bytes = decode_payload(data)?;
        if bytes.is_empty() {
            return Err(ServiceError::ValidationError("Image is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(ServiceError::ValidationError(format!(
                "Image exceeds {} bytes",
                self.max_bytes
            )));
        }

        let relative = format!(
            "{}/prod_{}_{}.{}",
            folder,
            product_id,
            Utc::now().format("%Y%m%d%H%M%S%f"),
            ext
        );
        let path = self.path_of(&relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ServiceError::StorageError(format!("Cannot create image folder: {}", e))
            })?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ServiceError::StorageError(format!("Cannot write image: {}", e)))?;
        debug!(path = %path.display(), size = bytes.len(), "Image stored");
        Ok(relative)
    }

    /// Best effort; failures are logged.
    pub async fn remove_file(&self, relative: &str) {
        let path = match self.path_of(relative) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Skipping image removal");
                return;
            }
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(error = %e, path = %path.display(), "Could not remove image file");
        }
    }

    /// Best effort; a missing folder is not an error.
    pub async fn remove_folder(&self, folder: &str) {
        let path = match self.path_of(folder) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Skipping folder removal");
                return;
            }
        };
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => debug!(path = %path.display(), "Image folder removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, path = %path.display(), "Could not remove image folder"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foto.PNG", Some("png"))]
    #[case("foto.jpeg", Some("jpeg"))]
    #[case("foto.webp", Some("webp"))]
    #[case("foto.svg", None)]
    #[case("foto", None)]
    fn extensions(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(allowed_extension(name).as_deref(), expected);
    }

    #[test]
    fn data_urls_are_unwrapped() {
        let bytes = decode_payload("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        assert!(decode_payload("***").is_err());
    }

    #[test]
    fn traversal_is_refused() {
        let store = ImageStore::new("/tmp/uploads", 10);
        assert!(store.path_of("../etc/passwd").is_err());
        assert!(store.path_of("/abs").is_err());
        assert!(store.path_of("blusa_1/prod_1_x.png").is_ok());
    }

    #[tokio::test]
    async fn save_and_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 1024);

        let name = store
            .save_base64("blusa_3", 3, "foto.png", "aGVsbG8=")
            .await
            .unwrap();
        assert!(name.starts_with("blusa_3/prod_3_"));
        assert!(name.ends_with(".png"));
        assert!(dir.path().join(&name).exists());

        store.remove_folder("blusa_3").await;
        assert!(!dir.path().join("blusa_3").exists());
        // second removal is silent
        store.remove_folder("blusa_3").await;
    }

    #[tokio::test]
    async fn oversized_images_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), 2);
        let err = store
            .save_base64("x_1", 1, "a.png", "aGVsbG8=")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }
}
