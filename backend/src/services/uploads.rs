//! Completion image storage
//!
//! Images are written to the configured directory under generated names and
//! referenced by their public URL path.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::UploadsConfig;
use crate::error::{AppError, AppResult};

/// An image received in a request, not yet written
#[derive(Debug, Clone)]
pub struct IncomingImage {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// An image written to disk
#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub path: PathBuf,
    /// Public reference recorded on the booking
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    public_path: String,
    max_images: usize,
    max_image_bytes: usize,
}

impl UploadStore {
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            public_path: config.public_path.trim_end_matches('/').to_string(),
            max_images: config.max_images,
            max_image_bytes: config.max_image_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Request body limit for a completion upload
    pub fn body_limit(&self) -> usize {
        self.max_images * self.max_image_bytes + 64 * 1024
    }

    pub async fn ensure_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::StorageError(format!("{}: {}", self.dir.display(), e)))
    }

    /// Check count, type and size of a batch before anything is written
    pub fn validate(&self, images: &[IncomingImage]) -> AppResult<()> {
        let mut errors = Vec::new();
        if images.len() > self.max_images {
            errors.push(format!("At most {} images can be uploaded", self.max_images));
        }
        for image in images {
            let name = image.file_name.as_deref().unwrap_or("image");
            if !image.content_type.starts_with("image/") {
                errors.push(format!("{name}: only image files are allowed"));
            } else if image.bytes.len() > self.max_image_bytes {
                errors.push(format!(
                    "{name}: image must be at most {} MB",
                    self.max_image_bytes / (1024 * 1024)
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationErrors(errors))
        }
    }

    /// Write a validated batch; on failure nothing from the batch is left behind
    pub async fn store_all(
        &self,
        booking_id: Uuid,
        images: Vec<IncomingImage>,
    ) -> AppResult<Vec<StoredImage>> {
        let mut stored = Vec::with_capacity(images.len());
        for image in images {
            match self.store(booking_id, image).await {
                Ok(file) => stored.push(file),
                Err(e) => {
                    self.remove_all(&stored).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    async fn store(&self, booking_id: Uuid, image: IncomingImage) -> AppResult<StoredImage> {
        let file_name = format!(
            "booking-{}-{}.{}",
            booking_id,
            Uuid::new_v4().simple(),
            extension(&image)
        );
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|e| AppError::StorageError(format!("{}: {}", path.display(), e)))?;

        Ok(StoredImage {
            path,
            reference: format!("{}/{}", self.public_path, file_name),
        })
    }

    /// Best-effort removal
    pub async fn remove_all(&self, images: &[StoredImage]) {
        for image in images {
            if let Err(e) = tokio::fs::remove_file(&image.path).await {
                tracing::warn!(path = %image.path.display(), error = %e, "Failed to remove upload");
            }
        }
    }
}

fn extension(image: &IncomingImage) -> String {
    let from_type = match image.content_type.as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    };
    if let Some(ext) = from_type {
        return ext.to_string();
    }

    image
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "img".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> UploadStore {
        UploadStore::new(&UploadsConfig {
            dir: dir.to_string_lossy().into_owned(),
            public_path: "/uploads/".to_string(),
            max_images: 2,
            max_image_bytes: 16,
        })
    }

    fn image(content_type: &str, len: usize) -> IncomingImage {
        IncomingImage {
            file_name: Some("photo.JPG".to_string()),
            content_type: content_type.to_string(),
            bytes: vec![0u8; len],
        }
    }

    #[test]
    fn test_validate_rejects_type_size_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = store(dir.path());

        assert!(uploads.validate(&[image("image/png", 16)]).is_ok());
        match uploads
            .validate(&[image("text/plain", 1), image("image/png", 17), image("image/png", 1)])
            .unwrap_err()
        {
            AppError::ValidationErrors(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_store_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = store(dir.path());
        let booking_id = Uuid::new_v4();

        let stored = uploads
            .store_all(booking_id, vec![image("image/jpeg", 4), image("application/x-unknown", 4)])
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].reference.starts_with(&format!("/uploads/booking-{booking_id}-")));
        assert!(stored[0].reference.ends_with(".jpg"));
        assert!(stored[1].reference.ends_with(".jpg"));
        assert!(stored.iter().all(|s| s.path.exists()));

        uploads.remove_all(&stored).await;
        assert!(stored.iter().all(|s| !s.path.exists()));
    }
}
