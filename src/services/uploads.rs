use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please upload a file")]
    MissingFile,

    #[error("Please upload an image file")]
    NotAnImage,

    #[error("Please upload an image less than {0} bytes")]
    TooLarge(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An uploaded multipart part, already read into memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

pub fn check_photo(file: &UploadedFile, config: &UploadConfig) -> Result<(), UploadError> {
    let is_image = file
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"));
    if !is_image {
        return Err(UploadError::NotAnImage);
    }
    if file.bytes.len() > config.max_file_upload {
        return Err(UploadError::TooLarge(config.max_file_upload));
    }
    Ok(())
}

/// `photo_<id><ext>`, extension taken from the client's file name.
pub fn photo_file_name(bootcamp_id: Uuid, original: Option<&str>) -> String {
    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();
    format!("photo_{bootcamp_id}{ext}")
}

/// Validates and writes the photo, returning the stored file name.
pub async fn save_photo(
    config: &UploadConfig,
    bootcamp_id: Uuid,
    file: &UploadedFile,
) -> Result<String, UploadError> {
    check_photo(file, config)?;
    let name = photo_file_name(bootcamp_id, file.file_name.as_deref());
    tokio::fs::create_dir_all(&config.upload_path).await?;
    tokio::fs::write(config.upload_path.join(&name), &file.bytes).await?;
    tracing::info!(bootcamp = %bootcamp_id, file = %name, bytes = file.bytes.len(), "stored bootcamp photo");
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path) -> UploadConfig {
        UploadConfig { max_file_upload: 16, upload_path: dir.to_path_buf() }
    }

    fn image(bytes: usize) -> UploadedFile {
        UploadedFile {
            file_name: Some("campus.JPG".into()),
            content_type: Some("image/jpeg".into()),
            bytes: vec![0u8; bytes],
        }
    }

    #[test]
    fn file_name_keeps_extension() {
        let id = Uuid::nil();
        assert_eq!(photo_file_name(id, Some("me.png")), format!("photo_{id}.png"));
        assert_eq!(photo_file_name(id, Some("noext")), format!("photo_{id}"));
        assert_eq!(photo_file_name(id, None), format!("photo_{id}"));
    }

    #[tokio::test]
    async fn rejects_non_images_and_oversize() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());

        let mut text = image(4);
        text.content_type = Some("text/plain".into());
        assert!(matches!(save_photo(&config, Uuid::new_v4(), &text).await, Err(UploadError::NotAnImage)));
        assert!(matches!(
            save_photo(&config, Uuid::new_v4(), &image(17)).await,
            Err(UploadError::TooLarge(16))
        ));
    }

    #[tokio::test]
    async fn writes_into_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let id = Uuid::new_v4();
        let name = save_photo(&config, id, &image(8)).await.unwrap();
        assert_eq!(name, format!("photo_{id}.jpg"));
        assert_eq!(std::fs::read(dir.path().join(&name)).unwrap().len(), 8);
    }
}
