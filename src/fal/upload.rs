use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::client::FileStore;
use super::content_type::detect_content_type;
use super::error::{Result, UploadError};
use crate::config::{Config, FAL_KEY_VAR};

/// Largest file accepted for upload (100 MiB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// A validated file, read into memory and ready to send
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub data: Vec<u8>,
    pub content_type: &'static str,
}

impl UploadRequest {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Validate the credential and the file, then read it into an [`UploadRequest`]
///
/// Checks run in order: credential, existence, size, read. A failing check
/// stops the workflow before the next one touches the file system.
pub async fn prepare(config: &Config, path: &Path) -> Result<UploadRequest> {
    if config.fal_key.is_empty() {
        return Err(UploadError::MissingCredential {
            var: FAL_KEY_VAR.to_string(),
        });
    }

    let shown = path.display().to_string();

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| UploadError::from_io_error(e, &shown))?;

    if !metadata.is_file() {
        return Err(UploadError::FileNotFound { path: shown });
    }

    let size = metadata.len();
    if size > MAX_FILE_SIZE {
        return Err(UploadError::FileTooLarge {
            size,
            max: MAX_FILE_SIZE,
        });
    }

    let data = tokio::fs::read(path)
        .await
        .map_err(|e| UploadError::from_io_error(e, &shown))?;

    // The file may have grown between stat and read
    if data.len() as u64 > MAX_FILE_SIZE {
        return Err(UploadError::FileTooLarge {
            size: data.len() as u64,
            max: MAX_FILE_SIZE,
        });
    }

    let content_type = detect_content_type(path);
    debug!("Prepared {} ({} bytes, {})", shown, data.len(), content_type);

    Ok(UploadRequest {
        path: path.to_path_buf(),
        data,
        content_type,
    })
}

/// Hand a prepared request to the store exactly once
pub async fn send<S: FileStore>(store: &S, request: UploadRequest) -> Result<String> {
    let name = request.file_name();

    match store.upload(request.data, request.content_type).await {
        Ok(url) => {
            info!("Uploaded {} to {}", name, url);
            Ok(url)
        }
        Err(e) => {
            error!("Upload failed for {}: {:#}", name, e);
            Err(UploadError::UploadFailed(format!("{:#}", e)))
        }
    }
}

/// Run the whole workflow: validate, read, upload
pub async fn upload_image<S: FileStore>(config: &Config, store: &S, path: &Path) -> Result<String> {
    let request = prepare(config, path).await?;
    info!(
        "Uploading image: {} ({} bytes)",
        request.file_name(),
        request.size()
    );
    send(store, request).await
}
