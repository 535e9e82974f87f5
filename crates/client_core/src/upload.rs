//! Selected-file validation and data-URI encoding.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::error::{FailureClass, UserNotice};
use thiserror::Error;

use crate::UploadReader;

/// 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const FILE_TOO_LARGE_MESSAGE: &str = "File size must be less than 10MB";
pub const NOT_AN_IMAGE_MESSAGE: &str = "Please select an image file (PNG, JPG).";
pub const FILE_READ_FAILED_MESSAGE: &str = "Error reading file. Please try again.";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file is {size_bytes} bytes, limit is {limit}", limit = MAX_UPLOAD_BYTES)]
    TooLarge { size_bytes: u64 },
    #[error("unsupported mime type {mime_type}")]
    NotAnImage { mime_type: String },
    #[error("failed to read upload: {0}")]
    Read(String),
}

impl UploadError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::TooLarge { .. } => FILE_TOO_LARGE_MESSAGE,
            Self::NotAnImage { .. } => NOT_AN_IMAGE_MESSAGE,
            Self::Read(_) => FILE_READ_FAILED_MESSAGE,
        }
    }

    pub fn notice(&self) -> UserNotice {
        let class = match self {
            Self::TooLarge { .. } | Self::NotAnImage { .. } => FailureClass::Validation,
            Self::Read(_) => FailureClass::Capability,
        };
        UserNotice::new(class, self.user_message())
    }
}

/// Handle to a file the user picked, with the metadata known before reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl SelectedFile {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            mime_type: mime_type.into(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("failed to stat {}", path.display()))?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self::new(path, metadata.len(), mime_type))
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        if self.size_bytes > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                size_bytes: self.size_bytes,
            });
        }
        if !self.mime_type.starts_with("image/") {
            return Err(UploadError::NotAnImage {
                mime_type: self.mime_type.clone(),
            });
        }
        Ok(())
    }
}

/// Image payload held by the analysis view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub size_bytes: u64,
    pub mime_type: String,
    pub data_uri: String,
}

impl UploadedImage {
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            size_bytes: bytes.len() as u64,
            mime_type: mime_type.to_string(),
            data_uri: encode_data_uri(mime_type, bytes),
        }
    }
}

pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Reads uploads from the local filesystem.
pub struct FsUploadReader;

#[async_trait]
impl UploadReader for FsUploadReader {
    async fn read(&self, file: &SelectedFile) -> Result<UploadedImage> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        if bytes.len() as u64 > MAX_UPLOAD_BYTES {
            anyhow::bail!(
                "{} grew to {} bytes after selection",
                file.path.display(),
                bytes.len()
            );
        }
        Ok(UploadedImage::from_bytes(&file.mime_type, &bytes))
    }
}
