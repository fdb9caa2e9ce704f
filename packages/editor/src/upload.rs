//! # Uploads
//!
//! The editor never talks to storage itself. An [`Uploader`] turns a file
//! into a URL, and the helpers here turn that result into the follow-up
//! action the host dispatches once the future resolves.
//!
//! A follow-up whose image node was deleted in the meantime is an ordinary
//! `NotFound` and is ignored by dispatch.

use crate::actions::Action;
use std::future::Future;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Upload failed: {0}")]
    Transport(String),
}

/// Storage collaborator supplied by the host.
pub trait Uploader {
    fn upload_image(&self, file: &UploadFile) -> impl Future<Output = Result<String, UploadError>>;

    fn upload_cover_image(
        &self,
        file: &UploadFile,
    ) -> impl Future<Output = Result<String, UploadError>>;
}

/// Upload an image for the placeholder `node_id`.
pub async fn upload_image<U: Uploader>(uploader: &U, file: &UploadFile, node_id: &str) -> Action {
    let result = if file.is_image() {
        uploader.upload_image(file).await
    } else {
        Err(UploadError::UnsupportedType(file.mime_type.clone()))
    };

    match result {
        Ok(src) => {
            info!(node_id, %src, "image uploaded");
            Action::ImageUploaded {
                id: node_id.to_string(),
                src,
            }
        }
        Err(err) => {
            warn!(node_id, error = %err, "image upload failed");
            Action::ImageUploadFailed {
                id: node_id.to_string(),
            }
        }
    }
}

pub async fn upload_cover_image<U: Uploader>(uploader: &U, file: &UploadFile) -> Action {
    let result = if file.is_image() {
        uploader.upload_cover_image(file).await
    } else {
        Err(UploadError::UnsupportedType(file.mime_type.clone()))
    };

    match result {
        Ok(src) => {
            info!(%src, "cover image uploaded");
            Action::SetCoverImage { src: Some(src) }
        }
        Err(err) => {
            warn!(error = %err, "cover image upload failed");
            Action::CoverUploadFailed
        }
    }
}
