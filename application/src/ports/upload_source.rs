//! Upload source port
//!
//! Defines how the application obtains upload candidates from paths the
//! user named, without knowing about the file system.

use ragchat_domain::UploadFile;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct UploadSourceError(pub String);

/// Source of files to upload
///
/// Implementations live in the infrastructure layer.
pub trait UploadSource: Send + Sync {
    /// Resolve `paths` into upload candidates, in a deterministic order
    fn collect(&self, paths: &[PathBuf]) -> Result<Vec<UploadFile>, UploadSourceError>;
}
