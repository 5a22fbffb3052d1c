//! Module errors

use thiserror::Error;

/// Represents the different types of errors that can occur while uploading a session.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The directory does not exist, is not a directory or has no usable name.
    #[error("Invalid session directory: {0}")]
    InvalidPath(String),

    /// The HTTP client could not be built.
    #[error("Client build error: {0}")]
    ClientBuild(String),

    /// Object keys whose upload failed. The other files were uploaded.
    #[error("Upload failed for {}", .0.join(", "))]
    Upload(Vec<String>),
}
