use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while normalizing an image reference
#[derive(Debug, Error)]
pub enum ImageError {
    /// Reference is missing, empty, or too long to be considered
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Remote URL does not have a `scheme://host/path` shape
    #[error("invalid image URL format: {url}")]
    InvalidFormat { url: String },

    /// Local file does not exist
    #[error("image file not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Local file exists but could not be read
    #[error("failed to read image file {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// MIME type is outside the supported set
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    /// Image bytes exceed the size ceiling
    #[error("image size {size} bytes exceeds the {limit} byte limit")]
    SizeExceeded { size: u64, limit: u64 },

    /// Payload is not syntactically valid base64
    #[error("invalid base64 encoding: {0}")]
    InvalidEncoding(String),

    /// Remote image could not be fetched
    #[error("failed to download image: {0}")]
    DownloadFailed(String),
}
