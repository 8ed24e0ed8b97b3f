//! Image input normalization
//!
//! Accepts a single image reference string (local path, `file://` URL,
//! `http(s)://` URL, data URL, or bare base64) and turns it into a
//! canonical `data:<mime>;base64,<payload>` URL

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod kind;
mod mime;
mod normalizer;

pub use error::ImageError;
pub use kind::ImageKind;
pub use mime::ImageMime;
pub use normalizer::{ImageNormalizer, MAX_IMAGE_BYTES, MAX_REFERENCE_LEN, NormalizedImage, validate_image_input};
