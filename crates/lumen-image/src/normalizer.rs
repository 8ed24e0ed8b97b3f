use std::fmt::Display;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::{Stream, StreamExt};
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::ImageError;
use crate::kind::ImageKind;
use crate::mime::ImageMime;

/// Ceiling on decoded image bytes (10 MiB)
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Ceiling on the literal reference string (200 KiB)
pub const MAX_REFERENCE_LEN: usize = 200 * 1024;

/// Per-download time bound
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Redirect hops followed before a download is abandoned
const MAX_REDIRECTS: usize = 5;

/// Canonical form of an image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    /// Supported MIME type of the payload
    pub mime_type: ImageMime,
    /// Decoded size in bytes (estimated for base64 inputs)
    pub byte_size: u64,
}

impl NormalizedImage {
    fn from_bytes(mime_type: ImageMime, bytes: &[u8]) -> Self {
        Self {
            data_url: format!("data:{mime_type};base64,{}", BASE64.encode(bytes)),
            mime_type,
            byte_size: bytes.len() as u64,
        }
    }

    fn from_payload(mime_type: ImageMime, payload: &str, byte_size: u64) -> Self {
        Self {
            data_url: format!("data:{mime_type};base64,{payload}"),
            mime_type,
            byte_size,
        }
    }
}

/// Fast-fail screen run before any kind-specific processing
///
/// Bounds the literal reference string only; the decoded byte ceiling
/// is enforced later, per kind.
pub fn validate_image_input(reference: &str) -> Result<(), ImageError> {
    if reference.trim().is_empty() {
        return Err(ImageError::InvalidInput("image reference must not be empty".to_owned()));
    }

    if reference.len() > MAX_REFERENCE_LEN {
        return Err(ImageError::InvalidInput(format!(
            "image reference is {} bytes, exceeding the {MAX_REFERENCE_LEN} byte limit",
            reference.len()
        )));
    }

    Ok(())
}

/// Turns image references into base64 data URLs
#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    http: Client,
    max_bytes: u64,
}

impl ImageNormalizer {
    /// Create a normalizer with its own download client
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            http,
            max_bytes: MAX_IMAGE_BYTES,
        })
    }

    /// Normalize one reference into a data URL
    pub async fn normalize(&self, reference: &str) -> Result<NormalizedImage, ImageError> {
        validate_image_input(reference)?;

        let kind = ImageKind::classify(reference);
        tracing::debug!(%kind, len = reference.len(), "normalizing image reference");

        let image = match kind {
            ImageKind::HttpUrl => self.download(reference).await?,
            ImageKind::FileUrl => self.read_file(&file_url_path(reference)).await?,
            ImageKind::FilePath => self.read_file(Path::new(reference)).await?,
            ImageKind::DataUrl => self.decode_data_url(reference)?,
            ImageKind::RawBase64 => self.decode_base64(ImageMime::Jpeg, reference)?,
        };

        tracing::debug!(%kind, mime = %image.mime_type, bytes = image.byte_size, "image normalized");
        Ok(image)
    }

    async fn read_file(&self, path: &Path) -> Result<NormalizedImage, ImageError> {
        let path = std::path::absolute(path).map_err(|source| ImageError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ImageError::NotFound { path }),
            Err(source) => return Err(ImageError::ReadFailed { path, source }),
        };
        self.check_size(metadata.len())?;

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| ImageError::ReadFailed {
                path: path.clone(),
                source,
            })?;
        self.check_size(bytes.len() as u64)?;

        let mime_type = ImageMime::from_path(&path).ok_or_else(|| {
            let found = path
                .extension()
                .map_or_else(|| "file without extension".to_owned(), |ext| {
                    format!("file extension .{}", ext.to_string_lossy())
                });
            ImageError::UnsupportedType(found)
        })?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read local image");
        Ok(NormalizedImage::from_bytes(mime_type, &bytes))
    }

    async fn download(&self, reference: &str) -> Result<NormalizedImage, ImageError> {
        let url = parse_image_url(reference)?;

        tracing::debug!(%url, "downloading image");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ImageError::DownloadFailed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ImageError::DownloadFailed(format!("{url} returned {status}")));
        }

        if let Some(advertised) = response.content_length() {
            self.check_size(advertised)?;
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let bytes = self.read_capped(response.bytes_stream()).await?;

        let mime_type = match content_type {
            Some(declared) => ImageMime::from_mime_type(&declared).ok_or(ImageError::UnsupportedType(declared))?,
            None => mime_from_url_path(&url).unwrap_or(ImageMime::Jpeg),
        };

        Ok(NormalizedImage::from_bytes(mime_type, &bytes))
    }

    /// Collect a body, failing as soon as the running total passes the ceiling
    async fn read_capped<S, B, E>(&self, body: S) -> Result<Vec<u8>, ImageError>
    where
        S: Stream<Item = Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        futures_util::pin_mut!(body);

        let mut bytes = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| ImageError::DownloadFailed(e.to_string()))?;
            let chunk = chunk.as_ref();

            self.check_size((bytes.len() + chunk.len()) as u64)?;
            bytes.extend_from_slice(chunk);
        }

        Ok(bytes)
    }

    fn decode_data_url(&self, reference: &str) -> Result<NormalizedImage, ImageError> {
        let Some(captures) = data_url_header().captures(reference) else {
            // No parseable header: treat whatever follows the first comma as the payload
            let payload = reference.split_once(',').map_or(reference, |(_, payload)| payload);
            return self.decode_base64(ImageMime::Jpeg, payload);
        };

        let declared = &captures[1];
        let mime_type =
            ImageMime::from_mime_type(declared).ok_or_else(|| ImageError::UnsupportedType(declared.to_owned()))?;

        let payload = captures.get(2).map_or("", |m| m.as_str());
        self.decode_base64(mime_type, payload)
    }

    /// Validate a base64 payload without decoding it
    fn decode_base64(&self, mime_type: ImageMime, payload: &str) -> Result<NormalizedImage, ImageError> {
        let estimated = payload.len() as u64 * 3 / 4;
        self.check_size(estimated)?;

        if !base64_payload().is_match(payload) {
            return Err(ImageError::InvalidEncoding(
                "payload contains characters outside the base64 alphabet".to_owned(),
            ));
        }

        Ok(NormalizedImage::from_payload(mime_type, payload, estimated))
    }

    fn check_size(&self, size: u64) -> Result<(), ImageError> {
        if size > self.max_bytes {
            return Err(ImageError::SizeExceeded {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Require `scheme://host/path` with at least one non-empty path segment
fn parse_image_url(reference: &str) -> Result<Url, ImageError> {
    let invalid = || ImageError::InvalidFormat {
        url: reference.to_owned(),
    };

    let url = Url::parse(reference).map_err(|_| invalid())?;

    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    let has_path = url
        .path_segments()
        .is_some_and(|mut segments| segments.any(|segment| !segment.is_empty()));

    if matches!(url.scheme(), "http" | "https") && has_host && has_path {
        Ok(url)
    } else {
        Err(invalid())
    }
}

fn mime_from_url_path(url: &Url) -> Option<ImageMime> {
    ImageMime::from_path(Path::new(url.path()))
}

/// Resolve a `file://` URL, falling back to the raw remainder when it is not a valid URL
fn file_url_path(reference: &str) -> PathBuf {
    Url::parse(reference)
        .ok()
        .and_then(|url| url.to_file_path().ok())
        .unwrap_or_else(|| PathBuf::from(reference.strip_prefix("file://").unwrap_or(reference)))
}

fn data_url_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^data:([^;,]+);base64,(.*)$").expect("must be valid regex"))
}

fn base64_payload() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9+/]+={0,2}$").expect("must be valid regex"))
}
