use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Extensions that mark an otherwise ambiguous string as a local path
const PATH_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff"];

/// Shape of an image reference, inferred from the string itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Local filesystem path
    FilePath,
    /// `file://` URL pointing at a local file
    FileUrl,
    /// Remote `http://` or `https://` URL
    HttpUrl,
    /// `data:image/<type>;base64,<payload>` URL
    DataUrl,
    /// Bare base64 payload with no type information
    RawBase64,
}

impl ImageKind {
    /// Classify a reference
    ///
    /// Rules are evaluated in a fixed order and the first match wins.
    /// Strings matching no structural rule fall back to `RawBase64`.
    pub fn classify(reference: &str) -> Self {
        if is_http_url(reference) {
            Self::HttpUrl
        } else if reference.starts_with("file://") {
            Self::FileUrl
        } else if reference.starts_with("data:image/") && reference.contains("base64") {
            Self::DataUrl
        } else if base64_alphabet().is_match(reference) {
            Self::RawBase64
        } else if looks_like_path(reference) {
            Self::FilePath
        } else {
            Self::RawBase64
        }
    }

    /// Stable lowercase name used in logs
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FilePath => "file_path",
            Self::FileUrl => "file_url",
            Self::HttpUrl => "http_url",
            Self::DataUrl => "data_url",
            Self::RawBase64 => "raw_base64",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_http_url(reference: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| reference.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

fn looks_like_path(reference: &str) -> bool {
    if reference.starts_with('/') || reference.starts_with("./") || reference.starts_with("../") {
        return true;
    }

    if windows_path().is_match(reference) {
        return true;
    }

    reference
        .rsplit_once('.')
        .is_some_and(|(_, suffix)| PATH_EXTENSIONS.contains(&suffix.to_ascii_lowercase().as_str()))
}

fn base64_alphabet() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9+/=]+$").expect("must be valid regex"))
}

/// Drive-letter (`C:\`, `C:/`) or UNC (`\\server`) prefix
fn windows_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[A-Za-z]:[\\/]|\\\\)").expect("must be valid regex"))
}
