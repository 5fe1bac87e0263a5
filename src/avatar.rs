//! Optional profile photo, carried around as a `data:` URL.
//!
//! The photo never leaves the process: it is read once, base64-encoded and
//! embedded into the preview markup like a browser `FileReader` would.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::Path;

use crate::{Error, Result};

/// An image the user picked for the avatar slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    mime: String,
    data_url: String,
}

impl Avatar {
    /// Read an image file; the MIME type comes from the file extension and
    /// must be `image/*`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime = mime_for_path(path).ok_or_else(|| {
            Error::InvalidAvatar(format!("{} is not an image file", path.display()))
        })?;
        let bytes = std::fs::read(path)
            .map_err(|e| Error::InvalidAvatar(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_bytes(mime, &bytes)
    }

    pub fn from_bytes(mime: &str, bytes: &[u8]) -> Result<Self> {
        if !mime.starts_with("image/") {
            return Err(Error::InvalidAvatar(format!("unsupported MIME type {}", mime)));
        }
        if bytes.is_empty() {
            return Err(Error::InvalidAvatar("empty file".into()));
        }
        let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(bytes));
        log::debug!("avatar loaded: {} ({} bytes)", mime, bytes.len());
        Ok(Self { mime: mime.to_string(), data_url })
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}
