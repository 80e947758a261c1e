//! Binary-as-URI handling and local photo preparation
//!
//! Every binary payload crossing the gateway boundary travels as a
//! `data:<mime>;base64,<payload>` URI; this module owns that representation
//! and the pre-upload processing of user photos.

use crate::{Error, Result};
use base64::Engine as _;
use image::imageops::FilterType;
use image::ImageFormat;
use std::fmt;
use std::io::Cursor;

/// Longest edge a prepared photo is allowed to keep, in pixels.
const MAX_PHOTO_EDGE: u32 = 1024;

/// A typed `data:` URI carrying a base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: String,
    data: String,
}

impl DataUri {
    /// Encode raw bytes under the given mime type.
    pub fn encode(mime: &str, bytes: &[u8]) -> Self {
        Self {
            mime: mime.to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Wrap an already-base64 payload, validating that it decodes.
    pub fn from_base64(mime: &str, data: &str) -> Result<Self> {
        if mime.is_empty() {
            return Err(Error::Media("data URI is missing a mime type".to_string()));
        }
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| Error::Media(format!("invalid base64 payload: {}", e)))?;
        Ok(Self {
            mime: mime.to_string(),
            data: data.to_string(),
        })
    }

    /// Parse a `data:<mime>;base64,<payload>` string.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| Error::Media(format!("not a data URI: {:.32}", uri)))?;
        let (mime, data) = rest
            .split_once(";base64,")
            .ok_or_else(|| Error::Media("data URI is missing a base64 payload".to_string()))?;
        Self::from_base64(mime, data)
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| Error::Media(format!("invalid base64 payload: {}", e)))
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn base64_data(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.data)
    }
}

fn prepare_photo_sync(bytes: &[u8]) -> Result<DataUri> {
    let img = image::load_from_memory(bytes)?;

    let img = if img.width() > MAX_PHOTO_EDGE || img.height() > MAX_PHOTO_EDGE {
        img.resize(MAX_PHOTO_EDGE, MAX_PHOTO_EDGE, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG cannot carry an alpha channel; flatten before encoding.
    let rgb = image::DynamicImage::ImageRgb8(img.to_rgb8());
    let mut encoded = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)?;

    Ok(DataUri::encode("image/jpeg", &encoded))
}

/// Decode an uploaded or captured photo, downscale it to fit
/// [`MAX_PHOTO_EDGE`], and re-encode it as a JPEG data URI.
pub async fn prepare_photo(bytes: Vec<u8>) -> Result<DataUri> {
    tokio::task::spawn_blocking(move || prepare_photo_sync(&bytes))
        .await
        .map_err(|e| Error::Invariant(format!("photo preparation task join error: {}", e)))?
}
