//! Media Staging
//!
//! Converts a raw user-selected file into two independent artifacts: a preview
//! handle for immediate display, and an encoded payload for the generation
//! gateway. Either can fail without affecting the other.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::StagingError;

/// Default inline payload limit (20 MiB)
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 20 * 1024 * 1024;

const FALLBACK_MIME: &str = "application/octet-stream";

/// A raw file chosen by the user
#[derive(Clone, Debug)]
pub struct MediaFile {
    /// Display name (usually the file name)
    pub name: String,
    /// File content
    pub bytes: Vec<u8>,
    /// MIME type declared by whoever supplied the file, if any
    pub declared_mime: Option<String>,
}

impl MediaFile {
    /// Wrap in-memory content
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            declared_mime: None,
        }
    }

    /// Set the declared MIME type
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime = Some(mime.into());
        self
    }

    /// Read a file from disk
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StagingError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(name, bytes))
    }

    /// Resolve the MIME type: declared, then sniffed, then by extension
    #[must_use]
    pub fn mime_type(&self) -> String {
        if let Some(declared) = self.declared_mime.as_deref().filter(|m| !m.is_empty()) {
            return declared.to_string();
        }
        if let Some(kind) = infer::get(&self.bytes) {
            return kind.mime_type().to_string();
        }
        mime_from_extension(&self.name)
            .unwrap_or(FALLBACK_MIME)
            .to_string()
    }
}

fn mime_from_extension(name: &str) -> Option<&'static str> {
    let (_, ext) = name.rsplit_once('.')?;
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Displayable handle for a staged file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// Display name
    pub name: String,
    /// Resolved MIME type
    pub mime_type: String,
    /// Size of the original file
    pub size_bytes: usize,
    /// `data:` URL carrying the content
    pub data_url: String,
}

/// Transport-ready image payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedPayload {
    /// MIME type
    pub mime_type: String,
    /// Base64 content
    pub data: String,
}

/// Both staging artifacts; each is present only if its own step succeeded
#[derive(Clone, Debug, Default)]
pub struct StagedMedia {
    /// Preview handle
    pub preview: Option<Preview>,
    /// Gateway payload
    pub payload: Option<EncodedPayload>,
}

/// Produces previews and payloads under a payload size limit
#[derive(Clone, Copy, Debug)]
pub struct MediaStager {
    max_payload_bytes: usize,
}

impl Default for MediaStager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_BYTES)
    }
}

impl MediaStager {
    /// Create a stager with the given payload limit
    #[must_use]
    pub fn new(max_payload_bytes: usize) -> Self {
        Self { max_payload_bytes }
    }

    /// Build a preview handle
    pub fn preview(&self, file: &MediaFile) -> Result<Preview, StagingError> {
        if file.bytes.is_empty() {
            return Err(StagingError::Empty);
        }
        let mime_type = file.mime_type();
        if !mime_type.starts_with("image/") {
            return Err(StagingError::NotAnImage { mime: mime_type });
        }
        let data_url = format!("data:{mime_type};base64,{}", BASE64.encode(&file.bytes));
        Ok(Preview {
            name: file.name.clone(),
            mime_type,
            size_bytes: file.bytes.len(),
            data_url,
        })
    }

    /// Encode the file for the gateway
    pub fn encode(&self, file: &MediaFile) -> Result<EncodedPayload, StagingError> {
        if file.bytes.is_empty() {
            return Err(StagingError::Empty);
        }
        if file.bytes.len() > self.max_payload_bytes {
            return Err(StagingError::TooLarge {
                size: file.bytes.len(),
                limit: self.max_payload_bytes,
            });
        }
        Ok(EncodedPayload {
            mime_type: file.mime_type(),
            data: BASE64.encode(&file.bytes),
        })
    }

    /// Run both steps independently, logging whichever fails
    #[must_use]
    pub fn stage(&self, file: &MediaFile) -> StagedMedia {
        let preview = self
            .preview(file)
            .inspect_err(|e| tracing::warn!(file = %file.name, error = %e, "preview failed"))
            .ok();
        let payload = self
            .encode(file)
            .inspect_err(|e| tracing::warn!(file = %file.name, error = %e, "encoding failed"))
            .ok();
        StagedMedia { preview, payload }
    }
}
