use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::http::error::TransportError;

// ============================================================================
// File references
// ============================================================================

/// A file picked by the user, shared by reference between the file input,
/// its preview and the multipart body. Cloning never copies the bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRef {
    pub name: String,
    pub mime: String,
    bytes: Arc<[u8]>,
}

impl FileRef {
    pub fn new(name: &str, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.to_string(),
            mime: guess_mime(name).to_string(),
            bytes: bytes.into(),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(&name, bytes))
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// True when both references point at the same underlying buffer.
    pub fn same_source(&self, other: &FileRef) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    /// Content fingerprint, used in submission traces.
    pub fn digest(&self) -> String {
        use sha1::{Digest, Sha1};

        let mut hasher = Sha1::new();
        hasher.update(&self.bytes[..]);
        format!("{:x}", hasher.finalize())
    }
}

pub fn guess_mime(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Request model
// ============================================================================

/// Multipart body: ordered text fields plus named file parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, FileRef)>,
}

impl FormPayload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn file(&self, name: &str) -> Option<&FileRef> {
        self.files.iter().find(|(k, _)| k == name).map(|(_, f)| f)
    }

    pub fn total_file_bytes(&self) -> u64 {
        self.files.iter().map(|(_, f)| f.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Plain GET
    Empty,
    Json(Value),
    Multipart(FormPayload),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub endpoint: String,
    pub body: RequestBody,
}

impl Request {
    pub fn get(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            body: RequestBody::Empty,
        }
    }

    /// JSON POST.
    pub fn json<T: Serialize>(endpoint: &str, payload: &T) -> Result<Self, TransportError> {
        let body = serde_json::to_value(payload)
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            body: RequestBody::Json(body),
        })
    }

    pub fn multipart(endpoint: &str, form: FormPayload) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            body: RequestBody::Multipart(form),
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }
}
