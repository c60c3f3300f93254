use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use serde_json::Value;

use crate::http::error::TransportError;
use crate::http::progress::{ProgressHandle, ProgressReader};
use crate::http::request::{FormPayload, Request, RequestBody};

/// Request submission seam. Forms, loaders and assist panels only ever talk
/// to the backend through this trait.
///
/// Implementations never retry.
pub trait Transport {
    fn send(
        &self,
        request: &Request,
        progress: Option<&ProgressHandle>,
    ) -> Result<Value, TransportError>;
}

/// Decode a 2xx body. Callers only reach this after the status check, so a
/// failure here means the server answered success with something that is
/// not JSON.
pub fn parse_json_body(text: &str) -> Result<Value, TransportError> {
    serde_json::from_str(text).map_err(|e| TransportError::Malformed {
        body: text.to_string(),
        reason: e.to_string(),
    })
}

// ============================================================================
// reqwest-backed transport
// ============================================================================

pub struct HttpTransport {
    base: Url,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base = Url::parse(base_url).map_err(|e| TransportError::InvalidEndpoint {
            endpoint: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve a root-relative endpoint or asset path against the base URL.
    /// Absolute URLs pass through unchanged.
    pub fn resolve(&self, endpoint: &str) -> Result<Url, TransportError> {
        self.base
            .join(endpoint)
            .map_err(|e| TransportError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }

    /// Fetch a result asset (the `download` URL of a completion payload).
    pub fn download(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let url = self.resolve(url)?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: &Request,
        progress: Option<&ProgressHandle>,
    ) -> Result<Value, TransportError> {
        let url = self.resolve(&request.endpoint)?;

        let builder = match &request.body {
            RequestBody::Empty => {
                log::debug!("GET {}", url);
                self.client
                    .get(url)
                    .header(CONTENT_TYPE, "application/json")
                    .header(ACCEPT, "application/json")
            }
            RequestBody::Json(value) => {
                log::debug!("POST {} (json)", url);
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/json")
                    .header(ACCEPT, "application/json")
                    .body(value.to_string())
            }
            RequestBody::Multipart(payload) => {
                log::debug!(
                    "POST {} (multipart, {} fields, {} files, {} bytes)",
                    url,
                    payload.fields.len(),
                    payload.files.len(),
                    payload.total_file_bytes()
                );
                self.client
                    .post(url)
                    .header(ACCEPT, "application/json")
                    .multipart(build_form(payload, progress)?)
            }
        };

        let response = builder
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !status.is_success() {
            log::debug!("{} rejected with {}", request.endpoint, status);
            return Err(TransportError::Server {
                status: status.as_u16(),
                body: text,
            });
        }

        parse_json_body(&text)
    }
}

fn build_form(
    payload: &FormPayload,
    progress: Option<&ProgressHandle>,
) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (name, value) in &payload.fields {
        form = form.text(name.clone(), value.clone());
    }

    let total = payload.total_file_bytes();
    let sent = Arc::new(AtomicU64::new(0));

    for (name, file) in &payload.files {
        let cursor = Cursor::new(file.bytes().clone());
        let part = match progress {
            Some(handle) => Part::reader_with_length(
                ProgressReader::new(cursor, sent.clone(), total, handle.clone()),
                file.len(),
            ),
            None => Part::reader_with_length(cursor, file.len()),
        };
        let part = part
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;
        form = form.part(name.clone(), part);
    }

    Ok(form)
}
