use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::HeaderVec;
use crate::static_files::content_type;

/// Response sink handed to middleware and handlers.
///
/// Starts as an empty `200`; handlers overwrite status, headers and body
/// through the helpers below. The transport writes it out afterwards.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Response body
    pub body: Vec<u8>,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON error response `{"error": message}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        let mut res = Self::default();
        res.json_error(status, message);
        res
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    /// Plain-text body
    pub fn text(&mut self, status: u16, body: &str) {
        self.status = status;
        self.set_header("content-type", "text/plain; charset=utf-8");
        self.body = body.as_bytes().to_vec();
    }

    /// Serialize `data` as the JSON body.
    ///
    /// An encoding failure turns the response into a `500` with a fixed
    /// JSON error body instead.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, data: &T) {
        match serde_json::to_vec(data) {
            Ok(bytes) => {
                self.status = status;
                self.set_header("content-type", "application/json");
                self.body = bytes;
            }
            Err(e) => {
                warn!(error = %e, "Failed to encode JSON response");
                self.status = 500;
                self.set_header("content-type", "application/json");
                self.body = br#"{"error":"Failed to encode JSON"}"#.to_vec();
            }
        }
    }

    /// JSON error body `{"error": message}`
    pub fn json_error(&mut self, status: u16, message: &str) {
        self.json(status, &serde_json::json!({ "error": message }));
    }

    /// Stream a file as the body, with a content type guessed from its
    /// extension. I/O failures become a `500` JSON error.
    pub fn send_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => {
                self.status = 200;
                self.set_header("content-type", content_type(path));
                self.body = bytes;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to send file");
                self.json_error(500, &e.to_string());
            }
        }
    }

    /// Send a file as an attachment named `name`
    pub fn download(&mut self, path: impl AsRef<Path>, name: &str) {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => {
                self.status = 200;
                self.set_header(
                    "content-disposition",
                    format!("attachment; filename=\"{}\"", name.replace('"', "")),
                );
                self.set_header("content-type", "application/octet-stream");
                self.body = bytes;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to send download");
                self.json_error(500, &e.to_string());
            }
        }
    }

    /// Body as UTF-8 text, if it is valid UTF-8
    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Body decoded as JSON
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
