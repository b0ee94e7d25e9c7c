use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use serde::de::DeserializeOwned;
use smallvec::SmallVec;

use crate::ids::RequestId;
use crate::router::ParamVec;
use crate::server::request::parse_query_params;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path
///
/// Header names use `Arc<str>` so that repeated names such as `content-type`
/// are cheap to clone; values are per-request data and stay `String`.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request seen by middleware and handlers.
///
/// The dispatcher fills `path_params` after a successful search. The bag is
/// owned by this request only; nothing is shared across concurrent requests.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Path parameters bound by the route tree
    pub path_params: ParamVec,
    /// Query string parameters
    pub query_params: ParamVec,
    /// HTTP headers, names lowercased
    pub headers: HeaderVec,
    /// Raw request body
    pub body: Vec<u8>,
}

impl HandlerRequest {
    /// Build a request for `method` and `path`.
    ///
    /// A query string in `path` is split off and parsed into `query_params`.
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        let (path_only, query_params) = match path.split_once('?') {
            Some((p, _)) => (p, parse_query_params(path)),
            None => (path, ParamVec::new()),
        };
        Self {
            request_id: RequestId::new(),
            method,
            path: path_only.to_string(),
            path_params: ParamVec::new(),
            query_params,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    /// Add a header (name is lowercased)
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase()), value.to_string()));
        self
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a path parameter by name.
    ///
    /// Returns `None` for a name the matched route never declared; it never
    /// falls back to an empty string.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name (last occurrence wins)
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Raw body bytes
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body as JSON
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Convert path_params to a HashMap.
    /// Note: this allocates, use get_path_param() in hot paths
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}
