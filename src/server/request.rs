use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use http::Method;
use may_minihttp::Request;
use tracing::debug;

use crate::dispatcher::HandlerRequest;
use crate::ids::RequestId;
use crate::router::ParamVec;

/// Header carrying a caller-supplied request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Failure turning a wire request into a [`HandlerRequest`]
#[derive(Debug)]
pub enum RequestError {
    /// The method token is not a valid HTTP method
    InvalidMethod(String),
    /// The body could not be read from the connection
    Body(io::Error),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidMethod(m) => write!(f, "invalid HTTP method: {m:?}"),
            RequestError::Body(e) => write!(f, "failed to read request body: {e}"),
        }
    }
}

impl std::error::Error for RequestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RequestError::Body(e) => Some(e),
            RequestError::InvalidMethod(_) => None,
        }
    }
}

/// Parse the query string of `path` (everything after the first `?`).
///
/// Names and values are form-url-decoded; repeated names are all kept in
/// order, so lookups that scan from the back see the last occurrence.
pub fn parse_query_params(path: &str) -> ParamVec {
    match path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::from(&*k), v.into_owned()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Convert a `may_minihttp` request into a [`HandlerRequest`].
///
/// Header names are lowercased. The request id is taken from
/// `x-request-id` when it holds a valid ULID, otherwise a new one is
/// generated. The body is read last since it consumes the request.
pub fn parse_request(req: Request) -> Result<HandlerRequest, RequestError> {
    let method = Method::from_bytes(req.method().as_bytes())
        .map_err(|_| RequestError::InvalidMethod(req.method().to_string()))?;
    let mut parsed = HandlerRequest::new(method, req.path());

    for header in req.headers() {
        parsed = parsed.with_header(header.name, &String::from_utf8_lossy(header.value));
    }
    parsed.request_id = RequestId::from_header_or_new(parsed.get_header(REQUEST_ID_HEADER));

    debug!(
        request_id = %parsed.request_id,
        header_count = parsed.headers.len(),
        query_count = parsed.query_params.len(),
        "Headers extracted"
    );

    let mut body = Vec::new();
    req.body().read_to_end(&mut body).map_err(RequestError::Body)?;
    if !body.is_empty() {
        debug!(
            request_id = %parsed.request_id,
            content_type = parsed.get_header("content-type").unwrap_or(""),
            body_size_bytes = body.len(),
            "Request body read"
        );
    }
    parsed.body = body;
    Ok(parsed)
}
