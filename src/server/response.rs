use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use may_minihttp::Response;
use once_cell::sync::Lazy;
use tracing::warn;

use crate::dispatcher::HandlerResponse;

/// Upper bound on distinct header lines kept for the process lifetime
pub const MAX_INTERNED_HEADER_LINES: usize = 1024;

/// `may_minihttp` only accepts `&'static str` header lines; dynamic lines
/// are leaked once and reused.
static HEADER_LINES: Lazy<DashMap<String, &'static str>> = Lazy::new(DashMap::new);
static TABLE_FULL_LOGGED: AtomicBool = AtomicBool::new(false);

/// Canonical reason phrase for `status`
pub fn status_reason(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => match status / 100 {
            1 => "Informational",
            2 => "OK",
            3 => "Redirection",
            4 => "Client Error",
            _ => "Server Error",
        },
    }
}

/// Static `Name: value` line for a response header.
///
/// Returns `None` for names or values that would break the header block.
/// Lines are interned up to [`MAX_INTERNED_HEADER_LINES`]; past that, new
/// lines are leaked per response instead of cached.
pub fn header_line(name: &str, value: &str) -> Option<&'static str> {
    if name.contains(['\r', '\n', ':']) || value.contains(['\r', '\n']) {
        warn!(header = %name, "Dropping header with invalid characters");
        return None;
    }
    Some(intern_line(
        &HEADER_LINES,
        MAX_INTERNED_HEADER_LINES,
        format!("{name}: {value}"),
    ))
}

fn intern_line(
    table: &DashMap<String, &'static str>,
    limit: usize,
    line: String,
) -> &'static str {
    if let Some(existing) = table.get(&line) {
        return *existing;
    }
    if table.len() >= limit {
        if !TABLE_FULL_LOGGED.swap(true, Ordering::Relaxed) {
            warn!(limit, "Header line table full, leaking uncached header lines");
        }
        return Box::leak(line.into_boxed_str());
    }
    *table
        .entry(line.clone())
        .or_insert_with(|| &*Box::leak(line.into_boxed_str()))
}

/// Write `hr` onto the wire response.
///
/// `Content-Length` is computed by the transport and skipped here.
pub fn write_handler_response(res: &mut Response, hr: HandlerResponse) {
    res.status_code(usize::from(hr.status), status_reason(hr.status));
    for (name, value) in &hr.headers {
        if name.eq_ignore_ascii_case("content-length") {
            continue;
        }
        if let Some(line) = header_line(name, value) {
            res.header(line);
        }
    }
    res.body_vec(hr.body);
}

/// Write a JSON `{"error": message}` response
pub fn write_json_error(res: &mut Response, status: u16, message: &str) {
    write_handler_response(res, HandlerResponse::error(status, message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(405), "Method Not Allowed");
        assert_eq!(status_reason(418), "Client Error");
        assert_eq!(status_reason(599), "Server Error");
    }

    #[test]
    fn test_header_line_is_interned() {
        let a = header_line("content-type", "text/plain").unwrap();
        let b = header_line("content-type", "text/plain").unwrap();
        assert_eq!(a, "content-type: text/plain");
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_full_table_still_yields_lines() {
        let table = DashMap::new();
        let first = intern_line(&table, 2, "x-a: 1".to_string());
        intern_line(&table, 2, "x-b: 2".to_string());
        let line = "content-disposition: attachment; filename=\"r.csv\"";
        let overflow = intern_line(&table, 2, line.to_string());
        assert_eq!(overflow, line);
        assert_eq!(table.len(), 2);
        assert!(std::ptr::eq(first, intern_line(&table, 2, "x-a: 1".to_string())));
    }

    #[test]
    fn test_header_line_rejects_injection() {
        assert!(header_line("x-evil", "a\r\nset-cookie: x=1").is_none());
        assert!(header_line("x-bad\n", "v").is_none());
    }
}
