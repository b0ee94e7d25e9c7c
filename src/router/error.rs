use std::fmt;

use http::Method;

/// Routing failure returned by a tree search.
///
/// These are the only two routing-level failures. Anything else (body
/// decoding, response encoding, I/O) is the handler's own business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No node corresponds to the requested path
    NotFound,
    /// The path resolved to a node, but nothing is registered there for the
    /// requested method
    MethodNotAllowed {
        /// Methods registered at the matched node, sorted; empty if the node
        /// only exists as a prefix of longer routes
        allowed: Vec<Method>,
    },
}

impl RouteError {
    /// HTTP status code conventionally associated with the error
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RouteError::NotFound => 404,
            RouteError::MethodNotAllowed { .. } => 405,
        }
    }

    /// Value for an `Allow` header, if this is a method-not-allowed error
    /// with at least one allowed method
    #[must_use]
    pub fn allow_header(&self) -> Option<String> {
        match self {
            RouteError::NotFound => None,
            RouteError::MethodNotAllowed { allowed } if allowed.is_empty() => None,
            RouteError::MethodNotAllowed { allowed } => Some(
                allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::NotFound => write!(f, "not found: 404"),
            RouteError::MethodNotAllowed { .. } => write!(f, "method not allowed: 405"),
        }
    }
}

impl std::error::Error for RouteError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RouteError::NotFound.status(), 404);
        let err = RouteError::MethodNotAllowed {
            allowed: vec![Method::GET],
        };
        assert_eq!(err.status(), 405);
        assert_ne!(err, RouteError::NotFound);
    }

    #[test]
    fn test_allow_header() {
        assert_eq!(RouteError::NotFound.allow_header(), None);
        let err = RouteError::MethodNotAllowed {
            allowed: vec![Method::GET, Method::POST],
        };
        assert_eq!(err.allow_header().as_deref(), Some("GET, POST"));
        let empty = RouteError::MethodNotAllowed { allowed: vec![] };
        assert_eq!(empty.allow_header(), None);
    }
}
