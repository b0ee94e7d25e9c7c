//! HTTP transport on `may_minihttp`.
//!
//! [`AppService`] adapts wire requests to [`HandlerRequest`]s, runs them
//! through a shared [`Dispatcher`] and writes the [`HandlerResponse`] back.
//!
//! [`HandlerRequest`]: crate::dispatcher::HandlerRequest
//! [`HandlerResponse`]: crate::dispatcher::HandlerResponse
//! [`Dispatcher`]: crate::dispatcher::Dispatcher

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle, MAX_REQUEST_HEADERS};
pub use request::{parse_query_params, parse_request, RequestError, REQUEST_ID_HEADER};
pub use response::{status_reason, write_handler_response, write_json_error};
pub use service::AppService;
