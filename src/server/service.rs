use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use may_minihttp::{HttpService, Request, Response};
use tracing::{error, info, warn};

use super::request::parse_request;
use super::response::{write_handler_response, write_json_error};
use crate::dispatcher::{Dispatcher, HandlerResponse};

/// `may_minihttp` service backed by a frozen [`Dispatcher`].
///
/// Every connection gets a clone; clones share the dispatcher.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl From<Dispatcher> for AppService {
    fn from(dispatcher: Dispatcher) -> Self {
        Self::new(Arc::new(dispatcher))
    }
}

/// Render a caught panic payload for logging
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let start = Instant::now();
        let mut request = match parse_request(req) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejecting malformed request");
                write_json_error(res, 400, &e.to_string());
                return Ok(());
            }
        };
        let request_id = request.request_id;
        let method = request.method.clone();
        let path = request.path.clone();

        let dispatcher = &self.dispatcher;
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut response = HandlerResponse::default();
            dispatcher.dispatch(&mut request, &mut response);
            response
        }));
        let response = match outcome {
            Ok(response) => response,
            Err(panic) => {
                error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    panic_message = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                HandlerResponse::error(500, "Internal Server Error")
            }
        };

        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = response.status,
            duration_ms = start.elapsed().as_millis() as u64,
            "Request handled"
        );
        write_handler_response(res, response);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let caught = catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "boom");
        let caught = catch_unwind(|| panic!("{} {}", "formatted", 1)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "formatted 1");
    }
}
