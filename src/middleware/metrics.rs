use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::Middleware;
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};

/// Content type of the Prometheus text exposition format
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Middleware for collecting Prometheus-compatible metrics
///
/// Tracks request counts, latency and response status classes. All counters
/// use relaxed atomics; readers see eventually consistent values.
#[derive(Default)]
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    /// Responses by status class: 1xx .. 5xx
    status_classes: [AtomicUsize; 5],
    stack_size: AtomicUsize,
}

impl MetricsMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests that entered the middleware
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean latency of completed requests, zero before the first one
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Number of responses whose status is in `class` (1 to 5)
    pub fn status_class_count(&self, class: u16) -> usize {
        match class {
            1..=5 => self.status_classes[usize::from(class - 1)].load(Ordering::Relaxed),
            _ => 0,
        }
    }

    /// Coroutine stack size observed on the last request
    pub fn stack_size(&self) -> usize {
        self.stack_size.load(Ordering::Relaxed)
    }

    /// Render all counters in the Prometheus text format
    pub fn render_prometheus(&self) -> String {
        let mut body = format!(
            "# HELP treerouter_requests_total Total number of handled requests\n\
             # TYPE treerouter_requests_total counter\n\
             treerouter_requests_total {}\n\
             # HELP treerouter_request_latency_seconds Average request latency in seconds\n\
             # TYPE treerouter_request_latency_seconds gauge\n\
             treerouter_request_latency_seconds {:.6}\n\
             # HELP treerouter_coroutine_stack_bytes Coroutine stack size\n\
             # TYPE treerouter_coroutine_stack_bytes gauge\n\
             treerouter_coroutine_stack_bytes {}\n\
             # HELP treerouter_responses_total Responses by status class\n\
             # TYPE treerouter_responses_total counter\n",
            self.request_count(),
            self.average_latency().as_secs_f64(),
            self.stack_size(),
        );
        for class in 1..=5u16 {
            let _ = writeln!(
                body,
                "treerouter_responses_total{{class=\"{class}xx\"}} {}",
                self.status_class_count(class)
            );
        }
        body
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &mut HandlerRequest) -> Option<HandlerResponse> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if let 100..=599 = res.status {
            self.status_classes[usize::from(res.status / 100 - 1)].fetch_add(1, Ordering::Relaxed);
        }
        let size = if may::coroutine::is_coroutine() {
            may::coroutine::current().stack_size()
        } else {
            may::config().get_stack_size()
        };
        self.stack_size.store(size, Ordering::Relaxed);
    }
}

/// Handler serving `metrics` in the Prometheus text format
pub fn metrics_handler(metrics: Arc<MetricsMiddleware>) -> impl Handler {
    move |_req: &mut HandlerRequest, res: &mut HandlerResponse| {
        res.status = 200;
        res.set_header("content-type", PROMETHEUS_CONTENT_TYPE);
        res.body = metrics.render_prometheus().into_bytes();
    }
}
