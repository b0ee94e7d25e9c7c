//! End-to-end tests through the `may_minihttp` transport
//!
//! Each test starts a service on a free local port, talks to it with raw
//! HTTP/1.1 over a `TcpStream` and stops it again.

mod common;

use common::http::{get, parse_response, send_request};
use common::test_server::start_service;
use http::Method;
use treerouter::dispatcher::{HandlerRequest, HandlerResponse};
use treerouter::middleware::TracingMiddleware;
use treerouter::router::Router;

fn demo_router() -> Router {
    let mut router = Router::new();
    router.get("/health", |_req: &mut HandlerRequest, res: &mut HandlerResponse| {
        res.json(200, &serde_json::json!({ "status": "ok" }))
    });
    router
        .get("/users/:id", |req: &mut HandlerRequest, res: &mut HandlerResponse| {
            res.json(
                200,
                &serde_json::json!({
                    "id": req.get_path_param("id"),
                    "request_id": req.request_id,
                }),
            )
        })
        .with(TracingMiddleware);
    router.post("/echo", |req: &mut HandlerRequest, res: &mut HandlerResponse| {
        res.status = 201;
        res.set_header("content-type", "application/octet-stream");
        res.set_header("x-echo-length", req.body().len().to_string());
        res.body = req.body().to_vec();
    });
    router.route("/panic").method(Method::GET).handler(
        |_req: &mut HandlerRequest, _res: &mut HandlerResponse| panic!("handler exploded"),
    );
    router
}

#[test]
fn test_health_over_http() {
    let (handle, addr) = start_service(demo_router());
    let resp = get(&addr, "/health");
    handle.stop();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[test]
fn test_path_params_and_request_id_over_http() {
    let (handle, addr) = start_service(demo_router());
    let request_id = "01ARZ3NDEKTSV4RRFFQ69G5FAV";
    let raw = send_request(
        &addr,
        &format!("GET /users/42 HTTP/1.1\r\nHost: localhost\r\nX-Request-Id: {request_id}\r\n\r\n"),
    );
    handle.stop();

    let resp = parse_response(&raw);
    assert_eq!(resp.status, 200);
    let body: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(body["id"], "42");
    assert_eq!(body["request_id"], request_id);
}

#[test]
fn test_post_body_over_http() {
    let (handle, addr) = start_service(demo_router());
    let payload = "ping-pong";
    let raw = send_request(
        &addr,
        &format!(
            "POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n{payload}",
            payload.len()
        ),
    );
    handle.stop();

    let resp = parse_response(&raw);
    assert_eq!(resp.status, 201);
    assert_eq!(resp.header("x-echo-length"), Some("9"));
    assert_eq!(resp.body, payload);
}

#[test]
fn test_routing_errors_over_http() {
    let (handle, addr) = start_service(demo_router());
    let missing = get(&addr, "/nope");
    let wrong_method = parse_response(&send_request(
        &addr,
        "DELETE /health HTTP/1.1\r\nHost: localhost\r\n\r\n",
    ));
    handle.stop();

    assert_eq!(missing.status, 404);
    assert_eq!(missing.body, "page not found");
    assert_eq!(wrong_method.status, 405);
    assert_eq!(wrong_method.header("allow"), Some("GET"));
    assert_eq!(wrong_method.body, "method not allowed");
}

#[test]
fn test_handler_panic_becomes_500() {
    let (handle, addr) = start_service(demo_router());
    let resp = get(&addr, "/panic");
    // the service keeps serving after a panic
    let after = get(&addr, "/health");
    handle.stop();

    assert_eq!(resp.status, 500);
    let body: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(body["error"], "Internal Server Error");
    assert_eq!(after.status, 200);
}
