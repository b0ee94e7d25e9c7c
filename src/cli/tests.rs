use std::sync::Arc;

use clap::Parser;
use http::Method;

use crate::cli::{build_demo_router, run_command, Cli, Commands};
use crate::dispatcher::HandlerRequest;
use crate::middleware::MetricsMiddleware;

#[test]
fn test_serve_command_parses() {
    let cli = Cli::try_parse_from([
        "treerouter",
        "serve",
        "--addr",
        "127.0.0.1:9999",
        "--static-dir",
        "public",
    ])
    .unwrap();
    match cli.command {
        Commands::Serve {
            addr,
            config,
            static_dir,
        } => {
            assert_eq!(addr.as_deref(), Some("127.0.0.1:9999"));
            assert!(config.is_none());
            assert_eq!(static_dir.unwrap().to_string_lossy(), "public");
        }
        Commands::Routes { .. } => panic!("Expected Serve command"),
    }
}

#[test]
fn test_routes_command_parses() {
    let cli = Cli::try_parse_from(["treerouter", "routes"]).unwrap();
    assert!(matches!(cli.command, Commands::Routes { static_dir: None }));
    assert!(Cli::try_parse_from(["treerouter", "launch"]).is_err());
}

#[test]
fn test_routes_command_runs() {
    let cli = Cli::try_parse_from(["treerouter", "routes", "--static-dir", "tests/staticdata"])
        .unwrap();
    run_command(cli).unwrap();
}

#[test]
fn test_demo_router_serves_its_routes() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let router = build_demo_router(&metrics, None).unwrap();
    let dispatcher = router.into_dispatcher();

    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/health"));
    assert_eq!(res.status, 200);
    assert_eq!(res.body_json().unwrap()["status"], "ok");

    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/echo/hello?x=1"));
    let body = res.body_json().unwrap();
    assert_eq!(body["value"], "hello");
    assert_eq!(body["query"]["x"], "1");

    let res = dispatcher.serve(HandlerRequest::new(Method::POST, "/echo").with_body("[1,2]"));
    assert_eq!(res.body_json().unwrap(), serde_json::json!([1, 2]));

    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/api/users/7/posts/9"));
    let body = res.body_json().unwrap();
    assert_eq!(body["user_id"], "7");
    assert_eq!(body["post_id"], "9");
    assert_eq!(metrics.request_count(), 1);

    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/metrics"));
    assert!(res.body_str().unwrap().contains("treerouter_requests_total 1"));
}

#[test]
fn test_demo_router_mounts_static_dir() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let router = build_demo_router(
        &metrics,
        Some(("/static", std::path::Path::new("tests/staticdata"))),
    )
    .unwrap();
    let dispatcher = router.into_dispatcher();
    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/static/hello.txt"));
    assert_eq!(res.status, 200);
    assert_eq!(res.body_str(), Some("Hello\n"));
}
