//! Static files mounted as routes

use http::Method;
use treerouter::dispatcher::HandlerRequest;
use treerouter::router::Router;
use treerouter::static_files::StaticFiles;

#[test]
fn test_static_dir_registers_every_file() {
    let mut router = Router::new();
    let count = router.static_dir("/static", "tests/staticdata").unwrap();
    // three files plus the directory index
    assert_eq!(count, 4);

    let dispatcher = router.into_dispatcher();
    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/static/hello.txt"));
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("content-type"), Some("text/plain"));
    assert_eq!(res.body_str(), Some("Hello\n"));

    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/static/css/site.css"));
    assert_eq!(res.get_header("content-type"), Some("text/css"));

    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/static"));
    assert_eq!(res.get_header("content-type"), Some("text/html"));
    assert!(res.body_str().unwrap().contains("It works"));

    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/static/missing.txt"));
    assert_eq!(res.status, 404);
    let res = dispatcher.serve(HandlerRequest::new(Method::POST, "/static/hello.txt"));
    assert_eq!(res.status, 405);
}

#[test]
fn test_static_dir_at_root() {
    let mut router = Router::new();
    router.static_dir("/", "tests/staticdata").unwrap();
    let dispatcher = router.into_dispatcher();
    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/"));
    assert_eq!(res.status, 200);
    assert!(res.body_str().unwrap().contains("It works"));
    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/hello.txt"));
    assert_eq!(res.body_str(), Some("Hello\n"));
}

#[test]
fn test_static_dir_missing_directory_is_an_error() {
    let mut router = Router::new();
    assert!(router.static_dir("/x", "tests/no-such-dir").is_err());
}

#[test]
fn test_static_dir_skips_colon_names() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("plain.txt"), "plain").unwrap();
    std::fs::write(dir.path().join(":id.txt"), "captures").unwrap();
    std::fs::create_dir(dir.path().join(":nested")).unwrap();
    std::fs::write(dir.path().join(":nested").join("a.txt"), "a").unwrap();

    let mut router = Router::new();
    assert_eq!(router.static_dir("/files", dir.path()).unwrap(), 1);
    let dispatcher = router.into_dispatcher();

    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/files/plain.txt"));
    assert_eq!(res.body_str(), Some("plain"));
    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/files/anything"));
    assert_eq!(res.status, 404);
}

#[test]
fn test_static_file_route() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    std::fs::write(&path, br#"{"ok":true}"#).unwrap();

    let mut router = Router::new();
    router.static_file("/report", &path);
    let dispatcher = router.into_dispatcher();

    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/report"));
    assert_eq!(res.get_header("content-type"), Some("application/json"));
    assert_eq!(res.body_json().unwrap()["ok"], true);

    std::fs::remove_file(&path).unwrap();
    let res = dispatcher.serve(HandlerRequest::new(Method::GET, "/report"));
    assert_eq!(res.status, 500);
}

#[test]
fn test_static_files_loader() {
    let files = StaticFiles::new("tests/staticdata");
    let (bytes, ct) = files.load("/css/site.css").unwrap();
    assert_eq!(ct, "text/css");
    assert!(!bytes.is_empty());
    assert!(files.load("../Cargo.toml").is_err());
}
