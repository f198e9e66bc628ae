//! Tests for the reference route table

use std::io::Read;

use courier::handlers::{self, FileStore};
use courier::http::parser::parse_http_request;
use courier::http::request::{Method, Request, RequestBuilder};
use courier::http::response::{Response, StatusCode};
use courier::http::router::{PrefixMatch, Router};
use flate2::read::GzDecoder;
use tempfile::TempDir;

fn setup() -> (TempDir, Router) {
    let dir = tempfile::tempdir().unwrap();
    let router = handlers::routes(dir.path(), PrefixMatch::Raw);
    (dir, router)
}

fn send(router: &Router, raw: &[u8]) -> Response {
    let req = parse_http_request(raw, raw.len()).unwrap();
    router.dispatch(&req).0
}

#[test]
fn test_root_and_index() {
    let (_dir, router) = setup();

    for raw in ["GET / HTTP/1.1\r\n\r\n", "GET /index.html HTTP/1.1\r\n\r\n"] {
        let response = send(&router, raw.as_bytes());
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());
        assert!(response.headers.is_empty());
    }
}

#[test]
fn test_echo_plain() {
    let (_dir, router) = setup();
    let response = send(&router, b"GET /echo/abc HTTP/1.1\r\n\r\n");

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.header("Content-Length"), Some("3"));
    assert!(response.header("Content-Encoding").is_none());
    assert_eq!(response.body, b"abc".to_vec());
}

#[test]
fn test_echo_gzip_when_listed() {
    let (_dir, router) = setup();
    let response = send(
        &router,
        "GET /echo/héllo-✓ HTTP/1.1\r\nAccept-Encoding: invalid-1, gzip\r\n\r\n".as_bytes(),
    );

    assert_eq!(response.header("Content-Encoding"), Some("gzip"));
    let mut decoded = String::new();
    GzDecoder::new(&response.body[..]).read_to_string(&mut decoded).unwrap();
    assert_eq!(decoded, "héllo-✓");
}

#[test]
fn test_echo_no_gzip_for_unknown_encoding() {
    let (_dir, router) = setup();
    let response = send(
        &router,
        b"GET /echo/abc HTTP/1.1\r\nAccept-Encoding: invalid-encoding\r\n\r\n",
    );

    assert!(response.header("Content-Encoding").is_none());
    assert_eq!(response.body, b"abc".to_vec());
}

#[test]
fn test_echo_without_suffix() {
    let (_dir, router) = setup();
    let response = send(&router, b"GET /echo HTTP/1.1\r\n\r\n");

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_empty());
}

#[test]
fn test_user_agent() {
    let (_dir, router) = setup();
    let response = send(
        &router,
        b"GET /user-agent HTTP/1.1\r\nUser-Agent: foobar/1.2.3\r\n\r\n",
    );

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"foobar/1.2.3".to_vec());
    assert_eq!(response.header("Content-Length"), Some("12"));
}

#[test]
fn test_post_then_get_file() {
    let (dir, router) = setup();

    let created = send(
        &router,
        b"POST /files/test.txt HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello",
    );
    assert_eq!(created.status, StatusCode::CREATED);
    assert!(created.body.is_empty());
    assert_eq!(std::fs::read(dir.path().join("test.txt")).unwrap(), b"hello");

    let fetched = send(&router, b"GET /files/test.txt HTTP/1.1\r\n\r\n");
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(
        fetched.header("Content-Type"),
        Some("application/octet-stream")
    );
    assert_eq!(fetched.body, b"hello".to_vec());
}

#[test]
fn test_post_overwrites_file() {
    let (dir, router) = setup();
    std::fs::write(dir.path().join("data"), b"old contents that are longer").unwrap();

    let created = send(&router, b"POST /files/data HTTP/1.1\r\n\r\nnew");
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(std::fs::read(dir.path().join("data")).unwrap(), b"new");
}

#[test]
fn test_get_missing_file() {
    let (_dir, router) = setup();
    let response = send(&router, b"GET /files/non_existent HTTP/1.1\r\n\r\n");

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.is_empty());
}

#[test]
fn test_post_into_missing_directory() {
    let (_dir, router) = setup();
    let response = send(&router, b"POST /files/nope/x.txt HTTP/1.1\r\n\r\nhi");

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_file_traversal_rejected() {
    let (dir, router) = setup();
    let inner = dir.path().join("inner");
    std::fs::create_dir(&inner).unwrap();
    std::fs::write(dir.path().join("secret"), b"s").unwrap();
    let router_inner = handlers::routes(&inner, PrefixMatch::Raw);

    let response = send(&router_inner, b"GET /files/../secret HTTP/1.1\r\n\r\n");
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(&router_inner, b"POST /files/../escaped HTTP/1.1\r\n\r\nx");
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(!dir.path().join("escaped").exists());

    let response = send(&router, b"GET /files/ HTTP/1.1\r\n\r\n");
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_file_store_resolve() {
    let store = FileStore::new("/srv/data");

    assert_eq!(
        store.resolve("a/b.txt").unwrap(),
        std::path::PathBuf::from("/srv/data/a/b.txt")
    );
    assert!(store.resolve("").is_err());
    assert!(store.resolve("../etc/passwd").is_err());
    assert!(store.resolve("/etc/passwd").is_err());
    assert_eq!(store.root(), std::path::Path::new("/srv/data"));
}

#[test]
fn test_user_json_echo() {
    let (_dir, router) = setup();
    let response = send(
        &router,
        b"POST /user HTTP/1.1\r\nContent-Type: application/json\r\n\r\n{\"a\":1}",
    );

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("Content-Type"), Some("application/json"));
    assert_eq!(response.body, br#"{"a":1}"#.to_vec());
}

#[test]
fn test_user_nested_json() {
    let (_dir, router) = setup();
    let body = r#"{"name": "ada", "tags": ["x", "y"], "meta": {"n": null}}"#;
    let raw = format!("POST /user HTTP/1.1\r\n\r\n{body}");
    let response = send(&router, raw.as_bytes());

    let echoed: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(
        echoed,
        serde_json::json!({"name": "ada", "tags": ["x", "y"], "meta": {"n": null}})
    );
}

#[test]
fn test_user_invalid_json() {
    let (_dir, router) = setup();

    for body in ["{not json", "[1,2,3]", ""] {
        let raw = format!("POST /user HTTP/1.1\r\n\r\n{body}");
        let response = send(&router, raw.as_bytes());
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(response.body, b"Invalid JSON".to_vec());
    }
}

#[test]
fn test_status() {
    let (_dir, router) = setup();
    let response = send(&router, b"GET /status HTTP/1.1\r\n\r\n");

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, br#"{"message":"ok"}"#.to_vec());
}

#[test]
fn test_unregistered_method_is_404() {
    let (_dir, router) = setup();
    let req: Request = RequestBuilder::new()
        .method(Method::PUT)
        .path("/files/a")
        .build()
        .unwrap();

    let (response, matched) = router.dispatch(&req);
    assert!(!matched);
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_segment_mode_rejects_glued_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let raw_router = handlers::routes(dir.path(), PrefixMatch::Raw);
    let segment_router = handlers::routes(dir.path(), PrefixMatch::Segment);

    let raw = b"GET /echoXYZ HTTP/1.1\r\n\r\n";
    assert_eq!(send(&raw_router, raw).status, StatusCode::OK);
    assert_eq!(send(&segment_router, raw).status, StatusCode::NOT_FOUND);
}
