use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{Method, Request, Version};
use serde_json::{Value, json};

use crate::body::{RequestBody, StreamingBody};
use crate::cookies::CookieJar;
use crate::engine::{error_code, http_status_for, is_network_failure};
use crate::error::{Error, ErrorCode, ErrorKind};
use crate::materialize::materialize_request;
use crate::options::{
    Auth, CertFile, ClientOptions, KeyFile, ProxyOptions, RequestOptions,
};
use crate::sink::SinkTarget;
use crate::transfer::{BodyTransfer, HttpVersion, build_transfer};

fn empty_request(uri: &str) -> Request<RequestBody> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(RequestBody::Empty)
        .expect("request should build")
}

fn options_with(request: RequestOptions) -> ClientOptions {
    ClientOptions::new().with_request(request)
}

fn body_bytes(request: Request<RequestBody>) -> Vec<u8> {
    let (_, body) = request.into_parts();
    body.into_bytes().expect("body should read").to_vec()
}

#[test]
fn cookie_jar_preserves_insertion_order() {
    let mut jar = CookieJar::new();
    jar.set("session", "abc");
    jar.set("theme", "dark");
    jar.set("session", "def");

    let names: Vec<&str> = jar.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["session", "theme"]);
    assert_eq!(jar.get("session"), Some("def"));
    assert_eq!(jar.to_header_value(), "session=def; theme=dark");
}

#[test]
fn cookie_jar_escapes_names_and_values() {
    let jar = CookieJar::new().with("my cookie", "a value;");
    assert_eq!(jar.to_header_value(), "my%20cookie=a%20value%3B");
    assert_eq!(jar.get("my cookie"), Some("a%20value%3B"));
}

#[test]
fn cookie_jar_remove_drops_entry() {
    let mut jar = CookieJar::from_pairs([("a", "1"), ("b", "2")]);
    assert_eq!(jar.remove("a"), Some("1".to_owned()));
    assert!(!jar.has("a"));
    assert_eq!(jar.len(), 1);
    assert_eq!(jar.remove("a"), None);
}

#[test]
fn request_options_rejects_invalid_header_name() {
    let error = RequestOptions::new()
        .with_header("bad header", "value")
        .expect_err("a header name with a space should be rejected");
    match &error {
        Error::InvalidHeaderName { name, .. } => assert_eq!(name, "bad header"),
        other => panic!("unexpected error variant: {other}"),
    }
    assert_eq!(error.code(), ErrorCode::InvalidHeaderName);
    assert_eq!(error.kind(), ErrorKind::InvalidConfiguration);
}

#[test]
fn request_options_typed_query_rejects_non_map_shape() {
    let error = RequestOptions::new()
        .with_query(&[1u32, 2, 3])
        .expect_err("a bare sequence is neither a map nor pairs");
    assert_eq!(error.code(), ErrorCode::SerializeQuery);
    assert_eq!(error.kind(), ErrorKind::InvalidConfiguration);
}

#[test]
fn materialize_is_identity_without_request_options() {
    let options = ClientOptions::new().with_base_url("http://127.0.0.1:3000");
    let request = empty_request("http://example.org/path?q=1");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(materialized.uri(), "http://example.org/path?q=1");
    assert!(materialized.headers().is_empty());
}

#[test]
fn materialize_rebases_host_and_port_from_base_url() {
    let options = ClientOptions::new()
        .with_base_url("http://127.0.0.1:3000")
        .with_request(RequestOptions::new());
    let request = empty_request("http://127.0.0.1:80");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    let uri = materialized.uri();
    assert_eq!(uri.scheme_str(), Some("http"));
    assert_eq!(uri.host(), Some("127.0.0.1"));
    assert_eq!(uri.port_u16(), Some(3000));
}

#[test]
fn materialize_keeps_request_path_when_base_has_none() {
    let options = ClientOptions::new()
        .with_base_url("http://api.test:9000")
        .with_request(RequestOptions::new());
    let request = empty_request("http://old.test/v1/items?page=2");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(materialized.uri().host(), Some("api.test"));
    assert_eq!(materialized.uri().path(), "/v1/items");
    assert_eq!(materialized.uri().query(), Some("page=2"));
}

#[test]
fn materialize_prefers_base_url_path() {
    let options = ClientOptions::new()
        .with_base_url("http://api.test/v2/transactions")
        .with_request(RequestOptions::new());
    let request = empty_request("http://old.test/v1/items");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(materialized.uri().path(), "/v2/transactions");
}

#[test]
fn materialize_serializes_query_pairs_in_order() {
    let options = options_with(
        RequestOptions::new().with_query_pairs([("post_id", "2"), ("comments_count", "1")]),
    );
    let request = empty_request("http://example.org/");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(
        materialized.uri().query(),
        Some("post_id=2&comments_count=1")
    );
}

#[test]
fn materialize_query_uses_rfc3986_percent_encoding() {
    let options = options_with(RequestOptions::new().with_query_pairs([("q", "a b")]));
    let request = empty_request("http://example.org/");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(materialized.uri().query(), Some("q=a%20b"));
}

#[test]
fn materialize_raw_query_is_used_verbatim() {
    let options =
        options_with(RequestOptions::new().with_query_string("a=1&b=2"));
    let request = empty_request("http://example.org/?old=1");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(materialized.uri().query(), Some("a=1&b=2"));
}

#[test]
fn materialize_encodes_json_body() {
    let options = options_with(
        RequestOptions::new()
            .with_header("Content-Type", "application/json")
            .expect("header should parse")
            .with_body(json!({ "a": 1 })),
    );
    let request = empty_request("http://example.org/");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(
        materialized.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(b"application/json".as_slice())
    );

    let decoded: Value =
        serde_json::from_slice(&body_bytes(materialized)).expect("body should be json");
    assert_eq!(decoded, json!({ "a": 1 }));
}

#[test]
fn materialize_json_matches_content_type_with_parameters() {
    let options = options_with(
        RequestOptions::new()
            .with_header("Content-Type", "Application/JSON; charset=utf-8")
            .expect("header should parse")
            .with_body(json!({ "ok": true })),
    );
    let request = empty_request("http://example.org/");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(
        materialized.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(b"application/json".as_slice())
    );
}

#[test]
fn materialize_multipart_generates_fresh_boundary() {
    let options = options_with(
        RequestOptions::new()
            .with_header("Content-Type", "multipart/form-data")
            .expect("header should parse")
            .with_body(json!([
                { "name": "post_id", "contents": "2" },
                { "name": "note", "contents": "Hello World!" },
            ])),
    );

    let boundary_of = |request: &Request<RequestBody>| -> String {
        let header = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .expect("content type should be set");
        let (prefix, boundary) = header
            .split_once("boundary=")
            .expect("content type should carry a boundary");
        assert_eq!(prefix, "multipart/form-data; ");
        assert!(!boundary.is_empty());
        boundary.to_owned()
    };

    let first = materialize_request(empty_request("http://example.org/"), &options)
        .expect("materialization should succeed");
    let second = materialize_request(empty_request("http://example.org/"), &options)
        .expect("materialization should succeed");
    let first_boundary = boundary_of(&first);
    assert_ne!(first_boundary, boundary_of(&second));

    let encoded = String::from_utf8(body_bytes(first)).expect("multipart body should be utf-8");
    assert!(encoded.contains("name=\"post_id\""));
    assert!(encoded.contains("Hello World!"));
    assert!(encoded.ends_with(&format!("--{first_boundary}--\r\n")));
}

#[test]
fn materialize_url_encoded_flattens_nested_values() {
    let options = options_with(
        RequestOptions::new()
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .expect("header should parse")
            .with_body(json!({
                "version": "2.0",
                "services": { "web": { "image": "nginx" } },
            })),
    );
    let request = empty_request("http://example.org/");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    let encoded = String::from_utf8(body_bytes(materialized)).expect("body should be utf-8");
    assert!(encoded.contains("version=2.0"));
    assert!(encoded.contains("services%5Bweb%5D%5Bimage%5D=nginx"));
}

#[test]
fn materialize_passes_through_unknown_content_type() {
    let options = options_with(
        RequestOptions::new()
            .with_header("Content-Type", "text/plain")
            .expect("header should parse")
            .with_body(json!({ "ignored": true })),
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("http://example.org/")
        .body(RequestBody::from("hello"))
        .expect("request should build");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(
        materialized.headers().get(CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(b"text/plain".as_slice())
    );
    assert_eq!(body_bytes(materialized), b"hello");
}

#[test]
fn materialize_skips_encoders_for_empty_body_value() {
    let options = options_with(
        RequestOptions::new()
            .with_header("Content-Type", "application/json")
            .expect("header should parse")
            .with_body(json!({})),
    );
    let request = empty_request("http://example.org/");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert!(matches!(materialized.body(), RequestBody::Empty));
}

#[test]
fn materialize_injects_accept_encoding_override() {
    let options = options_with(RequestOptions::new().with_encoding("gzip,deflate"));
    let request = empty_request("http://example.org/");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert_eq!(
        materialized
            .headers()
            .get(http::header::ACCEPT_ENCODING)
            .map(|v| v.as_bytes()),
        Some(b"gzip,deflate".as_slice())
    );
}

#[test]
fn materialize_negotiated_encoding_injects_no_header() {
    let options = options_with(RequestOptions::new().with_negotiated_encoding());
    let request = empty_request("http://example.org/");

    let materialized =
        materialize_request(request, &options).expect("materialization should succeed");
    assert!(
        materialized
            .headers()
            .get(http::header::ACCEPT_ENCODING)
            .is_none()
    );
}

#[test]
fn build_buffers_body_below_size_ceiling() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("http://example.org/upload")
        .header(CONTENT_LENGTH, "500000")
        .body(RequestBody::from("payload"))
        .expect("request should build");

    let built = build_transfer(request, &ClientOptions::new()).expect("build should succeed");
    match &built.config.body {
        BodyTransfer::Buffered(bytes) => assert_eq!(bytes.as_ref(), b"payload"),
        other => panic!("expected buffered body, got {other:?}"),
    }
    assert!(
        !built
            .config
            .header_lines
            .iter()
            .any(|line| line.to_ascii_lowercase().starts_with("content-length"))
    );
}

#[test]
fn build_streams_body_at_or_above_size_ceiling() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("http://example.org/upload")
        .header(CONTENT_LENGTH, "2000000")
        .body(RequestBody::from("payload"))
        .expect("request should build");

    let built = build_transfer(request, &ClientOptions::new()).expect("build should succeed");
    match &built.config.body {
        BodyTransfer::Streaming { len, .. } => assert_eq!(*len, Some(2_000_000)),
        other => panic!("expected streaming body, got {other:?}"),
    }
}

#[test]
fn build_streams_body_with_unknown_length() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("http://example.org/upload")
        .body(RequestBody::Streaming(StreamingBody::new(
            Cursor::new(b"streamed".to_vec()),
            None,
        )))
        .expect("request should build");

    let built = build_transfer(request, &ClientOptions::new()).expect("build should succeed");
    match &built.config.body {
        BodyTransfer::Streaming { len, .. } => assert_eq!(*len, None),
        other => panic!("expected streaming body, got {other:?}"),
    }
}

#[test]
fn build_declares_zero_content_length_for_empty_post() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("http://example.org/")
        .body(RequestBody::Empty)
        .expect("request should build");

    let built = build_transfer(request, &ClientOptions::new()).expect("build should succeed");
    assert!(
        built
            .config
            .header_lines
            .iter()
            .any(|line| line == "content-length: 0")
    );
    assert!(matches!(
        built.config.body,
        BodyTransfer::None { no_body: false }
    ));
}

#[test]
fn build_marks_head_requests_as_bodyless() {
    let request = Request::builder()
        .method(Method::HEAD)
        .uri("http://example.org/")
        .body(RequestBody::Empty)
        .expect("request should build");

    let built = build_transfer(request, &ClientOptions::new()).expect("build should succeed");
    assert!(matches!(
        built.config.body,
        BodyTransfer::None { no_body: true }
    ));
}

#[test]
fn build_emits_blank_header_conventions() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("http://example.org/")
        .header("x-empty", "")
        .body(RequestBody::Empty)
        .expect("request should build");

    let built = build_transfer(request, &ClientOptions::new()).expect("build should succeed");
    assert!(built.config.header_lines.contains(&"x-empty;".to_owned()));
    assert!(built.config.header_lines.contains(&"Accept:".to_owned()));
    // No body was attached, so no Expect/Content-Type suppression.
    assert!(!built.config.header_lines.contains(&"Expect:".to_owned()));
}

#[test]
fn build_suppresses_engine_defaults_when_body_attached() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("http://example.org/")
        .header(CONTENT_LENGTH, "7")
        .body(RequestBody::from("payload"))
        .expect("request should build");

    let built = build_transfer(request, &ClientOptions::new()).expect("build should succeed");
    assert!(built.config.header_lines.contains(&"Expect:".to_owned()));
    assert!(
        built
            .config
            .header_lines
            .contains(&"Content-Type:".to_owned())
    );
}

#[test]
fn build_verify_off_disables_peer_checks() {
    let options = ClientOptions::new().with_verify(false);
    let built = build_transfer(empty_request("https://example.org/"), &options)
        .expect("build should succeed");
    assert_eq!(built.config.verify_peer, Some(false));
    assert_eq!(built.config.verify_host, Some(false));
    assert!(built.config.ca_info.is_none());
}

#[test]
fn build_missing_ca_bundle_fails() {
    let options = ClientOptions::new().with_ca_bundle("/definitely/missing/ca.pem");
    let error = build_transfer(empty_request("https://example.org/"), &options)
        .expect_err("a missing ca bundle should be rejected");
    assert_eq!(error.code(), ErrorCode::CaBundleNotFound);
    assert_eq!(error.kind(), ErrorKind::InvalidConfiguration);
}

#[test]
fn build_ca_directory_maps_to_ca_path() {
    let options = ClientOptions::new().with_ca_bundle(std::env::temp_dir());
    let built = build_transfer(empty_request("https://example.org/"), &options)
        .expect("build should succeed");
    assert_eq!(built.config.verify_peer, Some(true));
    assert!(built.config.ca_path.is_some());
    assert!(built.config.ca_info.is_none());
}

#[test]
fn build_missing_sink_directory_fails() {
    let options = ClientOptions::new()
        .with_sink(SinkTarget::path("/definitely/missing/dir/download.bin"));
    let error = build_transfer(empty_request("http://example.org/"), &options)
        .expect_err("a missing sink directory should be rejected");
    assert_eq!(error.code(), ErrorCode::SinkDirectoryMissing);
}

#[test]
fn build_defaults_to_memory_sink_with_write_function() {
    let built = build_transfer(empty_request("http://example.org/"), &ClientOptions::new())
        .expect("build should succeed");
    let mut write = built.config.write_function.expect("write function expected");
    assert_eq!(write(b"chunk"), 5);
    assert_eq!(built.sink.captured().expect("memory sink").as_ref(), b"chunk");
}

#[cfg(not(windows))]
#[test]
fn build_subsecond_timeout_sets_no_signal() {
    let options = options_with(
        RequestOptions::new().with_timeout(Duration::from_millis(500)),
    );
    let built = build_transfer(empty_request("http://example.org/"), &options)
        .expect("build should succeed");
    assert_eq!(built.config.timeout_ms, Some(500));
    assert!(built.config.no_signal);
}

#[test]
fn build_connect_timeout_overrides_default() {
    let built = build_transfer(empty_request("http://example.org/"), &ClientOptions::new())
        .expect("build should succeed");
    assert_eq!(built.config.connect_timeout_ms, 150_000);

    let options = ClientOptions::new().with_connect_timeout(Duration::from_secs(10));
    let built = build_transfer(empty_request("http://example.org/"), &options)
        .expect("build should succeed");
    assert_eq!(built.config.connect_timeout_ms, 10_000);
}

#[test]
fn build_serializes_cookie_jar() {
    let options = ClientOptions::new()
        .with_cookie("session", "abc")
        .with_cookie("theme", "dark");
    let built = build_transfer(empty_request("http://example.org/"), &options)
        .expect("build should succeed");
    assert_eq!(
        built.config.cookie_header.as_deref(),
        Some("session=abc; theme=dark")
    );
}

#[test]
fn build_forwards_request_accept_encoding_when_negotiating() {
    let options = options_with(RequestOptions::new().with_negotiated_encoding());
    let request = Request::builder()
        .method(Method::GET)
        .uri("http://example.org/")
        .header(http::header::ACCEPT_ENCODING, "gzip")
        .body(RequestBody::Empty)
        .expect("request should build");

    let built = build_transfer(request, &options).expect("build should succeed");
    assert_eq!(built.config.accept_encoding.as_deref(), Some("gzip"));
}

#[test]
fn build_requests_all_codings_without_accept_encoding_header() {
    let options = options_with(RequestOptions::new().with_negotiated_encoding());
    let built = build_transfer(empty_request("http://example.org/"), &options)
        .expect("build should succeed");
    assert_eq!(built.config.accept_encoding.as_deref(), Some(""));
    assert!(
        built
            .config
            .header_lines
            .contains(&"Accept-Encoding:".to_owned())
    );
}

#[test]
fn build_maps_proxy_settings() {
    let options = ClientOptions::new().with_proxy(
        ProxyOptions::new("proxy.test")
            .with_port(3128)
            .with_credentials("user", "pass"),
    );
    let built = build_transfer(empty_request("http://example.org/"), &options)
        .expect("build should succeed");
    let proxy = built.config.proxy.expect("proxy expected");
    assert_eq!(proxy.host, "proxy.test");
    assert_eq!(proxy.port, Some(3128));
    assert_eq!(
        proxy.credentials,
        Some(("user".to_owned(), "pass".to_owned()))
    );
}

#[test]
fn build_missing_certificate_fails() {
    let options =
        ClientOptions::new().with_cert(CertFile::new("/definitely/missing/client.pem"));
    let error = build_transfer(empty_request("https://example.org/"), &options)
        .expect_err("a missing certificate should be rejected");
    assert_eq!(error.code(), ErrorCode::CertificateNotFound);
}

#[test]
fn build_missing_private_key_fails() {
    let options =
        ClientOptions::new().with_ssl_key(KeyFile::new("/definitely/missing/client.key"));
    let error = build_transfer(empty_request("https://example.org/"), &options)
        .expect_err("a missing private key should be rejected");
    assert_eq!(error.code(), ErrorCode::PrivateKeyNotFound);
}

#[test]
fn build_detects_certificate_type_from_extension() {
    let path = std::env::temp_dir().join("courier-test-client-cert.P12");
    std::fs::write(&path, b"not a real bundle").expect("temp cert should write");

    let options = ClientOptions::new().with_cert(CertFile::new(&path).with_password("secret"));
    let built = build_transfer(empty_request("https://example.org/"), &options)
        .expect("build should succeed");
    assert_eq!(built.config.ssl_cert_type.as_deref(), Some("P12"));
    assert_eq!(built.config.ssl_cert_password.as_deref(), Some("secret"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn build_applies_basic_auth_as_header() {
    let options = options_with(RequestOptions::new().with_auth(Auth::basic("user", "pass")));
    let built = build_transfer(empty_request("http://example.org/"), &options)
        .expect("build should succeed");
    assert!(
        built
            .config
            .header_lines
            .contains(&"authorization: Basic dXNlcjpwYXNz".to_owned())
    );
    assert!(built.config.auth.is_none());
}

#[test]
fn build_delegates_digest_auth_to_engine() {
    let options = options_with(RequestOptions::new().with_auth(Auth::digest("user", "pass")));
    let built = build_transfer(empty_request("http://example.org/"), &options)
        .expect("build should succeed");
    let auth = built.config.auth.expect("engine auth expected");
    assert_eq!(auth.scheme, crate::transfer::EngineAuthScheme::Digest);
    assert_eq!(auth.username, "user");
}

#[test]
fn build_wraps_progress_callback() {
    let seen: Arc<Mutex<Vec<(u64, u64, u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let options = ClientOptions::new().with_progress(move |dt, dl, ut, ul| {
        recorder.lock().expect("lock").push((dt, dl, ut, ul));
    });

    let built = build_transfer(empty_request("http://example.org/"), &options)
        .expect("build should succeed");
    let mut progress = built.config.progress.expect("progress expected");
    progress(100, 25, 0, 0);
    assert_eq!(*seen.lock().expect("lock"), vec![(100, 25, 0, 0)]);
}

#[test]
fn build_maps_http_version_from_request() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("http://example.org/")
        .version(Version::HTTP_2)
        .body(RequestBody::Empty)
        .expect("request should build");
    let built = build_transfer(request, &ClientOptions::new()).expect("build should succeed");
    assert_eq!(built.config.http_version, HttpVersion::Http2);

    let built = build_transfer(empty_request("http://example.org/"), &ClientOptions::new())
        .expect("build should succeed");
    assert_eq!(built.config.http_version, HttpVersion::Http11);
}

#[test]
fn engine_codes_classify_network_failures() {
    assert!(is_network_failure(error_code::COULDNT_RESOLVE_HOST));
    assert!(is_network_failure(error_code::COULDNT_RESOLVE_PROXY));
    assert!(is_network_failure(error_code::COULDNT_CONNECT));
    assert!(!is_network_failure(error_code::OPERATION_TIMEDOUT));
    assert!(!is_network_failure(error_code::OK));
}

#[test]
fn engine_codes_map_to_status_approximations() {
    assert_eq!(http_status_for(error_code::OK), 200);
    assert_eq!(http_status_for(error_code::COULDNT_RESOLVE_HOST), 502);
    assert_eq!(http_status_for(error_code::OPERATION_TIMEDOUT), 408);
    assert_eq!(http_status_for(error_code::PEER_FAILED_VERIFICATION), 526);
    assert_eq!(http_status_for(9999), 500);
}

#[test]
fn error_kinds_follow_the_taxonomy() {
    let network = Error::Network {
        code: error_code::COULDNT_CONNECT,
        status: 502,
        message: "connect refused".to_owned(),
        method: Method::GET,
        uri: "http://example.org/".to_owned(),
    };
    assert_eq!(network.kind(), ErrorKind::Network);
    assert_eq!(network.status(), Some(502));

    let request = Error::Request {
        code: error_code::OPERATION_TIMEDOUT,
        status: 408,
        message: "timed out".to_owned(),
        method: Method::GET,
        uri: "http://example.org/".to_owned(),
    };
    assert_eq!(request.kind(), ErrorKind::Request);

    let invalid = Error::InvalidUri {
        uri: "::".to_owned(),
    };
    assert_eq!(invalid.kind(), ErrorKind::InvalidConfiguration);
    assert_eq!(invalid.code().as_str(), "invalid_uri");
}
