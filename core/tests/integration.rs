//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port and drives a real
//! `Session` over HTTP, checking both what the server received (via `/echo`
//! and `/cookies`) and how the outcome was classified.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use mock_server::{Echo, SESSION_COOKIE};
use outbound_core::{
    Cookie, HttpMethod, OutboundRequest, Params, ResultKind, Service, Session, SessionConfig,
    CORRELATION_KEY, FORM_CONTENT_TYPE,
};
use uuid::Uuid;

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { mock_server::run(listener).await.unwrap() });
    format!("http://{addr}")
}

/// An address nothing is listening on.
fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

fn closed_port_url() -> String {
    format!("http://{}/ok", closed_addr())
}

fn echo_of(body: &str) -> Echo {
    serde_json::from_str(body).unwrap()
}

// --- request encoding ---

#[tokio::test]
async fn get_sends_params_and_generated_correlation_id() {
    let base = spawn_server().await;
    let session = Session::default();

    let params = Params::new().with("page", 3).with("neg", -7i64).with("q", "rust lang");
    let result = session
        .send(HttpMethod::Get, &format!("{base}/echo"), params)
        .await;
    assert_eq!(result.kind(), ResultKind::Success);

    let echo = echo_of(result.body());
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.params["page"], "3");
    assert_eq!(echo.params["neg"], "-7");
    assert_eq!(echo.params["q"], "rust lang");
    let id = Uuid::parse_str(&echo.params[CORRELATION_KEY]).unwrap();
    assert_eq!(id.get_version_num(), 4);
}

#[tokio::test]
async fn get_with_empty_params_still_sends_correlation_id() {
    let base = spawn_server().await;
    let session = Session::default();

    let result = session
        .send(HttpMethod::Get, &format!("{base}/echo"), Params::new())
        .await;
    let echo = echo_of(result.body());
    assert_eq!(echo.params.len(), 1);
    assert!(echo.params.contains_key(CORRELATION_KEY));
}

#[tokio::test]
async fn explicit_correlation_id_is_used() {
    let base = spawn_server().await;
    let session = Session::default();

    let request = OutboundRequest::new(HttpMethod::Get, format!("{base}/echo"), Params::new())
        .correlation_id("trace-42");
    let result = session.send_with(request).await;
    assert_eq!(echo_of(result.body()).params[CORRELATION_KEY], "trace-42");
}

#[tokio::test]
async fn body_methods_send_form_without_correlation_id() {
    let base = spawn_server().await;
    let session = Session::default();

    for (method, name) in [
        (HttpMethod::Post, "POST"),
        (HttpMethod::Put, "PUT"),
        (HttpMethod::Delete, "DELETE"),
    ] {
        let params = Params::new().with("id", 9u32).with("name", "Ada");
        let result = session
            .send(method, &format!("{base}/echo"), params)
            .await;
        assert_eq!(result.kind(), ResultKind::Success, "{name}");

        let echo = echo_of(result.body());
        assert_eq!(echo.method, name);
        assert_eq!(echo.content_type.as_deref(), Some(FORM_CONTENT_TYPE));
        assert_eq!(echo.params["id"], "9");
        assert_eq!(echo.params["name"], "Ada");
        assert!(!echo.params.contains_key(CORRELATION_KEY), "{name}");
    }
}

#[tokio::test]
async fn body_methods_keep_caller_uuid() {
    let base = spawn_server().await;
    let session = Session::default();

    let result = session
        .send(
            HttpMethod::Post,
            &format!("{base}/echo"),
            Params::new().with("uuid", "from-caller"),
        )
        .await;
    assert_eq!(echo_of(result.body()).params["uuid"], "from-caller");
}

#[tokio::test]
async fn json_params_are_accepted_when_scalar() {
    let base = spawn_server().await;
    let session = Session::default();

    let result = session
        .send_json(
            HttpMethod::Put,
            &format!("{base}/echo"),
            &serde_json::json!({ "n": 5, "s": "x" }),
        )
        .await;
    let echo = echo_of(result.body());
    assert_eq!(echo.params["n"], "5");
    assert_eq!(echo.params["s"], "x");
}

// --- classification ---

#[tokio::test]
async fn ok_body_is_success() {
    let base = spawn_server().await;
    let result = Session::default()
        .send(HttpMethod::Get, &format!("{base}/ok"), Params::new())
        .await;
    assert_eq!(result.kind(), ResultKind::Success);
    assert_eq!(result.message(), "");
    assert_eq!(result.body(), "ok");
}

#[tokio::test]
async fn not_found_is_bad_status() {
    let base = spawn_server().await;
    let result = Session::default()
        .send(HttpMethod::Get, &format!("{base}/status/404"), Params::new())
        .await;
    assert_eq!(result.kind(), ResultKind::BadStatus);
    assert_eq!(result.message(), "rsp status code: 404");
    assert_eq!(result.body(), "");
}

#[tokio::test]
async fn non_200_success_codes_are_bad_status() {
    let base = spawn_server().await;
    let session = Session::default();
    for code in [201u16, 204, 500] {
        let result = session
            .send(HttpMethod::Post, &format!("{base}/status/{code}"), Params::new())
            .await;
        assert_eq!(result.kind(), ResultKind::BadStatus);
        assert_eq!(result.message(), format!("rsp status code: {code}"));
    }
}

#[tokio::test]
async fn empty_200_is_empty_body() {
    let base = spawn_server().await;
    let result = Session::default()
        .send(HttpMethod::Get, &format!("{base}/empty"), Params::new())
        .await;
    assert_eq!(result.kind(), ResultKind::EmptyBody);
    assert_eq!(result.message(), "rsp content empty");
    assert_eq!(result.body(), "");
}

#[tokio::test]
async fn unreachable_host_is_request_failed() {
    let result = Session::default()
        .send(HttpMethod::Get, &closed_port_url(), Params::new())
        .await;
    assert_eq!(result.kind(), ResultKind::RequestFailed);
    let message = result.message().to_lowercase();
    assert!(message.contains("error sending request"), "{message}");
    assert!(message.contains("connection refused"), "{message}");
    assert_eq!(result.body(), "");
}

#[tokio::test]
async fn non_utf8_body_is_request_failed() {
    let base = spawn_server().await;
    let result = Session::default()
        .send(HttpMethod::Get, &format!("{base}/binary"), Params::new())
        .await;
    assert_eq!(result.kind(), ResultKind::RequestFailed);
    assert!(result.message().starts_with("rsp content not utf-8: "));
    assert_eq!(result.body(), "");
}

#[tokio::test]
async fn empty_url_needs_host() {
    let result = Session::default()
        .send(HttpMethod::Delete, "", Params::new().with("id", 1))
        .await;
    assert_eq!(result.kind(), ResultKind::RequestFailed);
    assert_eq!(result.message(), "request need host");
}

// --- cookies ---

#[tokio::test]
async fn server_cookies_persist_across_calls() {
    let base = spawn_server().await;
    let session = Session::default();

    let before = session
        .send(HttpMethod::Get, &format!("{base}/cookies"), Params::new())
        .await;
    assert_eq!(before.kind(), ResultKind::EmptyBody);

    let login = session
        .send(HttpMethod::Get, &format!("{base}/login"), Params::new())
        .await;
    assert_eq!(login.kind(), ResultKind::Success);
    assert_eq!(
        session.cookie_header_for(&format!("{base}/")).as_deref(),
        Some(SESSION_COOKIE)
    );

    let after = session
        .send(HttpMethod::Get, &format!("{base}/cookies"), Params::new())
        .await;
    assert_eq!(after.body(), SESSION_COOKIE);
}

#[tokio::test]
async fn sessions_do_not_share_cookies() {
    let base = spawn_server().await;
    let first = Session::default();
    let second = Session::default();

    first
        .send(HttpMethod::Get, &format!("{base}/login"), Params::new())
        .await;
    let result = second
        .send(HttpMethod::Get, &format!("{base}/cookies"), Params::new())
        .await;
    assert_eq!(result.kind(), ResultKind::EmptyBody);
}

#[tokio::test]
async fn carried_cookies_come_first_in_stored_order() {
    let base = spawn_server().await;
    let mut session = Session::default();
    session.set_cookies(vec![Cookie::new("b", "2"), Cookie::new("a", "1")]);

    let result = session
        .send(HttpMethod::Get, &format!("{base}/cookies"), Params::new())
        .await;
    assert_eq!(result.body(), "b=2; a=1");

    session
        .send(HttpMethod::Get, &format!("{base}/login"), Params::new())
        .await;
    let result = session
        .send(HttpMethod::Get, &format!("{base}/cookies"), Params::new())
        .await;
    assert_eq!(result.body(), format!("b=2; a=1; {SESSION_COOKIE}"));
}

// --- deadlines ---

#[tokio::test]
async fn call_deadline_expiry_is_request_failed() {
    let base = spawn_server().await;
    let session = Session::default();

    let request = OutboundRequest::new(HttpMethod::Get, format!("{base}/slow"), Params::new())
        .deadline(Instant::now() + Duration::from_millis(50));
    let result = session.send_with(request).await;
    assert_eq!(result.kind(), ResultKind::RequestFailed);
    assert!(!result.message().is_empty());
}

#[tokio::test]
async fn session_timeout_expiry_is_request_failed() {
    let base = spawn_server().await;
    let session = Session::new(SessionConfig::default().with_timeout(Duration::from_millis(50)));

    let result = session
        .send(HttpMethod::Get, &format!("{base}/slow"), Params::new())
        .await;
    assert_eq!(result.kind(), ResultKind::RequestFailed);
}

#[tokio::test]
async fn generous_deadline_lets_slow_call_finish() {
    let base = spawn_server().await;
    let request = OutboundRequest::new(HttpMethod::Get, format!("{base}/slow"), Params::new())
        .deadline(Instant::now() + Duration::from_secs(10));
    let result = Session::default().send_with(request).await;
    assert_eq!(result.body(), "late");
}

// --- proxy routing ---

#[tokio::test]
async fn proxied_requests_go_through_configured_proxy() {
    // The mock server routes on the path alone, so it can stand in for a
    // forward proxy: an absolute-form request for /ok still hits `ok`.
    let base = spawn_server().await;
    let session = Session::new(SessionConfig::default().with_proxy(true).with_proxy_url(&base));

    let result = session
        .send(HttpMethod::Get, "http://upstream.invalid/ok", Params::new())
        .await;
    assert_eq!(result.kind(), ResultKind::Success);
    assert_eq!(result.body(), "ok");
}

#[tokio::test]
async fn per_call_override_bypasses_proxy() {
    let base = spawn_server().await;
    let dead_proxy = format!("http://{}", closed_addr());
    let session = Session::new(
        SessionConfig::default()
            .with_proxy(true)
            .with_proxy_url(dead_proxy),
    );

    let proxied = session
        .send(HttpMethod::Get, &format!("{base}/ok"), Params::new())
        .await;
    assert_eq!(proxied.kind(), ResultKind::RequestFailed);

    let request =
        OutboundRequest::new(HttpMethod::Get, format!("{base}/ok"), Params::new()).use_proxy(false);
    let direct = session.send_with(request).await;
    assert_eq!(direct.body(), "ok");
}

// --- service ---

#[tokio::test]
async fn service_verbs_dispatch_to_matching_methods() {
    let base = spawn_server().await;
    let service = Service::new(SessionConfig::default());
    let url = format!("{base}/echo");

    let get = service.get(&url, Params::new()).await;
    assert_eq!(echo_of(get.body()).method, "GET");
    let post = service.post(&url, Params::new()).await;
    assert_eq!(echo_of(post.body()).method, "POST");
    let put = service.put(&url, Params::new()).await;
    assert_eq!(echo_of(put.body()).method, "PUT");
    let delete = service.delete(&url, Params::new()).await;
    assert_eq!(echo_of(delete.body()).method, "DELETE");
}

#[tokio::test]
async fn service_keeps_cookies_between_verbs() {
    let base = spawn_server().await;
    let service = Service::default();

    service.get(&format!("{base}/login"), Params::new()).await;
    let result = service.get(&format!("{base}/cookies"), Params::new()).await;
    assert_eq!(result.body(), SESSION_COOKIE);
}
