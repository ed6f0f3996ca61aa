use std::{collections::BTreeMap, time::Duration};

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_millis(500);

/// Body served by `/binary`; not valid UTF-8.
pub const BINARY_BODY: &[u8] = &[0xff, 0xfe, b'o', b'k'];

/// Cookie set by `/login`.
pub const SESSION_COOKIE: &str = "session=abc123";

/// What `/echo` saw: the method, the content type, and the decoded query
/// (GET) or form body (everything else).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub params: BTreeMap<String, String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/ok", any(ok))
        .route(
            "/echo",
            get(echo).post(echo).put(echo).delete(echo),
        )
        .route("/status/{code}", any(status))
        .route("/empty", any(empty))
        .route("/binary", get(binary))
        .route("/login", get(login))
        .route("/cookies", get(cookies))
        .route("/slow", get(slow))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn ok() -> &'static str {
    "ok"
}

async fn echo(
    method: Method,
    headers: HeaderMap,
    Form(params): Form<BTreeMap<String, String>>,
) -> Json<Echo> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(Echo {
        method: method.to_string(),
        content_type,
        params,
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, &'static str) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, "status body")
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn binary() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], BINARY_BODY)
}

async fn login() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, format!("{SESSION_COOKIE}; Path=/"))],
        "logged in",
    )
}

/// The raw `cookie` header, or an empty body when none was sent.
async fn cookies(headers: HeaderMap) -> String {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn slow() -> &'static str {
    tokio::time::sleep(SLOW_DELAY).await;
    "late"
}
