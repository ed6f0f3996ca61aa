//! The uniform outcome of every request issued through a session.

use serde::{Deserialize, Serialize};

/// Classification of a request outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Success,
    /// No host, an unbuildable request, or a transport-level failure.
    RequestFailed,
    /// The server answered with something other than 200.
    BadStatus,
    /// The server answered 200 with no payload.
    EmptyBody,
}

/// Normalized outcome of a request.
///
/// `body` is non-empty exactly when `kind` is `Success`; the constructors are
/// the only way to build a value, so the invariant always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedResult {
    kind: ResultKind,
    message: String,
    body: String,
}

impl NormalizedResult {
    /// A 200 response carrying `body`. An empty body becomes `EmptyBody`.
    pub fn from_body(body: String) -> Self {
        if body.is_empty() {
            return Self::empty_body();
        }
        Self {
            kind: ResultKind::Success,
            message: String::new(),
            body,
        }
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::RequestFailed,
            message: message.into(),
            body: String::new(),
        }
    }

    pub fn bad_status(status: u16) -> Self {
        Self {
            kind: ResultKind::BadStatus,
            message: format!("rsp status code: {status}"),
            body: String::new(),
        }
    }

    pub fn empty_body() -> Self {
        Self {
            kind: ResultKind::EmptyBody,
            message: "rsp content empty".to_string(),
            body: String::new(),
        }
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_success(&self) -> bool {
        self.kind == ResultKind::Success
    }

    /// `Ok(body)` on success, the whole result otherwise.
    pub fn into_result(self) -> Result<String, NormalizedResult> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(self)
        }
    }
}
