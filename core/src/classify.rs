//! Maps a transport outcome onto one of the four `ResultKind`s.
//!
//! Single step, no retries:
//! 1. transport error            -> `RequestFailed` with the error text
//! 2. status other than 200      -> `BadStatus` ("rsp status code: N")
//! 3. 200 with a zero-length body -> `EmptyBody` ("rsp content empty")
//! 4. 200 with a non-UTF-8 body   -> `RequestFailed` ("rsp content not utf-8: ...")
//! 5. otherwise                  -> `Success` with the raw body

use tracing::warn;

use crate::error::TransportError;
use crate::result::NormalizedResult;

/// The only status code treated as success.
pub const SUCCESS_STATUS: u16 = 200;

/// Classify by status alone. `None` means the body must be read.
pub fn check_status(status: u16) -> Option<NormalizedResult> {
    if status == SUCCESS_STATUS {
        None
    } else {
        Some(NormalizedResult::bad_status(status))
    }
}

/// Classify an already-read response.
pub fn classify_parts(status: u16, body: String) -> NormalizedResult {
    check_status(status).unwrap_or_else(|| NormalizedResult::from_body(body))
}

/// Classify the bytes of a 200 response body.
///
/// Bodies are never decoded lossily; invalid UTF-8 is a failed request.
pub fn classify_body(body: &[u8]) -> NormalizedResult {
    if body.is_empty() {
        return NormalizedResult::empty_body();
    }
    match std::str::from_utf8(body) {
        Ok(text) => NormalizedResult::from_body(text.to_string()),
        Err(err) => {
            let err = TransportError::InvalidBody(err.to_string());
            warn!(error = %err, len = body.len(), "response body rejected");
            NormalizedResult::request_failed(err.to_string())
        }
    }
}

/// Finish a request: inspect the status, read the body if it matters.
///
/// The response is consumed on every path, which releases its connection.
pub async fn classify(outcome: Result<reqwest::Response, TransportError>) -> NormalizedResult {
    let response = match outcome {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "request failed");
            return NormalizedResult::request_failed(err.to_string());
        }
    };

    let status = response.status().as_u16();
    if let Some(result) = check_status(status) {
        warn!(status, url = %response.url(), "unexpected response status");
        return result;
    }

    match response.bytes().await {
        Ok(body) => classify_body(&body),
        Err(err) => {
            let err = TransportError::from(err);
            warn!(error = %err, "reading response body failed");
            NormalizedResult::request_failed(err.to_string())
        }
    }
}
