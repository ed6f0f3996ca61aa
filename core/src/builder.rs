//! Turns a method, a target and parameters into a ready-to-send `HttpRequest`.
//!
//! # Design
//! GET requests carry their parameters in the query string, plus a `uuid`
//! parameter holding the call's correlation id. POST, PUT and DELETE send the
//! parameters as a form-encoded body and do not get a `uuid` parameter
//! unless the caller supplied one. Carried cookies become a single `cookie`
//! header in the order they were stored.

use std::time::Instant;

use url::{form_urlencoded, Url};
use uuid::Uuid;

use crate::error::BuildError;
use crate::http::{cookie_header, Cookie, HttpMethod, HttpRequest};
use crate::params::Params;

/// Query parameter that carries the correlation id on GET requests.
pub const CORRELATION_KEY: &str = "uuid";

/// Content type of form-encoded request bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A fresh random (version 4) correlation id.
pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Everything a caller can say about a single request.
///
/// Only `method`, `url` and `params` are required; the rest fall back to the
/// session's defaults.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub params: Params,
    /// Generated per call when `None`.
    pub correlation_id: Option<String>,
    /// Overrides the session's proxy flag for this call.
    pub use_proxy: Option<bool>,
    /// Point in time after which the call is abandoned as `RequestFailed`.
    pub deadline: Option<Instant>,
}

impl OutboundRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>, params: Params) -> Self {
        Self {
            method,
            url: url.into(),
            params,
            correlation_id: None,
            use_proxy: None,
            deadline: None,
        }
    }

    pub fn correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn use_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = Some(use_proxy);
        self
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Assemble the wire-level request.
///
/// Fails with `BuildError::MissingHost` for an empty target and
/// `BuildError::InvalidUrl` when the target does not parse.
pub fn build_request(
    method: HttpMethod,
    url: &str,
    params: &Params,
    correlation_id: &str,
    cookies: &[Cookie],
) -> Result<HttpRequest, BuildError> {
    if url.is_empty() {
        return Err(BuildError::MissingHost);
    }
    let mut target = Url::parse(url).map_err(|e| BuildError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let mut encoded = params.encode();
    let mut headers = Vec::new();

    let body = if method.sends_form_body() {
        headers.push(("content-type".to_string(), FORM_CONTENT_TYPE.to_string()));
        Some(
            form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&encoded)
                .finish(),
        )
    } else {
        encoded.insert(CORRELATION_KEY.to_string(), correlation_id.to_string());
        target.query_pairs_mut().extend_pairs(&encoded);
        None
    };

    if let Some(cookie) = cookie_header(cookies) {
        headers.push(("cookie".to_string(), cookie));
    }

    Ok(HttpRequest {
        method,
        url: target.into(),
        headers,
        body,
    })
}
