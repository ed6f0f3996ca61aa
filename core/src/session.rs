//! The caller-owned context every request flows through.
//!
//! # Design
//! A `Session` bundles configuration, the transport with its persistent
//! cookie jar, and the list of cookies carried explicitly on every request.
//! Nothing is global: a caller that wants isolated cookie state creates
//! another session. Sending takes `&self`; the jar synchronises internally,
//! so one session can serve concurrent calls.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::builder::{build_request, new_correlation_id, OutboundRequest};
use crate::classify::classify;
use crate::config::{CustomConfig, SessionConfig};
use crate::error::{BuildError, TransportError};
use crate::http::{Cookie, HttpMethod};
use crate::params::Params;
use crate::result::NormalizedResult;
use crate::transport::TransportClient;

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    transport: TransportClient,
    cookies: Vec<Cookie>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            transport: TransportClient::new(config.proxy_url.clone()),
            config,
            cookies: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn set_use_proxy(&mut self, use_proxy: bool) {
        self.config.use_proxy = use_proxy;
    }

    pub fn set_custom_config(&mut self, custom: CustomConfig) {
        self.config.custom = custom;
    }

    /// Cookies attached to every outgoing request, in send order.
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn set_cookies(&mut self, cookies: Vec<Cookie>) {
        self.cookies = cookies;
    }

    pub fn add_cookie(&mut self, cookie: Cookie) {
        self.cookies.push(cookie);
    }

    /// What the persistent jar currently holds for `url`.
    pub fn cookie_header_for(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        self.transport.jar_cookies(&url)
    }

    pub async fn send(&self, method: HttpMethod, url: &str, params: Params) -> NormalizedResult {
        self.send_with(OutboundRequest::new(method, url, params))
            .await
    }

    /// Like `send`, for parameters that arrive as a JSON object.
    ///
    /// Values other than integers and strings yield `RequestFailed` without
    /// any network call.
    pub async fn send_json(&self, method: HttpMethod, url: &str, params: &Value) -> NormalizedResult {
        match Params::from_json(params) {
            Ok(params) => self.send(method, url, params).await,
            Err(err) => {
                let err = BuildError::from(err);
                warn!(%method, url, error = %err, "rejected request parameters");
                NormalizedResult::request_failed(err.to_string())
            }
        }
    }

    pub async fn send_with(&self, request: OutboundRequest) -> NormalizedResult {
        let correlation_id = request
            .correlation_id
            .clone()
            .unwrap_or_else(new_correlation_id);
        let use_proxy = request.use_proxy.unwrap_or(self.config.use_proxy);

        let http_request = match build_request(
            request.method,
            &request.url,
            &request.params,
            &correlation_id,
            &self.cookies,
        ) {
            Ok(http_request) => http_request,
            Err(err) => {
                warn!(method = %request.method, url = %request.url, error = %err, "request not sent");
                return NormalizedResult::request_failed(err.to_string());
            }
        };

        let timeout = match effective_timeout(self.config.timeout(), request.deadline) {
            Ok(timeout) => timeout,
            Err(err) => {
                warn!(method = %request.method, url = %request.url, error = %err, "request not sent");
                return NormalizedResult::request_failed(err.to_string());
            }
        };

        debug!(
            method = %http_request.method,
            url = %http_request.url,
            correlation_id = %correlation_id,
            use_proxy,
            "sending request"
        );
        let started = Instant::now();
        let outcome = self
            .transport
            .execute(&http_request, use_proxy, timeout)
            .await;
        let result = classify(outcome).await;
        debug!(
            method = %http_request.method,
            correlation_id = %correlation_id,
            kind = ?result.kind(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request finished"
        );
        result
    }
}

/// The tighter of the session timeout and the time left until `deadline`.
fn effective_timeout(
    session: Option<Duration>,
    deadline: Option<Instant>,
) -> Result<Option<Duration>, TransportError> {
    let remaining = match deadline {
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::DeadlineExceeded);
            }
            Some(remaining)
        }
        None => None,
    };
    Ok(match (session, remaining) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    })
}
