//! Lazily built HTTP clients sharing one persistent cookie jar.
//!
//! # Design
//! A transport owns up to two `reqwest::Client`s, one direct and one routed
//! through the configured proxy. Each is built on first use and reused after
//! that. Both are bound to the same `SessionJar`, so cookies set by a server
//! accumulate across calls regardless of which route a call took.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use reqwest::header::COOKIE;
use tracing::debug;
use url::Url;

use crate::error::TransportError;
use crate::http::HttpRequest;
use crate::jar::SessionJar;

pub struct TransportClient {
    jar: Arc<SessionJar>,
    proxy_url: String,
    direct: OnceLock<reqwest::Client>,
    proxied: OnceLock<reqwest::Client>,
}

impl TransportClient {
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            jar: Arc::new(SessionJar::new()),
            proxy_url: proxy_url.into(),
            direct: OnceLock::new(),
            proxied: OnceLock::new(),
        }
    }

    /// The cookie jar shared by every client this transport builds.
    pub fn jar(&self) -> &Arc<SessionJar> {
        &self.jar
    }

    /// Cookies the jar would send to `url`, as a `cookie` header value.
    pub fn jar_cookies(&self, url: &Url) -> Option<String> {
        self.jar.header_for(url)
    }

    /// The client for the given route, building it on first use.
    pub fn client(&self, use_proxy: bool) -> Result<reqwest::Client, TransportError> {
        let cell = if use_proxy {
            &self.proxied
        } else {
            &self.direct
        };
        if let Some(client) = cell.get() {
            return Ok(client.clone());
        }

        let mut builder = reqwest::Client::builder().cookie_provider(Arc::clone(&self.jar));
        builder = if use_proxy {
            let proxy = reqwest::Proxy::all(&self.proxy_url)
                .map_err(|e| TransportError::Client(e.to_string()))?;
            builder.proxy(proxy)
        } else {
            builder.no_proxy()
        };
        let client = builder
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        debug!(use_proxy, proxy_url = %self.proxy_url, "built http client");

        Ok(cell.get_or_init(|| client).clone())
    }

    /// Send `request` and return the raw response.
    ///
    /// `timeout` bounds the whole exchange including the body; the response
    /// body is left unread for the classifier.
    pub async fn execute(
        &self,
        request: &HttpRequest,
        use_proxy: bool,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response, TransportError> {
        let client = self.client(use_proxy)?;
        let mut builder = client.request(request.method.into(), &request.url);

        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case(COOKIE.as_str()) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        // reqwest skips the jar when a cookie header is already present, so
        // carried cookies and jar cookies are merged here, carried first.
        if let Some(carried) = request.header(COOKIE.as_str()) {
            let jar = Url::parse(&request.url)
                .ok()
                .and_then(|url| self.jar_cookies(&url));
            let merged = match jar {
                Some(jar) => format!("{carried}; {jar}"),
                None => carried.to_string(),
            };
            builder = builder.header(COOKIE, merged);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(builder.send().await?)
    }
}

impl std::fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportClient")
            .field("proxy_url", &self.proxy_url)
            .field("direct_built", &self.direct.get().is_some())
            .field("proxied_built", &self.proxied.get().is_some())
            .finish()
    }
}
