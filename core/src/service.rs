//! Per-verb convenience wrappers over a `Session`.

use crate::config::{CustomConfig, SessionConfig};
use crate::http::HttpMethod;
use crate::params::Params;
use crate::result::NormalizedResult;
use crate::session::Session;

/// Issues GET/POST/PUT/DELETE calls through one owned session.
#[derive(Debug, Default)]
pub struct Service {
    session: Session,
}

impl Service {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            session: Session::new(config),
        }
    }

    pub fn set_use_proxy(&mut self, use_proxy: bool) {
        self.session.set_use_proxy(use_proxy);
    }

    /// Record the status/message labels callers use when rendering results.
    pub fn set_custom_config(
        &mut self,
        status_symbol: impl Into<String>,
        message_symbol: impl Into<String>,
    ) {
        self.session.set_custom_config(CustomConfig {
            status_symbol: status_symbol.into(),
            message_symbol: message_symbol.into(),
        });
    }

    pub fn custom_config(&self) -> &CustomConfig {
        &self.session.config().custom
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn get(&self, url: &str, params: Params) -> NormalizedResult {
        self.session.send(HttpMethod::Get, url, params).await
    }

    pub async fn post(&self, url: &str, params: Params) -> NormalizedResult {
        self.session.send(HttpMethod::Post, url, params).await
    }

    pub async fn put(&self, url: &str, params: Params) -> NormalizedResult {
        self.session.send(HttpMethod::Put, url, params).await
    }

    pub async fn delete(&self, url: &str, params: Params) -> NormalizedResult {
        self.session.send(HttpMethod::Delete, url, params).await
    }
}
