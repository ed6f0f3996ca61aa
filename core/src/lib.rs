//! Outbound HTTP request pipeline with normalized results, plus a keyed RPC
//! channel cache.
//!
//! # Overview
//! A caller hands a `Session` a method, a target URL and a parameter map and
//! always gets back a `NormalizedResult`: `Success`, `RequestFailed`,
//! `BadStatus` or `EmptyBody`. Nothing in the pipeline returns `Err`.
//!
//! # Design
//! - `params` encodes a closed set of scalar values (integers, strings).
//! - `builder` turns (method, url, params) into a plain-data `HttpRequest`:
//!   query string for GET (with a `uuid` correlation id), form body otherwise.
//! - `transport` lazily builds one reqwest client per route (direct or
//!   proxied), all sharing one persistent cookie jar (`jar`) that refuses
//!   cookies scoped to a public suffix.
//! - `classify` maps the outcome onto the four result kinds.
//! - `session` is the caller-owned context tying these together; `service`
//!   adds per-verb wrappers.
//! - `cache` is independent of the pipeline: one reusable channel per address.

pub mod builder;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod jar;
pub mod params;
pub mod result;
pub mod service;
pub mod session;
pub mod transport;

pub use builder::{build_request, OutboundRequest, CORRELATION_KEY, FORM_CONTENT_TYPE};
pub use cache::{ConnectionCache, Dialer, GrpcDialer};
pub use config::{CustomConfig, SessionConfig, DEFAULT_PROXY_URL};
pub use error::{
    BuildError, CacheError, ConfigError, ParamError, TransportError, UnknownMethod,
};
pub use http::{Cookie, HttpMethod, HttpRequest};
pub use jar::SessionJar;
pub use params::{ParamValue, Params};
pub use result::{NormalizedResult, ResultKind};
pub use service::Service;
pub use session::Session;
pub use transport::TransportClient;
