//! Error types for the outbound pipeline and the channel cache.
//!
//! # Design
//! The request pipeline never surfaces these to its callers directly: every
//! failure is folded into a `NormalizedResult` at the pipeline boundary.
//! `BuildError` and `ParamError` therefore carry the exact diagnostic text the
//! caller will later see in `NormalizedResult::message`. `CacheError` and
//! `ConfigError` are returned as plain `Result`s.

use std::error::Error as StdError;

use thiserror::Error;

/// A parameter map contained a value kind that has no form encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// A value was a float, boolean, null, array or object.
    #[error("unsupported value for parameter `{key}`: {kind}")]
    Unsupported { key: String, kind: &'static str },

    /// The parameter container itself was not a key/value object.
    #[error("parameters must be an object, got {0}")]
    NotAnObject(&'static str),
}

/// The request could not be assembled, so no transport call was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("request need host")]
    MissingHost,

    #[error("invalid request url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Params(#[from] ParamError),
}

/// A method name was not one of GET, POST, PUT, DELETE.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported http method `{0}`")]
pub struct UnknownMethod(pub String);

/// Failures raised before or while exchanging bytes with the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The underlying HTTP client could not be constructed.
    #[error("build http client: {0}")]
    Client(String),

    /// The caller's deadline had already passed when the request was issued.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// A 200 response whose body is not valid UTF-8.
    #[error("rsp content not utf-8: {0}")]
    InvalidBody(String),

    /// Connection, DNS, timeout or protocol failure, with its cause chain.
    #[error("{0}")]
    Send(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Send(error_chain(&err))
    }
}

/// Errors returned by `ConnectionCache::get`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("invalid channel address `{address}`: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("channel dial to `{address}` failed: {reason}")]
    Dial { address: String, reason: String },
}

/// A configuration value read from the environment could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: `{value}`")]
    InvalidEnv { var: &'static str, value: String },
}

/// Render an error followed by each distinct cause, separated by `: `.
///
/// Transport crates tend to wrap the interesting part (e.g. "connection
/// refused") a few levels deep, so the top-level `Display` alone is rarely
/// useful as a diagnostic.
pub(crate) fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
