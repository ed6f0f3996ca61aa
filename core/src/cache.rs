//! One reusable RPC channel per address.
//!
//! # Design
//! A single async mutex guards the address map and is held across the dial,
//! so concurrent first requests serialise and exactly one channel is ever
//! created per address. Entries are never evicted, refreshed or closed. A
//! failed dial inserts nothing and is returned to the caller, which decides
//! whether to retry or abort.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tonic::transport::{Channel, Endpoint};
use tracing::{error, info};

use crate::error::{error_chain, CacheError};

/// Establishes a channel to an address.
#[async_trait]
pub trait Dialer: Send + Sync {
    type Channel: Clone + Send + Sync + 'static;

    /// Resolve once the channel is ready or setup has failed.
    async fn dial(&self, address: &str) -> Result<Self::Channel, CacheError>;
}

/// Plaintext gRPC dialer.
///
/// Addresses may be given as `host:port`; `http://` is assumed when no scheme
/// is present.
#[derive(Debug, Clone, Default)]
pub struct GrpcDialer {
    connect_timeout: Option<Duration>,
}

impl GrpcDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

pub(crate) fn endpoint_uri(address: &str) -> String {
    if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{address}")
    }
}

#[async_trait]
impl Dialer for GrpcDialer {
    type Channel = Channel;

    async fn dial(&self, address: &str) -> Result<Channel, CacheError> {
        let mut endpoint =
            Endpoint::from_shared(endpoint_uri(address)).map_err(|e| CacheError::InvalidAddress {
                address: address.to_string(),
                reason: e.to_string(),
            })?;
        if let Some(timeout) = self.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }
        endpoint.connect().await.map_err(|e| CacheError::Dial {
            address: address.to_string(),
            reason: error_chain(&e),
        })
    }
}

pub struct ConnectionCache<D: Dialer = GrpcDialer> {
    dialer: D,
    channels: Mutex<HashMap<String, D::Channel>>,
}

impl<D: Dialer> ConnectionCache<D> {
    pub fn new(dialer: D) -> Self {
        Self {
            dialer,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// The channel for `address`, dialing it on first request.
    pub async fn get(&self, address: &str) -> Result<D::Channel, CacheError> {
        let mut channels = self.channels.lock().await;
        if let Some(channel) = channels.get(address) {
            return Ok(channel.clone());
        }

        let channel = match self.dialer.dial(address).await {
            Ok(channel) => channel,
            Err(err) => {
                error!(address, error = %err, "channel dial failed");
                return Err(err);
            }
        };
        info!(address, "channel created");
        channels.insert(address.to_string(), channel.clone());
        Ok(channel)
    }

    pub async fn contains(&self, address: &str) -> bool {
        self.channels.lock().await.contains_key(address)
    }

    pub async fn len(&self) -> usize {
        self.channels.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.channels.lock().await.is_empty()
    }
}

impl Default for ConnectionCache<GrpcDialer> {
    fn default() -> Self {
        Self::new(GrpcDialer::new())
    }
}

impl ConnectionCache<GrpcDialer> {
    /// Process-wide gRPC channel cache, created on first use.
    pub fn global() -> &'static ConnectionCache<GrpcDialer> {
        static GLOBAL: OnceLock<ConnectionCache<GrpcDialer>> = OnceLock::new();
        GLOBAL.get_or_init(ConnectionCache::default)
    }
}

impl<D: Dialer + std::fmt::Debug> std::fmt::Debug for ConnectionCache<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCache")
            .field("dialer", &self.dialer)
            .finish_non_exhaustive()
    }
}
