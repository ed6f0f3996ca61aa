//! The session cookie jar, backed by a public-suffix-aware `cookie_store`.
//!
//! # Design
//! reqwest's built-in `Jar` accepts a `Domain` attribute naming any parent of
//! the request host, including registry suffixes such as `co.uk`. This jar
//! loads the public suffix list once per process and hands each store its own
//! copy, so a cookie scoped to a public suffix is rejected on arrival.

use std::sync::OnceLock;

use cookie_store::{CookieStore as Store, RawCookie};
use parking_lot::RwLock;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use tracing::{trace, warn};
use url::Url;

static PUBLIC_SUFFIX_DATA: &[u8] = include_bytes!("../data/public_suffix_list.dat");

fn public_suffix_list() -> Option<publicsuffix::List> {
    static LIST: OnceLock<Option<publicsuffix::List>> = OnceLock::new();
    LIST.get_or_init(|| match publicsuffix::List::from_bytes(PUBLIC_SUFFIX_DATA) {
        Ok(list) => Some(list),
        Err(err) => {
            warn!(error = %err, "public suffix list unusable, domain cookies unchecked");
            None
        }
    })
    .clone()
}

pub struct SessionJar {
    store: RwLock<Store>,
}

impl SessionJar {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store::new_with_public_suffix(public_suffix_list())),
        }
    }

    /// Store a `Set-Cookie` style string as if `url` had sent it.
    ///
    /// Returns whether the cookie was accepted.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) -> bool {
        match self.store.write().parse(cookie, url) {
            Ok(_) => true,
            Err(err) => {
                trace!(error = %err, %url, "cookie rejected");
                false
            }
        }
    }

    /// Cookies that would be sent to `url`, as a `cookie` header value.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let store = self.store.read();
        let pairs: Vec<String> = store
            .get_request_values(url)
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

impl Default for SessionJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies = cookie_headers.filter_map(|value| {
            std::str::from_utf8(value.as_bytes())
                .ok()
                .and_then(|text| RawCookie::parse(text).ok())
                .map(RawCookie::into_owned)
        });
        self.store.write().store_response_cookies(cookies, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.header_for(url)
            .and_then(|header| HeaderValue::from_str(&header).ok())
    }
}

impl std::fmt::Debug for SessionJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionJar")
            .field("cookies", &self.store.read().iter_any().count())
            .finish()
    }
}
