//! Outbound request description.
//!
//! A [`Request`] is a plain value: build it, hand it to
//! [`Client::request`](crate::client::Client::request), and the pipeline works on its own copy.
//! Interceptors may rewrite any field before the transfer starts.
//!
//! ```
//! use locosync::request::{Method, Request};
//!
//! let req = Request::post("https://example.com/items")
//!     .header("Authorization", "Bearer token")
//!     .body(r#"{"name":"pikachu"}"#)
//!     .timeout_ms(5_000);
//!
//! assert_eq!(req.method, Method::Post);
//! assert_eq!(req.connect_timeout_ms, 2_000);
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use log::warn;
use serde::Serialize;

use crate::errors::LocoError;

/// Default total-call deadline in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default connection-establishment deadline in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;
/// Default maximum number of redirects to follow.
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = LocoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(LocoError::InvalidMethod(s.to_string())),
        }
    }
}

/// A single outbound HTTP call.
///
/// `timeout_ms >= connect_timeout_ms` is expected but not enforced here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Target URL. Only `http` and `https` URLs are accepted by the transport.
    pub url: String,
    pub method: Method,
    /// Case-insensitive; a header set twice keeps the last value.
    pub headers: HeaderMap,
    /// Opaque payload. Empty means no body is sent.
    pub body: Vec<u8>,
    /// Deadline for the whole call.
    pub timeout_ms: u64,
    /// Deadline for establishing the connection.
    pub connect_timeout_ms: u64,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    /// First name passed to [`Request::header`] that did not form a legal header. The call
    /// is refused when this is set.
    invalid_header: Option<String>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: Method::Get,
            headers: HeaderMap::new(),
            body: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            invalid_header: None,
        }
    }
}

impl Request {
    pub fn new<S: Into<String>>(method: Method, url: S) -> Self {
        Self {
            url: url.into(),
            method,
            ..Default::default()
        }
    }

    pub fn get<S: Into<String>>(url: S) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post<S: Into<String>>(url: S) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put<S: Into<String>>(url: S) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn patch<S: Into<String>>(url: S) -> Self {
        Self::new(Method::Patch, url)
    }

    pub fn delete<S: Into<String>>(url: S) -> Self {
        Self::new(Method::Delete, url)
    }

    /// Sets a header, replacing any earlier value under the same name.
    ///
    /// A name or value that cannot appear on the wire is not stored. The request remembers
    /// it and resolves with an `Invalid header` error instead of being sent.
    pub fn header<K: AsRef<str>, V: AsRef<str>>(mut self, name: K, value: V) -> Self {
        let name = name.as_ref();
        let parsed = HeaderName::from_bytes(name.as_bytes())
            .ok()
            .zip(HeaderValue::from_str(value.as_ref()).ok());

        match parsed {
            Some((name, value)) => {
                self.headers.insert(name, value);
            }
            None => {
                warn!("ignoring invalid header '{name}'");
                if self.invalid_header.is_none() {
                    self.invalid_header = Some(name.to_string());
                }
            }
        }
        self
    }

    /// Name of the first header rejected by [`Request::header`], if any.
    pub fn invalid_header(&self) -> Option<&str> {
        self.invalid_header.as_deref()
    }

    pub fn body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// Serializes `value` as the request body. The `Content-Type` is left to the transport
    /// adapter, which defaults it to `application/json` when missing.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, LocoError> {
        self.body = serde_json::to_vec(value)?;
        Ok(self)
    }

    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = max;
        self
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
