//! Transport capability and the adapter that drives it.
//!
//! The **transport** performs the actual network transfer: connection setup, TLS, HTTP framing
//! and redirect following. It is a blocking capability: one [`Transport::perform`] call per
//! request, delivering the response through a [`TransportSink`] as it arrives.
//!
//! The **adapter** ([`TransportAdapter`]) sits between the client pipeline and the transport.
//! It translates a [`Request`](crate::request::Request) into a [`TransportRequest`] under a
//! fixed policy that callers cannot loosen:
//!
//! - only `http` and `https` URLs (and redirect targets) are accepted;
//! - TLS 1.2 or newer, with certificate and hostname verification;
//! - `timeout_ms` bounds the whole call, `connect_timeout_ms` the connection setup;
//! - a non-empty body without `Content-Type` is sent as `application/json`.
//!
//! The default transport is [`HttpTransport`], built on the `reqwest` blocking client.
//! Custom transports (test doubles, other HTTP stacks) implement [`Transport`] and are plugged
//! in with [`ClientBuilder::transport`](crate::client::ClientBuilder::transport).

mod adapter;
mod http_transport;

use std::time::Duration;

use http::HeaderMap;
use url::Url;

use crate::request::Method;

pub use adapter::{ResponseSink, TransportAdapter};
pub use http_transport::HttpTransport;

/// Schemes the transport is allowed to speak.
pub const ALLOWED_SCHEMES: [&str; 2] = ["http", "https"];

pub fn is_allowed_scheme(scheme: &str) -> bool {
    ALLOWED_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TlsVersion {
    Tls12,
    Tls13,
}

/// TLS requirements handed to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsPolicy {
    pub min_version: TlsVersion,
    /// Verify the peer's certificate chain.
    pub verify_peer: bool,
    /// Verify that the certificate matches the host name.
    pub verify_host: bool,
}

impl TlsPolicy {
    /// The only policy the adapter ever issues.
    pub const HARDENED: TlsPolicy = TlsPolicy {
        min_version: TlsVersion::Tls12,
        verify_peer: true,
        verify_host: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Hand 3xx responses back as they are.
    None,
    /// Follow at most this many redirects. Exceeding it is a transport failure.
    Limited(u32),
}

/// Everything a transport needs for one call, after policy has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub redirect: RedirectPolicy,
    pub tls: TlsPolicy,
}

/// Receives the response while the transfer is in progress.
pub trait TransportSink {
    /// Called zero or more times, in order, with arbitrary-sized pieces of the body.
    fn write_body(&mut self, chunk: &[u8]);

    /// Called once per raw header line, e.g. `b"Content-Type: text/html\r\n"`. The status
    /// line and the terminating empty line are delivered too.
    fn write_header_line(&mut self, line: &[u8]);
}

/// What a successful transfer reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOutcome {
    pub status_code: u16,
    pub elapsed: Duration,
    /// Final URL after redirects, if known.
    pub final_url: Option<Url>,
}

/// A transport-level failure (DNS, connect, TLS, timeout, ...), carried as the transport's
/// own diagnostic string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self(message.into())
    }
}

/// A blocking network transport.
///
/// `perform` runs the whole transfer before returning. Implementations must honor the
/// deadlines and [`TlsPolicy`] in the request and must not return before the transfer
/// completed or failed.
pub trait Transport: Send + Sync {
    fn perform(
        &self,
        req: &TransportRequest,
        sink: &mut dyn TransportSink,
    ) -> Result<TransportOutcome, TransportError>;
}
