//! Client configuration.
//!
//! `ClientConfig` controls the defaults a [`Client`](crate::client::Client) applies to the
//! requests it builds through its verb shorthands, and the `User-Agent` it sends when a
//! request carries none. It provides defaults via [`Default`] and a fluent
//! [`ClientConfig::builder()`] with validation.
//!
//! ```rust
//! use locosync::config::ClientConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ClientConfig::builder()
//!     .user_agent("pokedex/1.0")
//!     .default_timeout_ms(5_000)
//!     .default_connect_timeout_ms(1_000)
//!     .build()?; // returns Result<ClientConfig, ClientConfigError>
//! assert_eq!(cfg.default_timeout_ms, 5_000);
//! # Ok(()) }
//! ```
//!
//! # Fields
//! - `user_agent`: `User-Agent` added to requests without one (default `locosync/<version>`,
//!   `None` sends no default).
//! - `default_timeout_ms`: total deadline for shorthand requests (default 10000).
//! - `default_connect_timeout_ms`: connect deadline for shorthand requests (default 2000).
//!
//! Requests built by hand and passed to `Client::request` keep their own timeouts.
//!
//! # Errors
//!
//! [`ClientConfigError`] is returned when a timeout is zero or when the connect timeout is
//! larger than the total timeout.

use std::fmt;

use crate::request::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_TIMEOUT_MS};
use crate::VERSION;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    pub default_timeout_ms: u64,
    pub default_connect_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(format!("locosync/{VERSION}")),
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            default_connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    inner: ClientConfig,
}

impl ClientConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ClientConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = Some(ua.into())) }
    pub fn no_user_agent(self) -> Self { self.map(|c| c.user_agent = None) }
    pub fn default_timeout_ms(self, ms: u64) -> Self { self.map(|c| c.default_timeout_ms = ms) }
    pub fn default_connect_timeout_ms(self, ms: u64) -> Self { self.map(|c| c.default_connect_timeout_ms = ms) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ClientConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientConfigError {
    ZeroTimeout,
    ZeroConnectTimeout,
    ConnectExceedsTotal { connect: u64, total: u64 },
}

impl fmt::Display for ClientConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientConfigError::ZeroTimeout =>
                write!(f, "default_timeout_ms must be at least 1"),
            ClientConfigError::ZeroConnectTimeout =>
                write!(f, "default_connect_timeout_ms must be at least 1"),
            ClientConfigError::ConnectExceedsTotal { connect, total } =>
                write!(f, "default_connect_timeout_ms ({connect}) > default_timeout_ms ({total})"),
        }
    }
}
impl std::error::Error for ClientConfigError {}

fn validate(c: &ClientConfig) -> Result<(), ClientConfigError> {
    if c.default_timeout_ms == 0 {
        return Err(ClientConfigError::ZeroTimeout);
    }
    if c.default_connect_timeout_ms == 0 {
        return Err(ClientConfigError::ZeroConnectTimeout);
    }
    if c.default_connect_timeout_ms > c.default_timeout_ms {
        return Err(ClientConfigError::ConnectExceedsTotal {
            connect: c.default_connect_timeout_ms,
            total: c.default_timeout_ms,
        });
    }
    Ok(())
}
