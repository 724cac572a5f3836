//! locosync: a small HTTP client framework built around an interceptor pipeline.
//!
//! Build a [`Request`], hand it to a [`Client`], and get a [`ResponseHandle`] back right away.
//! The call runs on a shared worker pool: request interceptors, the transfer, then response
//! interceptors. All outcomes, failures included, arrive as a [`Response`].
//!
//! ```no_run
//! use locosync::{Client, Request};
//!
//! let client = Client::create();
//! let res = client
//!     .request(Request::get("https://pokeapi.co/api/v2/pokemon/pikachu").timeout_ms(5_000))
//!     .wait();
//!
//! if res.ok() {
//!     println!("{}", res.json()["name"]);
//! } else {
//!     eprintln!("{} {}", res.status_code, res.error_message);
//! }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod interceptor;
pub mod request;
pub mod response;
pub mod transport;

/// Header types used by [`Request`] and [`Response`], re-exported from the `http` crate.
pub use http::header;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use client::{Client, ClientBuilder, ResponseHandle};
pub use config::{ClientConfig, ClientConfigError};
pub use errors::LocoError;
pub use interceptor::Interceptor;
pub use request::{Method, Request};
pub use response::Response;
pub use transport::{Transport, TransportAdapter};
