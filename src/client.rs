//! The client: owns the interceptor chain and runs the request pipeline.
//!
//! Every call goes through the same sequence, executed as one unit of work on the shared
//! blocking pool:
//!
//! 1. the request is moved into the task, which works on it as its own local copy;
//! 2. each interceptor's `on_request` runs, in registration order;
//! 3. the [`TransportAdapter`] performs the transfer and produces a [`Response`];
//! 4. each interceptor's `on_response` runs, in the same registration order;
//! 5. the [`ResponseHandle`] resolves with the final response.
//!
//! The caller gets the handle back immediately. Concurrent calls on one client run
//! independently and may complete in any order.
//!
//! ```no_run
//! use locosync::Client;
//!
//! # async fn demo() {
//! let client = Client::create();
//! let res = client.get("https://pokeapi.co/api/v2/pokemon?limit=20").await;
//! if res.ok() {
//!     println!("{}", res.json()["count"]);
//! } else {
//!     eprintln!("failed: {} {}", res.status_code, res.error_message);
//! }
//! # }
//! ```

mod handle;
mod runtime;

use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, trace, warn};
use serde::Serialize;
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::interceptor::{Interceptor, InterceptorChain};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::transport::{HttpTransport, Transport, TransportAdapter};

pub use handle::ResponseHandle;

pub struct Client {
    config: ClientConfig,
    adapter: Arc<TransportAdapter>,
    /// Read on every dispatch, written by `add_interceptor`.
    interceptors: RwLock<InterceptorChain>,
    /// Shared runtime, or why it could not be started.
    runtime: Result<Handle, String>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("interceptors", &self.interceptor_count())
            .field("runtime", &self.runtime.as_ref().map(|_| "shared"))
            .finish()
    }
}

/// Builder for a [`Client`] with a custom configuration or transport.
///
/// ```
/// use locosync::{Client, ClientConfig};
///
/// let config = ClientConfig::builder().user_agent("pokedex/1.0").build().unwrap();
/// let client = Client::builder().config(config).build();
/// assert_eq!(client.config().user_agent.as_deref(), Some("pokedex/1.0"));
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default [`HttpTransport`].
    pub fn transport<T: Transport + 'static>(self, transport: T) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    /// Like [`ClientBuilder::transport`], for a transport that is shared elsewhere too.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Arc<Client> {
        let transport = self.transport.unwrap_or_else(|| Arc::new(HttpTransport::new()));
        Arc::new(Client::new(self.config, transport))
    }
}

impl Client {
    /// Creates a client with the default configuration and the default transport.
    pub fn create() -> Arc<Client> {
        Self::builder().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let runtime = runtime::global_init().map_err(|e| {
            warn!("{e}; requests from this client will fail");
            e.to_string()
        });

        Self {
            adapter: Arc::new(TransportAdapter::new(transport, config.user_agent.clone())),
            config,
            interceptors: RwLock::new(InterceptorChain::new()),
            runtime,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Appends an interceptor to the chain.
    ///
    /// Calls already dispatched keep the chain they started with; only later calls see the
    /// new interceptor. Registering everything before issuing requests keeps behavior simple
    /// to reason about.
    pub fn add_interceptor<I: Interceptor + 'static>(&self, interceptor: I) {
        self.interceptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(interceptor));
    }

    pub fn interceptor_count(&self) -> usize {
        self.interceptors.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn snapshot(&self) -> InterceptorChain {
        self.interceptors.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Schedules `req` and returns immediately.
    ///
    /// Never fails synchronously; every failure is reported in the resolved response's
    /// `error_message` with `status_code` 0.
    pub fn request(&self, req: Request) -> ResponseHandle {
        let runtime = match &self.runtime {
            Ok(runtime) => runtime,
            Err(e) => return ResponseHandle::ready(Response::failed(e.clone())),
        };

        let id = Uuid::new_v4();
        let chain = self.snapshot();
        let adapter = Arc::clone(&self.adapter);

        debug!("[{id}] scheduling {} {}", req.method, req.url);
        let join = runtime.spawn_blocking(move || run_pipeline(id, req, &chain, &adapter));

        ResponseHandle::pending(join)
    }

    pub fn get<S: Into<String>>(&self, url: S) -> ResponseHandle {
        self.request(self.shorthand(Method::Get, url))
    }

    pub fn head<S: Into<String>>(&self, url: S) -> ResponseHandle {
        self.request(self.shorthand(Method::Head, url))
    }

    pub fn del<S: Into<String>>(&self, url: S) -> ResponseHandle {
        self.request(self.shorthand(Method::Delete, url))
    }

    /// POSTs `body` serialized as JSON.
    pub fn post<S: Into<String>, T: Serialize + ?Sized>(&self, url: S, body: &T) -> ResponseHandle {
        self.with_json(Method::Post, url, body)
    }

    /// PUTs `body` serialized as JSON.
    pub fn put<S: Into<String>, T: Serialize + ?Sized>(&self, url: S, body: &T) -> ResponseHandle {
        self.with_json(Method::Put, url, body)
    }

    /// PATCHes `body` serialized as JSON.
    pub fn patch<S: Into<String>, T: Serialize + ?Sized>(&self, url: S, body: &T) -> ResponseHandle {
        self.with_json(Method::Patch, url, body)
    }

    fn shorthand<S: Into<String>>(&self, method: Method, url: S) -> Request {
        Request::new(method, url)
            .timeout_ms(self.config.default_timeout_ms)
            .connect_timeout_ms(self.config.default_connect_timeout_ms)
    }

    fn with_json<S: Into<String>, T: Serialize + ?Sized>(&self, method: Method, url: S, body: &T) -> ResponseHandle {
        match self.shorthand(method, url).json(body) {
            Ok(req) => self.request(req),
            Err(e) => ResponseHandle::ready(Response::failed(e.to_string())),
        }
    }
}

/// The unit of work behind every call.
fn run_pipeline(id: Uuid, mut req: Request, chain: &InterceptorChain, adapter: &TransportAdapter) -> Response {
    if !chain.is_empty() {
        trace!("[{id}] running {} request interceptor(s)", chain.len());
        chain.run_request(&mut req);
    }

    let mut res = adapter.execute(&req);

    if !chain.is_empty() {
        trace!("[{id}] running {} response interceptor(s)", chain.len());
        chain.run_response(&mut res);
    }

    if res.is_transport_error() {
        debug!("[{id}] {} {} failed: {}", req.method, req.url, res.error_message);
    } else {
        debug!("[{id}] {} {} -> {} in {:.3}s", req.method, req.url, res.status_code, res.elapsed_time());
    }
    res
}
