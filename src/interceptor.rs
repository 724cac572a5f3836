//! Interceptors: hooks that observe and rewrite calls as they pass through a
//! [`Client`](crate::client::Client).
//!
//! Every call runs `on_request` on each registered interceptor in **registration order**,
//! performs the transfer, and then runs `on_response` in that **same** order. The response
//! phase is deliberately not reversed (no "onion" unwinding): an interceptor that wraps
//! another must be registered with that in mind.
//!
//! Hooks take `&self` because a single interceptor serves many concurrent calls. State that
//! must survive between calls is kept by the interceptor itself behind interior mutability.
//!
//! ```
//! use locosync::header::HeaderValue;
//! use locosync::interceptor::Interceptor;
//! use locosync::request::Request;
//!
//! struct ApiKey(&'static str);
//!
//! impl Interceptor for ApiKey {
//!     fn on_request(&self, req: &mut Request) {
//!         req.headers.insert("x-api-key", HeaderValue::from_static(self.0));
//!     }
//! }
//! ```

mod bearer_auth;
mod default_headers;
mod logging;

use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

pub use bearer_auth::BearerAuth;
pub use default_headers::DefaultHeaders;
pub use logging::LogInterceptor;

/// A pre-request / post-response hook.
///
/// Neither hook can abort the call. To make a call fail, rewrite the request into one that
/// deterministically fails (for instance an unsupported scheme), or set
/// [`Response::error_message`] in `on_response`.
pub trait Interceptor: Send + Sync {
    /// Called before the transfer starts. May rewrite any field of the request.
    fn on_request(&self, _req: &mut Request) {}

    /// Called after the transfer completed or failed. May rewrite any field of the response.
    fn on_response(&self, _res: &mut Response) {}
}

impl<T: Interceptor + ?Sized> Interceptor for Arc<T> {
    fn on_request(&self, req: &mut Request) {
        (**self).on_request(req)
    }

    fn on_response(&self, res: &mut Response) {
        (**self).on_response(res)
    }
}

impl<T: Interceptor + ?Sized> Interceptor for Box<T> {
    fn on_request(&self, req: &mut Request) {
        (**self).on_request(req)
    }

    fn on_response(&self, res: &mut Response) {
        (**self).on_response(res)
    }
}

/// Shared handle to an interceptor as stored in a chain.
pub type InterceptorHandle = Arc<dyn Interceptor>;

/// Ordered list of interceptors. Cloning is cheap and yields a snapshot that is not affected
/// by later registrations on the original.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    items: Vec<InterceptorHandle>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, interceptor: InterceptorHandle) {
        self.items.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Runs `on_request` on every interceptor in registration order.
    pub fn run_request(&self, req: &mut Request) {
        for interceptor in &self.items {
            interceptor.on_request(req);
        }
    }

    /// Runs `on_response` on every interceptor in registration order (not reversed).
    pub fn run_response(&self, res: &mut Response) {
        for interceptor in &self.items {
            interceptor.on_response(res);
        }
    }
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("len", &self.items.len())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use http::HeaderValue;
    use std::sync::Mutex;

    /// Appends `"<name>:req"` / `"<name>:res"` to a shared journal.
    pub(crate) struct Recorder {
        pub name: &'static str,
        pub journal: Arc<Mutex<Vec<String>>>,
    }

    impl Interceptor for Recorder {
        fn on_request(&self, _req: &mut Request) {
            self.journal.lock().unwrap().push(format!("{}:req", self.name));
        }

        fn on_response(&self, _res: &mut Response) {
            self.journal.lock().unwrap().push(format!("{}:res", self.name));
        }
    }

    struct Noop;
    impl Interceptor for Noop {}

    #[test]
    fn both_phases_run_in_registration_order() {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let mut chain = InterceptorChain::new();
        chain.push(Arc::new(Recorder { name: "A", journal: journal.clone() }));
        chain.push(Arc::new(Recorder { name: "B", journal: journal.clone() }));

        let mut req = Request::get("http://localhost/");
        chain.run_request(&mut req);
        let mut res = Response::default();
        chain.run_response(&mut res);

        assert_eq!(*journal.lock().unwrap(), vec!["A:req", "B:req", "A:res", "B:res"]);
    }

    #[test]
    fn later_interceptors_see_earlier_rewrites() {
        struct SetUrl;
        impl Interceptor for SetUrl {
            fn on_request(&self, req: &mut Request) {
                req.url = "https://rewritten.example/".into();
            }
        }

        struct CopyUrlToHeader;
        impl Interceptor for CopyUrlToHeader {
            fn on_request(&self, req: &mut Request) {
                if let Ok(url) = HeaderValue::from_str(&req.url) {
                    req.headers.insert("x-seen-url", url);
                }
            }
        }

        let mut chain = InterceptorChain::new();
        chain.push(Arc::new(SetUrl));
        chain.push(Arc::new(CopyUrlToHeader));

        let mut req = Request::get("http://original.example/");
        chain.run_request(&mut req);
        assert_eq!(req.headers["X-Seen-Url"], "https://rewritten.example/");
    }

    #[test]
    fn default_hooks_are_noops() {
        let mut chain = InterceptorChain::new();
        chain.push(Arc::new(Noop));

        let original = Request::get("http://localhost/");
        let mut req = original.clone();
        chain.run_request(&mut req);
        assert_eq!(req, original);
    }

    #[test]
    fn snapshot_is_isolated_from_later_pushes() {
        let mut chain = InterceptorChain::new();
        assert!(chain.is_empty());
        chain.push(Arc::new(Noop));
        let snapshot = chain.clone();
        chain.push(Arc::new(Noop));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(chain.len(), 2);
    }
}
