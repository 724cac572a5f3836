use http::{HeaderMap, HeaderName, HeaderValue};

use crate::interceptor::Interceptor;
use crate::request::Request;

/// Adds a fixed set of headers to every request that does not already carry them.
///
/// Headers set explicitly on a request always win over these defaults.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeaders {
    headers: HeaderMap,
}

impl DefaultHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl From<HeaderMap> for DefaultHeaders {
    fn from(headers: HeaderMap) -> Self {
        Self { headers }
    }
}

impl Interceptor for DefaultHeaders {
    fn on_request(&self, req: &mut Request) {
        for (name, value) in &self.headers {
            if !req.headers.contains_key(name) {
                req.headers.insert(name.clone(), value.clone());
            }
        }
    }
}
