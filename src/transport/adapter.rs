use std::sync::Arc;

use http::header::{CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue};
use log::{debug, trace, warn};
use url::Url;

use crate::errors::LocoError;
use crate::request::Request;
use crate::response::Response;
use crate::transport::{
    is_allowed_scheme, RedirectPolicy, TlsPolicy, Transport, TransportOutcome, TransportRequest,
    TransportSink,
};

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Runs exactly one request/response cycle against a [`Transport`].
///
/// This is the only place that writes `status_code`, `elapsed` and `error_message` on a
/// [`Response`].
pub struct TransportAdapter {
    transport: Arc<dyn Transport>,
    user_agent: Option<String>,
}

impl TransportAdapter {
    pub fn new(transport: Arc<dyn Transport>, user_agent: Option<String>) -> Self {
        Self { transport, user_agent }
    }

    /// Performs the call. Never fails: every problem ends up in `error_message` with
    /// `status_code` left at 0.
    pub fn execute(&self, req: &Request) -> Response {
        let call = match self.prepare(req) {
            Ok(call) => call,
            Err(e) => {
                warn!("refusing {} {}: {}", req.method, req.url, e);
                return Response::failed(e.to_string());
            }
        };

        // The sink lives for this call only; nothing outlives a failed transfer.
        let mut sink = ResponseSink::new();
        match self.transport.perform(&call, &mut sink) {
            Ok(outcome) => {
                debug!("{} {} -> {} in {:?}", call.method, call.url, outcome.status_code, outcome.elapsed);
                sink.into_response(outcome)
            }
            Err(e) => {
                warn!("{} {} failed: {}", call.method, call.url, e);
                Response::failed(e.0)
            }
        }
    }

    /// Applies the transport policy to `req`.
    pub fn prepare(&self, req: &Request) -> Result<TransportRequest, LocoError> {
        let url = Url::parse(&req.url).map_err(|e| LocoError::InvalidUrl {
            url: req.url.clone(),
            reason: e.to_string(),
        })?;
        if !is_allowed_scheme(url.scheme()) {
            return Err(LocoError::UnsupportedScheme(url.scheme().to_string()));
        }

        if let Some(name) = req.invalid_header() {
            return Err(LocoError::InvalidHeader(name.to_string()));
        }

        let mut headers = req.headers.clone();
        if !req.body.is_empty() {
            headers
                .entry(CONTENT_TYPE)
                .or_insert(HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        }
        if let Some(ua) = &self.user_agent {
            if !headers.contains_key(USER_AGENT) {
                let value = HeaderValue::from_str(ua)
                    .map_err(|_| LocoError::InvalidHeader(USER_AGENT.to_string()))?;
                headers.insert(USER_AGENT, value);
            }
        }

        let redirect = if req.follow_redirects {
            RedirectPolicy::Limited(req.max_redirects)
        } else {
            RedirectPolicy::None
        };

        Ok(TransportRequest {
            url,
            method: req.method,
            headers,
            body: req.body.clone(),
            timeout: req.timeout(),
            connect_timeout: req.connect_timeout(),
            redirect,
            tls: TlsPolicy::HARDENED,
        })
    }
}

/// Accumulates a response while a transport delivers it.
///
/// - Body chunks are appended in arrival order, whatever their boundaries.
/// - Header lines are split on the first `:`, both sides trimmed of whitespace and line
///   terminators, and stored with last-value-wins semantics. Lines without a colon, or whose
///   name or value is not legal HTTP, carry no header. A status line (`HTTP/...`) starts a fresh header block, so after redirects only
///   the final response's headers remain.
#[derive(Debug, Default)]
pub struct ResponseSink {
    body: Vec<u8>,
    headers: HeaderMap,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Freezes the accumulated data into a response for a completed transfer.
    pub fn into_response(self, outcome: TransportOutcome) -> Response {
        Response {
            status_code: outcome.status_code,
            body: self.body,
            headers: self.headers,
            elapsed: outcome.elapsed,
            error_message: String::new(),
            url: outcome.final_url,
        }
    }
}

impl TransportSink for ResponseSink {
    fn write_body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    fn write_header_line(&mut self, line: &[u8]) {
        let line = String::from_utf8_lossy(line);

        if line.starts_with("HTTP/") {
            self.headers.clear();
            return;
        }

        let Some((name, value)) = line.split_once(':') else {
            return;
        };
        match (
            HeaderName::from_bytes(name.trim().as_bytes()),
            HeaderValue::from_str(value.trim()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => trace!("skipping malformed header line {:?}", line.trim_end()),
        }
    }
}
