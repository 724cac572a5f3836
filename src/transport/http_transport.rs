//! Default [`Transport`] backed by the `reqwest` blocking client (rustls).
//!
//! A fresh client is built for every call so that the call's deadlines, redirect limit and
//! TLS floor are baked into it, and dropped when the call returns on any path. Response
//! headers and body are replayed into the sink as header lines and read-sized chunks.

use std::error::Error as StdError;
use std::io::Read;
use std::time::Instant;

use reqwest::blocking::Client as BlockingClient;
use reqwest::redirect::Policy;

use crate::request::Method;
use crate::transport::{
    is_allowed_scheme, RedirectPolicy, TlsVersion, Transport, TransportError, TransportOutcome,
    TransportRequest, TransportSink,
};

const DEFAULT_READ_BUFFER: usize = 16 * 1024;

#[derive(Debug, Clone)]
pub struct HttpTransport {
    read_buffer_size: usize,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER,
        }
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the buffer used to pull the body off the connection. Each filled buffer is one
    /// `write_body` call.
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }
}

impl Transport for HttpTransport {
    fn perform(
        &self,
        req: &TransportRequest,
        sink: &mut dyn TransportSink,
    ) -> Result<TransportOutcome, TransportError> {
        let client = build_client(req)?;

        let mut builder = client
            .request(to_reqwest_method(req.method), req.url.clone())
            .headers(req.headers.clone());
        if !req.body.is_empty() {
            builder = builder.body(req.body.clone());
        }

        let started = Instant::now();
        let mut res = builder.send().map_err(transfer_error)?;

        sink.write_header_line(format!("{:?} {}\r\n", res.version(), res.status()).as_bytes());
        for (name, value) in res.headers() {
            let mut line = Vec::with_capacity(name.as_str().len() + value.len() + 4);
            line.extend_from_slice(name.as_str().as_bytes());
            line.extend_from_slice(b": ");
            line.extend_from_slice(value.as_bytes());
            line.extend_from_slice(b"\r\n");
            sink.write_header_line(&line);
        }
        sink.write_header_line(b"\r\n");

        let mut buf = vec![0u8; self.read_buffer_size];
        loop {
            let n = res
                .read(&mut buf)
                .map_err(|e| TransportError::new(format!("Failure when receiving data from the peer: {}", describe(&e))))?;
            if n == 0 {
                break;
            }
            sink.write_body(&buf[..n]);
        }

        Ok(TransportOutcome {
            status_code: res.status().as_u16(),
            elapsed: started.elapsed(),
            final_url: Some(res.url().clone()),
        })
    }
}

fn build_client(req: &TransportRequest) -> Result<BlockingClient, TransportError> {
    // rustls always checks the host name as part of certificate verification
    if req.tls.verify_peer != req.tls.verify_host {
        return Err(TransportError::new(
            "certificate and host name verification cannot be toggled separately",
        ));
    }

    let min_tls = match req.tls.min_version {
        TlsVersion::Tls12 => reqwest::tls::Version::TLS_1_2,
        TlsVersion::Tls13 => reqwest::tls::Version::TLS_1_3,
    };

    BlockingClient::builder()
        .use_rustls_tls()
        .min_tls_version(min_tls)
        .danger_accept_invalid_certs(!req.tls.verify_peer)
        .timeout(req.timeout)
        .connect_timeout(req.connect_timeout)
        .redirect(redirect_policy(req.redirect))
        .build()
        .map_err(|e| TransportError::new(format!("Failed to initialize transport: {}", describe(&e))))
}

fn redirect_policy(policy: RedirectPolicy) -> Policy {
    match policy {
        RedirectPolicy::None => Policy::none(),
        RedirectPolicy::Limited(max) => Policy::custom(move |attempt| {
            let scheme = attempt.url().scheme().to_string();
            if !is_allowed_scheme(&scheme) {
                attempt.error(format!("refusing redirect to unsupported protocol '{scheme}'"))
            } else if attempt.previous().len() > max as usize {
                attempt.error(format!("maximum ({max}) redirects followed"))
            } else {
                attempt.follow()
            }
        }),
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn transfer_error(e: reqwest::Error) -> TransportError {
    let message = describe(&e);
    if e.is_timeout() {
        TransportError::new(format!("Timeout was reached: {message}"))
    } else {
        TransportError::new(message)
    }
}

/// Flattens an error and its sources into one diagnostic line.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
