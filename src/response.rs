//! Fully buffered outcome of one call.
//!
//! A [`Response`] is produced by the transport adapter and then handed through the
//! post-response interceptors before it reaches the caller.
//!
//! ## Notes
//! - `status_code == 0` means no HTTP response was obtained. In that case `error_message`
//!   holds the transport's diagnostic and the two never overlap.
//! - A non-2xx status is not an error at this layer: `ok()` is false and the caller decides.
//! - The body is stored as raw `Vec<u8>`. Use [`Response::text`] for text,
//!   [`Response::json`] for a forgiving JSON view or [`Response::json_as`] for typed decoding.
//! - `headers` is an `http::HeaderMap`, so lookups ignore case.

use std::time::Duration;

use encoding_rs::{Encoding, UTF_8};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::errors::LocoError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Numeric HTTP status code, or `0` when the transfer never produced one.
    pub status_code: u16,

    /// Raw response body bytes.
    pub body: Vec<u8>,

    /// Headers of the final response (after redirects).
    pub headers: HeaderMap,

    /// Wall-clock duration of the transfer as reported by the transport.
    pub elapsed: Duration,

    /// Transport-level failure description. Empty when the transfer completed.
    pub error_message: String,

    /// Final URL of the response (after redirects), when the transport reports it.
    pub url: Option<Url>,
}

impl Response {
    /// A response for a call that never obtained an HTTP status.
    pub fn failed<S: Into<String>>(message: S) -> Self {
        Self {
            error_message: message.into(),
            ..Default::default()
        }
    }

    /// True for a 2xx status with no transport failure.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status_code) && self.error_message.is_empty()
    }

    pub fn is_transport_error(&self) -> bool {
        !self.error_message.is_empty()
    }

    /// Elapsed time in seconds.
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Header value as text. Missing headers and values that are not visible ASCII give `None`.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parses the body as JSON.
    ///
    /// Never fails: a body that is not valid JSON yields `{"error": "<parser message>"}`.
    pub fn json(&self) -> Value {
        match serde_json::from_slice(&self.body) {
            Ok(value) => value,
            Err(e) => json!({ "error": e.to_string() }),
        }
    }

    /// Deserializes the body into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, LocoError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decodes the body as text using the `charset` of the `Content-Type` header, UTF-8 when
    /// there is none or it is unknown. Malformed sequences become U+FFFD.
    pub fn text(&self) -> String {
        let encoding = self
            .get_header("Content-Type")
            .and_then(charset_of)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);

        let (text, _, _) = encoding.decode(&self.body);
        text.into_owned()
    }
}

/// Extracts the `charset=` parameter from a content type value.
fn charset_of(content_type: &str) -> Option<&str> {
    let idx = content_type.to_ascii_lowercase().find("charset=")?;
    let after = &content_type[idx + "charset=".len()..];
    let end = after.find([';', ' ', '\t']).unwrap_or(after.len());
    Some(after[..end].trim_matches('"'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::CONTENT_TYPE;
    use http::HeaderValue;
    use serde::Deserialize;

    fn with_status(status_code: u16) -> Response {
        Response {
            status_code,
            ..Default::default()
        }
    }

    #[test]
    fn ok_requires_2xx_and_no_error() {
        assert!(with_status(200).ok());
        assert!(with_status(204).ok());
        assert!(with_status(299).ok());
        assert!(!with_status(199).ok());
        assert!(!with_status(300).ok());
        assert!(!with_status(404).ok());
        assert!(!with_status(0).ok());

        let mut res = with_status(200);
        res.error_message = "Timeout was reached".into();
        assert!(!res.ok());
    }

    #[test]
    fn failed_has_no_status() {
        let res = Response::failed("Couldn't resolve host name");
        assert_eq!(res.status_code, 0);
        assert!(res.is_transport_error());
        assert!(!res.ok());
    }

    #[test]
    fn json_parses_valid_body() {
        let res = Response {
            status_code: 200,
            body: br#"{"a":1}"#.to_vec(),
            ..Default::default()
        };
        assert_eq!(res.json(), json!({"a": 1}));
    }

    #[test]
    fn json_on_invalid_body_returns_error_marker() {
        let res = Response {
            status_code: 200,
            body: b"not json".to_vec(),
            ..Default::default()
        };

        let value = res.json();
        assert!(value.get("error").and_then(Value::as_str).is_some());
        // body validity does not influence ok()
        assert!(res.ok());
    }

    #[test]
    fn json_as_decodes_typed_values() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Page {
            count: u32,
        }

        let res = Response {
            body: br#"{"count":1302}"#.to_vec(),
            ..Default::default()
        };
        assert_eq!(res.json_as::<Page>().unwrap(), Page { count: 1302 });

        let bad = Response {
            body: b"[]".to_vec(),
            ..Default::default()
        };
        assert!(matches!(bad.json_as::<Page>(), Err(LocoError::Json(_))));
    }

    #[test]
    fn get_header_misses_return_none() {
        let mut res = with_status(200);
        res.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        assert_eq!(res.get_header("content-type"), Some("application/json"));
        assert!(res.get_header("X-Missing").is_none());
    }

    #[test]
    fn text_decodes_utf8_charset() {
        let mut res = with_status(200);
        res.headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=UTF-8"));
        res.body = b"<html>\xe2\x98\x83</html>".to_vec();
        assert_eq!(res.text(), "<html>\u{2603}</html>");
    }

    #[test]
    fn text_decodes_latin1_charset() {
        let mut res = with_status(200);
        res.headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=iso-8859-1"));
        res.body = vec![0x63, 0x61, 0x66, 0xe9];
        assert_eq!(res.text(), "caf\u{e9}");
    }

    #[test]
    fn text_decodes_shift_jis_charset() {
        let mut res = with_status(200);
        res.headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=\"Shift_JIS\""));
        res.body = vec![0x82, 0xa0];
        assert_eq!(res.text(), "\u{3042}");
    }

    #[test]
    fn unknown_charset_decodes_as_utf8() {
        let mut res = with_status(200);
        res.headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=x-martian"));
        res.body = "caf\u{e9}".as_bytes().to_vec();
        assert_eq!(res.text(), "caf\u{e9}");
    }

    #[test]
    fn header_values_that_are_not_text_read_as_none() {
        let mut res = with_status(200);
        res.headers.insert("x-raw", HeaderValue::from_bytes(b"caf\xe9").unwrap());
        assert!(res.headers.contains_key("X-Raw"));
        assert!(res.get_header("X-Raw").is_none());
    }

    #[test]
    fn text_falls_back_to_lossy_utf8() {
        let mut res = with_status(200);
        res.body = b"\xff\xfehello".to_vec();
        assert!(res.text().contains("hello"));
    }

    #[test]
    fn charset_parsing_handles_quotes_and_params() {
        assert_eq!(charset_of("text/plain; charset=\"utf-8\""), Some("utf-8"));
        assert_eq!(charset_of("text/plain; Charset=latin1; x=y"), Some("latin1"));
        assert!(charset_of("application/json").is_none());
    }

    #[test]
    fn elapsed_time_is_in_seconds() {
        let res = Response {
            elapsed: Duration::from_millis(1500),
            ..Default::default()
        };
        assert!((res.elapsed_time() - 1.5).abs() < f64::EPSILON);
    }
}
