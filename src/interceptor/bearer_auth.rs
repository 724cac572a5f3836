use std::sync::{PoisonError, RwLock};

use http::header::AUTHORIZATION;
use http::HeaderValue;
use log::warn;

use crate::interceptor::Interceptor;
use crate::request::Request;

/// Injects `Authorization: Bearer <token>` into requests that carry no `Authorization` header.
///
/// The token can be swapped at runtime with [`BearerAuth::set_token`], for example by a
/// refresh flow reacting to a `401`. Calls already in flight keep the token they were given.
#[derive(Debug)]
pub struct BearerAuth {
    token: RwLock<String>,
}

impl BearerAuth {
    pub fn new<S: Into<String>>(token: S) -> Self {
        Self {
            token: RwLock::new(token.into()),
        }
    }

    pub fn set_token<S: Into<String>>(&self, token: S) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token.into();
    }

    pub fn token(&self) -> String {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Interceptor for BearerAuth {
    fn on_request(&self, req: &mut Request) {
        let token = self.token();
        if token.is_empty() || req.headers.contains_key(AUTHORIZATION) {
            return;
        }
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                req.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("bearer token is not a legal header value, request sent without it"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_and_refreshes_token() {
        let auth = BearerAuth::new("first");

        let mut req = Request::get("http://localhost/");
        auth.on_request(&mut req);
        assert_eq!(req.headers["Authorization"], "Bearer first");
        assert!(req.headers["Authorization"].is_sensitive());

        auth.set_token("second");
        let mut req = Request::get("http://localhost/");
        auth.on_request(&mut req);
        assert_eq!(req.headers["authorization"], "Bearer second");
    }

    #[test]
    fn explicit_authorization_and_empty_token_are_left_alone() {
        let auth = BearerAuth::new("token");
        let mut req = Request::get("http://localhost/").header("Authorization", "Basic Zm9vOmJhcg==");
        auth.on_request(&mut req);
        assert_eq!(req.headers["Authorization"], "Basic Zm9vOmJhcg==");

        let empty = BearerAuth::new("");
        let mut req = Request::get("http://localhost/");
        empty.on_request(&mut req);
        assert!(!req.headers.contains_key("Authorization"));

        let broken = BearerAuth::new("line\nbreak");
        let mut req = Request::get("http://localhost/");
        broken.on_request(&mut req);
        assert!(!req.headers.contains_key("Authorization"));
    }
}
