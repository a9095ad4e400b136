//! Caller session token as carried by the request.
//!
//! The token is opaque here: it is handed to the auth provider, which owns
//! session validation. A missing token is not an error at extraction time;
//! workflows decide whether they need a session.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::{convert::Infallible, fmt};

/// Cookie set by browser clients of the auth provider.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// `Authorization: Bearer <token>`, falling back to the access-token cookie.
#[derive(Clone, Debug, Default)]
pub struct BearerToken(pub Option<AccessToken>);

impl BearerToken {
    pub fn into_inner(self) -> Option<AccessToken> {
        self.0
    }

    fn from_parts(parts: &Parts) -> Option<AccessToken> {
        let from_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| {
                let (scheme, token) = v.trim().split_once(' ')?;
                scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
            });

        let token = from_header.or_else(|| {
            parts
                .headers
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .flat_map(|v| v.split(';'))
                .filter_map(|pair| pair.trim().split_once('='))
                .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
                .map(|(_, value)| value.trim())
        })?;

        (!token.is_empty()).then(|| AccessToken::new(token))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(Self::from_parts(parts)))
    }
}
