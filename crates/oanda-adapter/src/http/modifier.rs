/*
[INPUT]:  ApiRequest before send
[OUTPUT]: Request decorated with auth, routing and format headers
[POS]:    HTTP layer - composable request modifiers applied by the client
[UPDATE]: When adding a cross-cutting request concern
*/

use std::fmt;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};

use crate::http::{ApiRequest, OandaError, Result};
use crate::types::{DateFormat, Environment};

/// Header selecting how the server formats timestamps
pub const DATETIME_FORMAT_HEADER: &str = "X-Accept-Datetime-Format";

/// Default body type for POST/PATCH requests
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Updates a request before it is handed to the transport.
///
/// Modifiers cannot fail and only touch the request they are given.
/// Applying the same modifier twice yields the same request as applying it
/// once.
pub trait RequestModifier: Send + Sync + fmt::Debug {
    fn modify(&self, request: &mut ApiRequest);
}

/// Sends a personal access token as `Authorization: Bearer <token>`
#[derive(Clone)]
pub struct TokenAuthenticator {
    value: HeaderValue,
}

impl TokenAuthenticator {
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(OandaError::Config("empty access token".to_string()));
        }
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| OandaError::Config("access token is not a valid header value".into()))?;
        value.set_sensitive(true);
        Ok(Self { value })
    }
}

impl RequestModifier for TokenAuthenticator {
    fn modify(&self, request: &mut ApiRequest) {
        request.set_header(AUTHORIZATION, self.value.clone());
    }
}

impl fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenAuthenticator").field(&"<redacted>").finish()
    }
}

/// Authenticates sandbox calls with a `username` query parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameAuthenticator(pub String);

impl RequestModifier for UsernameAuthenticator {
    fn modify(&self, request: &mut ApiRequest) {
        request.set_query_param("username", &self.0);
    }
}

/// Routes bare-path requests to the environment host.
///
/// The scheme is always overwritten; the host only when the request has
/// none, so a fully qualified URL keeps its own host.
impl RequestModifier for Environment {
    fn modify(&self, request: &mut ApiRequest) {
        request.set_scheme(self.scheme());
        if request.host().is_none() {
            request.set_host(self.host());
        }
    }
}

impl RequestModifier for DateFormat {
    fn modify(&self, request: &mut ApiRequest) {
        request.set_header(
            HeaderName::from_static("x-accept-datetime-format"),
            HeaderValue::from_static(self.as_str()),
        );
    }
}

/// Content type of request bodies; requests without a body are left alone
#[derive(Debug, Clone)]
pub struct ContentType(HeaderValue);

impl ContentType {
    pub fn new(mime: &str) -> Result<Self> {
        HeaderValue::from_str(mime)
            .map(Self)
            .map_err(|_| OandaError::Config(format!("invalid content type: {mime}")))
    }
}

impl Default for ContentType {
    fn default() -> Self {
        Self(HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
    }
}

impl RequestModifier for ContentType {
    fn modify(&self, request: &mut ApiRequest) {
        if request.has_body() {
            request.set_header(CONTENT_TYPE, self.0.clone());
        }
    }
}
