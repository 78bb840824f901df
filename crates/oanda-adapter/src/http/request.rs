/*
[INPUT]:  HTTP method, bare path or absolute URL, optional body
[OUTPUT]: Mutable request value that modifiers decorate before send
[POS]:    HTTP layer - request representation between build and execute
[UPDATE]: When modifiers need access to new request fields
*/

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::http::{OandaError, Result};

/// Base used only to resolve bare paths; never sent anywhere.
const RELATIVE_BASE: &str = "http://relative.invalid";

/// Outgoing API request.
///
/// Built from either a bare path (`/v1/accounts`), in which case scheme and
/// host stay unset until the environment modifier fills them in, or a fully
/// qualified URL that overrides the environment host.
///
/// Clones share one cancellation handle: cancelling a clone cancels the
/// in-flight request it was cloned from.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    scheme: Option<String>,
    host: Option<String>,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<String>,
    cancel: CancellationToken,
}

impl ApiRequest {
    /// Parse `url` and create an undecorated request
    pub fn new(method: Method, url: &str, body: Option<String>) -> Result<Self> {
        let (scheme, host, parsed) = match Url::parse(url) {
            Ok(parsed) => {
                if parsed.cannot_be_a_base() {
                    return Err(OandaError::InvalidRequest(format!(
                        "not a hierarchical URL: {url}"
                    )));
                }
                (Some(parsed.scheme().to_string()), authority(&parsed), parsed)
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let parsed = Url::parse(RELATIVE_BASE)?.join(url)?;
                // `//host/path` names its own host; only the scheme is inherited.
                let host = if url.starts_with("//") {
                    authority(&parsed)
                } else {
                    None
                };
                (None, host, parsed)
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Self {
            method,
            scheme,
            host,
            path: parsed.path().to_string(),
            query: parsed.query_pairs().into_owned().collect(),
            headers: HeaderMap::new(),
            body,
            cancel: CancellationToken::new(),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn set_scheme(&mut self, scheme: impl Into<String>) {
        self.scheme = Some(scheme.into());
    }

    /// Host including a non-default port
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = Some(host.into());
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// First value of a query parameter
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace every value of `key` with a single `value`
    pub fn set_query_param(&mut self, key: &str, value: &str) {
        self.query.retain(|(k, _)| k != key);
        self.query.push((key.to_string(), value.to_string()));
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Header value as text, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Set a header, replacing previous values
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Absolute URL; fails while scheme or host is still unset
    pub fn url(&self) -> Result<Url> {
        let scheme = self.scheme.as_deref().ok_or_else(|| {
            OandaError::InvalidRequest(format!("no scheme for {}", self.path))
        })?;
        let host = self.host.as_deref().ok_or_else(|| {
            OandaError::InvalidRequest(format!("no host for {}", self.path))
        })?;

        let mut url = Url::parse(&format!("{scheme}://{host}"))?;
        url.set_path(&self.path);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        Ok(url)
    }

    /// Convert into a `reqwest` request bound to `http`
    pub fn to_reqwest(&self, http: &reqwest::Client) -> Result<reqwest::Request> {
        let mut builder = http
            .request(self.method.clone(), self.url()?)
            .headers(self.headers.clone());
        if let Some(body) = &self.body {
            builder = builder.body(body.clone());
        }
        Ok(builder.build()?)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Give the request a fresh cancellation handle so it can be sent again
    pub fn reset_cancellation(&mut self) {
        self.cancel = CancellationToken::new();
    }
}

fn authority(url: &Url) -> Option<String> {
    url.host_str().map(|host| match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
