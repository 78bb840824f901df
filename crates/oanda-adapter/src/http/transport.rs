/*
[INPUT]:  Decorated ApiRequest and shared connection settings
[OUTPUT]: Raw HTTP responses, optional in-flight cancellation
[POS]:    HTTP layer - shared transport handle behind every client
[UPDATE]: When changing connection policy or adding transport capabilities
*/

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::http::{ApiRequest, ClientConfig, OandaError, Result};

/// Executes requests on behalf of one or more clients.
///
/// A transport is created once and shared (`Arc<dyn Transport>`) by every
/// client using it; implementations must tolerate concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    async fn execute(&self, request: &ApiRequest) -> Result<reqwest::Response>;

    /// Whether cancelling a request's token aborts it in flight
    fn supports_cancellation(&self) -> bool {
        false
    }
}

/// Default transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .tcp_keepalive(config.tcp_keepalive)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Wrap an already configured `reqwest` client
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }

    pub fn http_client(&self) -> &Client {
        &self.http
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let outgoing = request.to_reqwest(&self.http)?;
        debug!(method = %outgoing.method(), url = %outgoing.url(), "sending request");

        let cancel = request.cancellation_token();
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(OandaError::Cancelled),
            response = self.http.execute(outgoing) => response?,
        };

        debug!(status = %response.status(), "received response");
        Ok(response)
    }

    fn supports_cancellation(&self) -> bool {
        true
    }
}
