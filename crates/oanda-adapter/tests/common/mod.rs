/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for oanda-adapter tests

#![allow(dead_code)]

use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use oanda_adapter::{
    ApiError, ApiRequest, ApiResponse, Client, ClientConfig, Environment, OandaError, Transport,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use wiremock::MockServer;

static INIT: Once = Once::new();

/// Route test logs through the test writer; honours RUST_LOG
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    init_tracing();
    MockServer::start().await
}

/// Mock personal access token
pub fn mock_token() -> String {
    "0123456789abcdef-fedcba9876543210".to_string()
}

/// Config routing bare paths to the mock server
pub fn mock_config(server: &MockServer) -> ClientConfig {
    ClientConfig::default().with_host_override(server.address().to_string())
}

/// Token-authenticated client talking plain http to the mock server
pub fn mock_client(server: &MockServer) -> Client {
    Client::builder(Environment::Sandbox)
        .token(mock_token())
        .config(mock_config(server))
        .build()
        .expect("client init")
}

/// Instrument list as returned by GET /v1/instruments
#[derive(Debug, Deserialize)]
pub struct Instruments {
    #[serde(flatten)]
    pub error: ApiError,
    #[serde(default)]
    pub instruments: Vec<Instrument>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct Instrument {
    pub instrument: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

impl ApiResponse for Instruments {
    fn api_error(&self) -> &ApiError {
        &self.error
    }
}

/// Transport that never reaches the network and cannot cancel
#[derive(Debug, Default)]
pub struct CountingTransport {
    calls: AtomicUsize,
}

impl CountingTransport {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for CountingTransport {
    async fn execute(&self, _request: &ApiRequest) -> Result<reqwest::Response, OandaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(OandaError::InvalidRequest("offline test transport".to_string()))
    }
}
