/*
[INPUT]:  Environment, credentials, transport configuration
[OUTPUT]: Configured client that builds decorated requests and executes them
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tracing::debug;

use crate::http::modifier::{
    ContentType, RequestModifier, TokenAuthenticator, UsernameAuthenticator,
};
use crate::http::transport::{HttpTransport, Transport};
use crate::http::{ApiRequest, OandaError, PollRequest, Result};
use crate::types::{DateFormat, Environment, SandboxAccount};

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Limit for TCP connect plus TLS handshake
    pub connect_timeout: Duration,
    pub tcp_keepalive: Duration,
    /// OANDA caps persistent connections per account, so idle ones are not kept
    pub pool_max_idle_per_host: usize,
    /// Whole-request timeout; `None` leaves body reads to the caller
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Host (with optional port) used instead of the environment host for
    /// bare-path requests, e.g. a local mock server
    pub host_override: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            tcp_keepalive: Duration::from_secs(30),
            pool_max_idle_per_host: 0,
            timeout: None,
            user_agent: format!("oanda-adapter/{}", env!("CARGO_PKG_VERSION")),
            host_override: None,
        }
    }
}

impl ClientConfig {
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_tcp_keepalive(mut self, keepalive: Duration) -> Self {
        self.tcp_keepalive = keepalive;
        self
    }

    pub fn with_pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_host_override(mut self, host: impl Into<String>) -> Self {
        self.host_override = Some(host.into());
        self
    }
}

/// Main HTTP client for the OANDA REST API.
///
/// Cloning is cheap: clones share the transport and the modifier list.
/// The account selection is per clone.
#[derive(Debug, Clone)]
pub struct Client {
    environment: Environment,
    modifiers: Arc<[Arc<dyn RequestModifier>]>,
    transport: Arc<dyn Transport>,
    host_override: Option<String>,
    account_id: Option<u64>,
    sandbox_account: Option<Arc<SandboxAccount>>,
}

impl Client {
    /// Start building a client for `environment`
    pub fn builder(environment: Environment) -> ClientBuilder {
        ClientBuilder::new(environment)
    }

    /// Client for the fxpractice environment, authenticated with a personal
    /// access token.
    pub fn fx_practice(token: &str) -> Result<Self> {
        Self::fx_practice_with_config(token, ClientConfig::default(), None)
    }

    pub fn fx_practice_with_config(
        token: &str,
        config: ClientConfig,
        transport: Option<Arc<dyn Transport>>,
    ) -> Result<Self> {
        if token.is_empty() {
            return Err(OandaError::Config("no fxpractice access token".to_string()));
        }
        Self::builder(Environment::FxPractice)
            .token(token)
            .config(config)
            .maybe_transport(transport)
            .build()
    }

    /// Client for the fxtrade (live) environment
    pub fn fx_trade(token: &str) -> Result<Self> {
        Self::fx_trade_with_config(token, ClientConfig::default(), None)
    }

    pub fn fx_trade_with_config(
        token: &str,
        config: ClientConfig,
        transport: Option<Arc<dyn Transport>>,
    ) -> Result<Self> {
        if token.is_empty() {
            return Err(OandaError::Config("no fxtrade access token".to_string()));
        }
        Self::builder(Environment::FxTrade)
            .token(token)
            .config(config)
            .maybe_transport(transport)
            .build()
    }

    /// Client for the sandbox environment.
    ///
    /// Creates a fresh sandbox user; every later request is authenticated
    /// as that user.
    pub async fn sandbox() -> Result<Self> {
        Self::builder(Environment::Sandbox).build_sandbox().await
    }

    pub async fn sandbox_with_config(
        config: ClientConfig,
        transport: Option<Arc<dyn Transport>>,
    ) -> Result<Self> {
        Self::builder(Environment::Sandbox)
            .config(config)
            .maybe_transport(transport)
            .build_sandbox()
            .await
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Registered modifiers in application order
    pub fn modifiers(&self) -> &[Arc<dyn RequestModifier>] {
        &self.modifiers
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Account created during sandbox bootstrap
    pub fn sandbox_account(&self) -> Option<&SandboxAccount> {
        self.sandbox_account.as_deref()
    }

    /// Select the account subsequent trades and orders are for.
    ///
    /// `0` clears the selection. The id is not checked against the server.
    pub fn select_account(&mut self, account_id: u64) {
        self.account_id = (account_id != 0).then_some(account_id);
    }

    pub fn selected_account(&self) -> Option<u64> {
        self.account_id
    }

    /// Build a request and run it through every modifier. Nothing is sent.
    pub fn build_request(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> Result<ApiRequest> {
        let mut request = ApiRequest::new(method, url, body)?;
        if let Some(host) = self.host_override.as_ref().filter(|_| request.host().is_none()) {
            request.set_host(host.clone());
        }
        self.apply_modifiers(&mut request);
        Ok(request)
    }

    /// Re-run the pipeline over a request, e.g. one built elsewhere
    pub fn apply_modifiers(&self, request: &mut ApiRequest) {
        for modifier in self.modifiers.iter() {
            modifier.modify(request);
        }
    }

    /// Send a request through the shared transport
    pub async fn execute(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        self.transport.execute(request).await
    }

    /// Abort an in-flight request, if the transport can.
    pub fn cancel(&self, request: &ApiRequest) {
        if self.transport.supports_cancellation() {
            request.cancellation_token().cancel();
        } else {
            debug!(path = request.path(), "transport cannot cancel requests; ignoring");
        }
    }

    /// Wrap a GET of `url` for repeated polling
    pub fn poll_request(&self, url: &str) -> Result<PollRequest> {
        let request = self.build_request(Method::GET, url, None)?;
        Ok(PollRequest::new(self.clone(), request))
    }
}

/// Builder shared by every client constructor
pub struct ClientBuilder {
    environment: Environment,
    token: Option<String>,
    username: Option<String>,
    date_format: DateFormat,
    content_type: Option<String>,
    extra: Vec<Arc<dyn RequestModifier>>,
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("environment", &self.environment)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("date_format", &self.date_format)
            .field("content_type", &self.content_type)
            .field("extra", &self.extra)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ClientBuilder {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            token: None,
            username: None,
            date_format: DateFormat::default(),
            content_type: None,
            extra: Vec::new(),
            config: ClientConfig::default(),
            transport: None,
        }
    }

    /// Authenticate with a bearer token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Authenticate with a `username` query parameter (sandbox)
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Register an additional modifier, applied after the defaults
    pub fn modifier(mut self, modifier: impl RequestModifier + 'static) -> Self {
        self.extra.push(Arc::new(modifier));
        self
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing transport instead of creating one
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn maybe_transport(mut self, transport: Option<Arc<dyn Transport>>) -> Self {
        if transport.is_some() {
            self.transport = transport;
        }
        self
    }

    /// Build the client. Performs no network calls.
    pub fn build(self) -> Result<Client> {
        let modifiers = self.modifier_list()?;
        let transport = self.resolve_transport()?;
        Ok(Client {
            environment: self.environment,
            modifiers: modifiers.into(),
            transport,
            host_override: self.config.host_override.clone(),
            account_id: None,
            sandbox_account: None,
        })
    }

    /// Build a sandbox client: create a sandbox user, then authenticate
    /// every later request with its username.
    pub async fn build_sandbox(self) -> Result<Client> {
        let mut modifiers = self.modifier_list()?;
        let transport = self.resolve_transport()?;

        let bootstrap = Client {
            environment: self.environment,
            modifiers: modifiers.clone().into(),
            transport: transport.clone(),
            host_override: self.config.host_override.clone(),
            account_id: None,
            sandbox_account: None,
        };
        let account = bootstrap.create_sandbox_account().await?;

        modifiers.push(Arc::new(UsernameAuthenticator(account.username.clone())));
        Ok(Client {
            environment: self.environment,
            modifiers: modifiers.into(),
            transport,
            host_override: self.config.host_override.clone(),
            account_id: None,
            sandbox_account: Some(Arc::new(account)),
        })
    }

    /// Default order: date format, content type, environment, authenticator,
    /// then extras.
    fn modifier_list(&self) -> Result<Vec<Arc<dyn RequestModifier>>> {
        let content_type = match &self.content_type {
            Some(mime) => ContentType::new(mime)?,
            None => ContentType::default(),
        };

        let mut modifiers: Vec<Arc<dyn RequestModifier>> = vec![
            Arc::new(self.date_format),
            Arc::new(content_type),
            Arc::new(self.environment),
        ];

        if let Some(token) = &self.token {
            modifiers.push(Arc::new(TokenAuthenticator::new(token)?));
        } else if self.environment.requires_token() {
            return Err(OandaError::Config(format!(
                "no {} access token",
                self.environment
            )));
        }
        if let Some(username) = &self.username {
            modifiers.push(Arc::new(UsernameAuthenticator(username.clone())));
        }

        modifiers.extend(self.extra.iter().cloned());
        Ok(modifiers)
    }

    fn resolve_transport(&self) -> Result<Arc<dyn Transport>> {
        match &self.transport {
            Some(transport) => Ok(transport.clone()),
            None => Ok(Arc::new(HttpTransport::new(&self.config)?)),
        }
    }
}
