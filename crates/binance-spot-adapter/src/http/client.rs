/*
[INPUT]:  HTTP configuration (base URLs, timeouts, credentials)
[OUTPUT]: Signed and unsigned REST calls mapped into typed results
[POS]:    HTTP layer - core request executor
[UPDATE]: When adding connection options or changing request assembly
*/

use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::http::clock::{ServerClock, local_millis};
use crate::http::error::{BinanceError, Result};
use crate::http::signature::Credential;
use crate::types::ServerTime;

/// Base URLs for the exchange API
const REST_BASE_URL: &str = "https://api.binance.com/api";
const STREAM_BASE_URL: &str = "wss://stream.binance.com:9443/ws";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base address, up to and including the `/api` segment.
    pub rest_base_url: String,
    /// WebSocket base address, up to and including the `/ws` segment.
    pub stream_base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Sync the server clock before the first signed call and stamp signed
    /// requests with the adjusted time.
    pub auto_timestamp: bool,
    /// Optional `recvWindow` appended to signed requests.
    pub recv_window: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rest_base_url: REST_BASE_URL.to_string(),
            stream_base_url: STREAM_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            auto_timestamp: true,
            recv_window: None,
        }
    }
}

/// Ordered query parameters.
///
/// Insertion order is preserved all the way to the wire: the signature is
/// computed over the query string exactly as assembled here, so reordering
/// would change the signed bytes.
#[derive(Debug, Clone, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl ToString) {
        self.0.push((key.to_string(), value.to_string()));
    }

    pub fn push_opt(&mut self, key: &str, value: Option<impl ToString>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Main REST client for the exchange API.
///
/// Owns the credentials and server clock state; construct once and share.
#[derive(Debug)]
pub struct BinanceClient {
    http_client: Client,
    rest_base_url: String,
    stream_base_url: String,
    credentials: Option<Credential>,
    clock: ServerClock,
    auto_timestamp: bool,
    recv_window: Option<u64>,
}

impl BinanceClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        // Validate the base up front so endpoint calls cannot fail on URL shape.
        Url::parse(&config.rest_base_url)?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            rest_base_url: config.rest_base_url.trim_end_matches('/').to_string(),
            stream_base_url: config.stream_base_url.trim_end_matches('/').to_string(),
            credentials: None,
            clock: ServerClock::new(),
            auto_timestamp: config.auto_timestamp,
            recv_window: config.recv_window,
        })
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credential) {
        self.credentials = Some(credentials);
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credential> {
        self.credentials.as_ref()
    }

    /// Server clock state used for signed-request timestamps
    pub fn clock(&self) -> &ServerClock {
        &self.clock
    }

    /// WebSocket base address configured for this client
    pub fn stream_base_url(&self) -> &str {
        &self.stream_base_url
    }

    /// Fetch the server time and record the clock offset.
    ///
    /// On failure the previously learned offset is left untouched.
    pub async fn sync_clock(&self) -> Result<()> {
        let before = local_millis();
        let time: ServerTime = self.execute(Method::GET, 1, "time", "").await?;
        let after = local_millis();
        self.clock.record_sync(time.server_time, before, after);
        debug!(
            offset_ms = self.clock.offset_ms(),
            round_trip_ms = after - before,
            "server clock synchronized"
        );
        Ok(())
    }

    /// Execute a request against `/v{version}/{endpoint}`.
    ///
    /// `signed` appends `timestamp` (plus optional `recvWindow`) and the
    /// signature over the query as assembled; `key_required` attaches the
    /// API key header without signing (listen key endpoints). Public calls
    /// still carry the key header when credentials happen to be configured.
    pub(crate) async fn send_request<T: DeserializeOwned>(
        &self,
        method: Method,
        version: u8,
        endpoint: &str,
        mut params: QueryParams,
        signed: bool,
        key_required: bool,
    ) -> Result<T> {
        if (signed || key_required) && self.credentials.is_none() {
            return Err(BinanceError::NotAuthenticated);
        }

        let query = if signed {
            let credentials = self
                .credentials
                .as_ref()
                .ok_or(BinanceError::NotAuthenticated)?;

            if self.auto_timestamp && !self.clock.is_synced() {
                // One sync before the first signed call; its failure fails
                // the signed call rather than sending an unsynced timestamp.
                self.sync_clock().await?;
            }

            params.push("timestamp", self.clock.now_millis());
            if let Some(window) = self.recv_window {
                params.push("recvWindow", window);
            }

            let unsigned = params.to_query_string();
            let signature = credentials.sign(&unsigned);
            format!("{unsigned}&signature={signature}")
        } else {
            params.to_query_string()
        };

        self.execute(method, version, endpoint, &query).await
    }

    /// Perform the network call and map the response into the result
    /// envelope. The query string goes on the wire exactly as given.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        version: u8,
        endpoint: &str,
        query: &str,
    ) -> Result<T> {
        let url = self.build_url(version, endpoint, query);
        let mut builder = self.http_client.request(method, &url);
        if let Some(credentials) = &self.credentials {
            builder = builder.header("X-MBX-APIKEY", credentials.api_key());
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() < 400 {
            serde_json::from_str(&body).map_err(|err| {
                warn!(%status, error = %err, "response body did not match expected shape");
                BinanceError::MalformedResponse(err.to_string())
            })
        } else {
            Err(Self::parse_error_body(status.as_u16(), &body))
        }
    }

    fn build_url(&self, version: u8, endpoint: &str, query: &str) -> String {
        let mut url = format!(
            "{}/v{}{}",
            self.rest_base_url,
            version,
            Self::normalize_path(endpoint)
        );
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    fn normalize_path(endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            endpoint.to_string()
        } else {
            format!("/{endpoint}")
        }
    }

    /// Map an error-status body into the error taxonomy: a structured
    /// `{code, msg}` rejection when the body parses, otherwise a
    /// transport-class fallback carrying the raw payload.
    fn parse_error_body(status: u16, body: &str) -> BinanceError {
        #[derive(Deserialize)]
        struct ErrorBody {
            code: i64,
            msg: String,
        }

        match serde_json::from_str::<ErrorBody>(body) {
            Ok(err) => BinanceError::Rejected {
                code: err.code,
                message: err.msg,
            },
            Err(_) => BinanceError::Transport(format!("HTTP {status}: {body}")),
        }
    }
}
