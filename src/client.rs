use crate::client::SynoError::*;
use crate::config::{ApiPaths, Config};
use crate::entities::{ApiInfo, AuthData, SynologyResponse};
use crate::utils::{MAGNET_SCHEME, task_error_message, webapi_url};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Capability-info API, always served from `query.cgi`
pub const INFO_API: &str = "SYNO.API.Info";
pub const AUTH_API: &str = "SYNO.API.Auth";
pub const TASK_API: &str = "SYNO.DownloadStation.Task";

const INFO_PATH: &str = "query.cgi";
const SESSION_NAME: &str = "DownloadStation";

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Custom error types for the [`SynoClient`]
#[derive(Error, Debug)]
pub enum SynoError {
    /// Login rejected; holds the raw server reply
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Synology API error: code={code}, message={message}")]
    Api { code: i32, message: String },

    /// Carries no URL, the query string holds credentials
    #[error("Network request error")]
    Network(#[from] reqwest::Error),

    #[error("API discovery failed: {0}")]
    Discovery(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input parameter: {0}")]
    InvalidInput(String),

    #[error("{reason}")]
    TaskCreation { code: i32, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Synology Web API client for the Download Station task API
///
/// TLS certificates are not verified unless
/// [`SynoClientBuilder::verify_certificates`] is set: NAS units usually serve
/// self-signed or LAN-only certificates.
pub struct SynoClient {
    host: String,
    client: Client,
    probe_timeout: Duration,
    api_paths: ApiPaths,
}

impl SynoClient {
    /// Creates a new `SynoClient`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Host URL is empty
    /// - Host URL doesn't start with "http://" or "https://"
    /// - The HTTP client cannot be initialised
    pub fn new(
        host: &str,
        api_paths: ApiPaths,
        timeout_ms: u64,
        probe_timeout_ms: u64,
        verify_certificates: bool,
    ) -> Result<Self> {
        // Validate required configuration parameters
        if host.is_empty() {
            return Err(Configuration("Host URL cannot be empty".into()).into());
        }

        // Validate host URL format
        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(Configuration(format!(
                "Host URL must start with http:// or https://, got: {host}"
            ))
            .into());
        }

        // Remove trailing slash from host if present
        let host = host.trim_end_matches('/').to_string();
        let client = Self::create_client(timeout_ms, verify_certificates)?;

        Ok(Self {
            host,
            client,
            probe_timeout: Duration::from_millis(probe_timeout_ms),
            api_paths,
        })
    }

    fn create_client(timeout: u64, verify_certificates: bool) -> Result<Client> {
        if !verify_certificates {
            debug!("TLS certificate verification is disabled");
        }
        Client::builder()
            .timeout(Duration::from_millis(timeout))
            .danger_accept_invalid_certs(!verify_certificates)
            .build()
            .context("Failed to build HTTP client")
    }

    /// Creates a new `SynoClient` with a builder pattern
    #[must_use]
    pub fn builder() -> SynoClientBuilder {
        SynoClientBuilder::default()
    }

    /// Creates a client for the server, API layout and TLS setting stored in `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is invalid
    pub fn for_config(config: &Config) -> Result<Self> {
        Self::builder()
            .host(&config.server)
            .api_paths(config.api_paths.clone().unwrap_or_default())
            .verify_certificates(config.verify_certificates)
            .build()
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Queries `SYNO.API.Info` for the request path of every API the server offers
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Network request fails or times out
    /// - Response cannot be parsed
    /// - Server reports a failure
    pub async fn discover(&self) -> Result<ApiPaths> {
        let params = [
            ("api", INFO_API),
            ("version", "1"),
            ("method", "query"),
            ("query", "all"),
        ];

        let url = webapi_url(&self.host, INFO_PATH);
        let (response, _) = self
            .make_api_request::<SynologyResponse<BTreeMap<String, ApiInfo>>>(
                &url,
                &params,
                Some(self.probe_timeout),
            )
            .await
            .context("Failed to query API info")?;

        if !response.success {
            return Err(Discovery(format!(
                "server refused API query (code {})",
                response.error_code()
            ))
            .into());
        }

        let apis = response
            .data
            .ok_or_else(|| InvalidResponse("No data received".into()))?;
        let paths: ApiPaths = apis.into_iter().map(|(name, api)| (name, api.path)).collect();
        info!("Discovered {} APIs on {}", paths.len(), self.host);
        Ok(paths)
    }

    /// Exchanges account, password and one-time code for a session ID
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The auth API path is unknown
    /// - Network request fails
    /// - Server rejects the login ([`SynoError::Auth`] carries the raw reply)
    /// - Response cannot be parsed
    pub async fn login(&self, account: &str, password: &str, otp_code: &str) -> Result<String> {
        let params = [
            ("api", AUTH_API),
            ("version", "3"),
            ("method", "login"),
            ("account", account),
            ("passwd", password),
            ("otp_code", otp_code),
            ("session", SESSION_NAME),
            ("format", "sid"),
        ];

        let url = self.api_url(AUTH_API)?;
        let (response, body) = self
            .make_api_request::<SynologyResponse<AuthData>>(&url, &params, None)
            .await
            .context("Failed to authorize")?;

        if response.success {
            match response.data {
                Some(data) => Ok(data.sid),
                None => Err(InvalidResponse("No data received".into()).into()),
            }
        } else {
            Err(Auth(body).into())
        }
    }

    /// Checks whether the server still accepts `sid` by listing a single task
    ///
    /// Any failure counts as an invalid session.
    pub async fn check_sid(&self, sid: &str) -> bool {
        let url = match self.api_url(TASK_API) {
            Ok(url) => url,
            Err(err) => {
                warn!("Session probe skipped: {err}");
                return false;
            }
        };

        let params = [
            ("api", TASK_API),
            ("version", "1"),
            ("method", "list"),
            ("_sid", sid),
            ("limit", "1"),
        ];

        match self
            .make_api_request::<SynologyResponse<IgnoredAny>>(&url, &params, Some(self.probe_timeout))
            .await
        {
            Ok((response, _)) => {
                if !response.success {
                    debug!("Session rejected, code={}", response.error_code());
                }
                response.success
            }
            Err(err) => {
                warn!("Session probe failed: {err:#}");
                false
            }
        }
    }

    /// Creates a new download task from a URI (HTTP/HTTPS URL or magnet link)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - URI, destination or session ID is empty
    /// - URI doesn't start with http://, https://, or magnet:
    /// - The task API path is unknown
    /// - Network request fails
    /// - Server rejects the task ([`SynoError::TaskCreation`] carries the reason)
    pub async fn create_task(&self, sid: &str, uri: &str, destination: &str) -> Result<()> {
        // Validate input parameters
        if uri.is_empty() {
            return Err(InvalidInput("URI cannot be empty".into()).into());
        }

        if destination.is_empty() {
            return Err(InvalidInput("Destination path cannot be empty".into()).into());
        }

        // Basic URI validation
        if !uri.starts_with("http://")
            && !uri.starts_with("https://")
            && !uri.starts_with(MAGNET_SCHEME)
        {
            return Err(InvalidInput(format!(
                "URI must start with http://, https://, or magnet:, got: {uri}"
            ))
            .into());
        }

        // Check if we have a session ID
        if sid.is_empty() {
            return Err(Auth("No session ID available".into()).into());
        }

        debug!("Creating download task. Destination: {destination}");

        let params = [
            ("api", TASK_API),
            ("version", "1"),
            ("method", "create"),
            ("uri", uri),
            ("destination", destination),
            ("_sid", sid),
        ];

        let url = self.api_url(TASK_API)?;
        let (response, _) = self
            .make_api_request::<SynologyResponse<IgnoredAny>>(&url, &params, None)
            .await
            .context("Failed to create download task")?;

        if response.success {
            debug!("Successfully created download task in {destination}");
            Ok(())
        } else {
            let code = response.error_code();
            Err(TaskCreation {
                code,
                reason: task_error_message(code),
            }
            .into())
        }
    }

    fn api_url(&self, api: &str) -> Result<String> {
        let path = self
            .api_paths
            .get(api)
            .ok_or_else(|| Configuration(format!("No request path known for {api}")))?;
        Ok(webapi_url(&self.host, path))
    }

    /// Makes a GET API request and returns the parsed reply with its raw body
    async fn make_api_request<R>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        timeout: Option<Duration>,
    ) -> Result<(R, String)>
    where
        R: DeserializeOwned,
    {
        debug!(
            "Making API request to: {} with {} parameters",
            url,
            params.len()
        );

        let mut request = self.client.get(url).query(params);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|err| Network(err.without_url()))
            .context("Failed to make API request")?;

        let status = response.status();
        debug!("API request status: {status}");
        if !status.is_success() {
            return Err(Api {
                code: i32::from(status.as_u16()),
                message: format!(
                    "HTTP request failed with status: {} ({})",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|err| Network(err.without_url()))
            .context("Failed to read API response")?;
        let parsed =
            serde_json::from_str::<R>(&body).map_err(|err| InvalidResponse(err.to_string()))?;
        Ok((parsed, body))
    }
}

/// Builder for [`SynoClient`]
#[derive(Default)]
pub struct SynoClientBuilder {
    host: Option<String>,
    api_paths: Option<ApiPaths>,
    timeout: Option<u64>,
    probe_timeout: Option<u64>,
    verify_certificates: bool,
}

impl SynoClientBuilder {
    /// Sets the host URL
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the discovered API layout
    #[must_use]
    pub fn api_paths(mut self, api_paths: ApiPaths) -> Self {
        self.api_paths = Some(api_paths);
        self
    }

    /// Sets the timeout for login and task creation, in milliseconds
    #[must_use]
    pub fn timeout(mut self, timeout_millis: u64) -> Self {
        self.timeout = Some(timeout_millis);
        self
    }

    /// Sets the timeout for discovery and session probes, in milliseconds
    #[must_use]
    pub fn probe_timeout(mut self, timeout_millis: u64) -> Self {
        self.probe_timeout = Some(timeout_millis);
        self
    }

    /// Enables TLS certificate validation
    #[must_use]
    pub fn verify_certificates(mut self, verify: bool) -> Self {
        self.verify_certificates = verify;
        self
    }

    /// Builds the [`SynoClient`]
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Host is not provided
    /// - Host URL doesn't start with "http://" or "https://"
    pub fn build(self) -> Result<SynoClient> {
        let host = self
            .host
            .ok_or_else(|| Configuration("Host URL is required".into()))?;

        SynoClient::new(
            &host,
            self.api_paths.unwrap_or_default(),
            self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS),
            self.probe_timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS),
            self.verify_certificates,
        )
    }
}
