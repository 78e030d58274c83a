// HTTP client for the omnipoll admin API
use crate::settings::ApiSettings;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// No response at all: connection refused, DNS, TLS, broken body
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("timeout of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),

    /// Non-2xx answer
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// 2xx answer that reports a failure in its body
    #[error("{0}")]
    Rejected(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The reason an operator should see: the server's own words when it gave any
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Server { message, .. } => message.clone(),
            Self::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }

    /// True when no response arrived (network failure or timeout)
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Picks the message of a failed response: `{error}` body, else plain text, else the status reason
fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody { error: Some(error) }) = serde_json::from_str::<ErrorBody>(body) {
        if !error.trim().is_empty() {
            return error;
        }
    }
    let text = body.trim();
    if !text.is_empty() && !text.starts_with('{') {
        return text.to_string();
    }
    status
        .canonical_reason()
        .map_or_else(|| format!("request failed with status code {}", status.as_u16()), str::to_string)
}

/// Shared client: one base URL, one set of basic credentials, one timeout
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client from settings
    ///
    /// # Errors
    ///
    /// Will return `Err` if the underlying HTTP client cannot be constructed
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            username: settings.username.clone(),
            password: settings.password.clone(),
            timeout: settings.timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        debug!("➡️  {} {}", method, url);
        self.http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
    }

    fn transport_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Transport(error)
        }
    }

    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Server {
            status: status.as_u16(),
            message: server_message(status, &body),
        })
    }

    pub(crate) async fn json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
