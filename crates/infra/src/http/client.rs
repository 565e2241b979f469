use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use shoptok_domain::{Result, SyncError};
use tracing::debug;

/// HTTP client with timeout and default-header support.
///
/// Retries are deliberately NOT handled here. Each integration runs
/// its requests through [`shoptok_core::RetryStrategy`], so this
/// wrapper only does transport and error classification.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the request, mapping transport failures to
    /// [`SyncError::Network`]. Status codes are not inspected here;
    /// callers classify them via [`error_for_status`].
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder
            .build()
            .map_err(|err| SyncError::Internal(format!("failed to build request: {err}")))?;

        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        let response = self.client.execute(request).await.map_err(classify_transport_error)?;

        debug!(%method, %url, status = %response.status(), "received HTTP response");
        Ok(response)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), user_agent: None, default_headers: None }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| SyncError::Internal(format!("failed to build http client: {err}")))?;

        Ok(HttpClient { client })
    }
}

fn classify_transport_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        return SyncError::Network(format!("request timed out: {err}"));
    }
    if err.is_connect() {
        return SyncError::Network(format!("connection failed: {err}"));
    }
    SyncError::Network(err.to_string())
}

/// Map an error status to the domain error for a named service.
///
/// 401/403 become [`SyncError::Auth`], 429 becomes
/// [`SyncError::RateLimited`], everything else carries the status so
/// the retry layer can distinguish 4xx from 5xx.
pub fn error_for_status(service: &str, status: StatusCode, body: &str) -> SyncError {
    let snippet: String = body.chars().take(200).collect();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SyncError::Auth(format!("{service} rejected credentials ({status}): {snippet}"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            SyncError::RateLimited(format!("{service} rate limit hit: {snippet}"))
        }
        _ => SyncError::Api { status: status.as_u16(), message: format!("{service}: {snippet}") },
    }
}
