//! The reqwest-backed [`Transport`].
//!
//! [`HttpTransport`] resolves request paths against a regional API root,
//! authenticates with a personal access token, and optionally retries
//! network faults and 5xx answers. Every answer the server gives, 4xx and 429
//! included, is handed back as a [`RawResponse`].

use crate::{
    region::Region,
    retry::{Outcome, RetryOnRetryable, RetryPredicate, RetryStrategy},
    transport::{ApiRequest, RawResponse, Transport},
    Error, Result,
};
use http::{header, HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Environment variable holding the personal access token.
pub const TOKEN_ENV: &str = "STORYBLOK_PERSONAL_ACCESS_TOKEN";
/// Environment variable holding the region code.
pub const REGION_ENV: &str = "STORYBLOK_REGION";
/// Environment variable overriding the API root.
pub const BASE_URL_ENV: &str = "STORYBLOK_BASE_URL";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// An HTTP transport for the Management API.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Examples
///
/// ```no_run
/// use storyblok_mapi::{HttpTransport, Region, RetryStrategy};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), storyblok_mapi::Error> {
/// let transport = HttpTransport::builder()
///     .personal_access_token("my-token")
///     .region(Region::Us)
///     .timeout(Duration::from_secs(30))
///     .retry_strategy(RetryStrategy::ExponentialBackoff {
///         initial_delay: Duration::from_millis(200),
///         max_delay: Duration::from_secs(5),
///         max_retries: 2,
///         jitter: true,
///     })
///     .build()?;
/// assert_eq!(transport.base_url().as_str(), "https://api-us.storyblok.com/v1/");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    retry_strategy: RetryStrategy,
    retry_predicate: Box<dyn RetryPredicate>,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// The API root request paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Builds the full URL for a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not form a valid URL.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self
            .inner
            .base_url
            .join(request.path.trim_start_matches('/'))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    /// Executes a single request attempt.
    async fn execute_request(&self, request: &ApiRequest, attempt: usize) -> Result<RawResponse> {
        let url = self.url_for(request)?;

        tracing::debug!(
            method = %request.method,
            url = %url,
            attempt = attempt,
            "Executing HTTP request"
        );

        let mut builder = self
            .inner
            .http_client
            .request(request.method.clone(), url);

        for (name, value) in &self.inner.default_headers {
            builder = builder.header(name, value);
        }

        if let Some(timeout) = self.inner.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().to_string();
        let body = response.text().await.map_err(classify)?;

        Ok(RawResponse {
            status,
            headers,
            body,
            url,
        })
    }
}

impl Transport for HttpTransport {
    async fn request(&self, request: ApiRequest) -> Result<RawResponse> {
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = self.execute_request(&request, attempt).await;

            match &result {
                Ok(response) if response.status.is_client_error() => {
                    tracing::debug!(
                        status = response.status.as_u16(),
                        response = %response.body,
                        "Client error (4xx)"
                    );
                }
                Ok(response) => {
                    tracing::info!(
                        status = response.status.as_u16(),
                        latency_ms = start_time.elapsed().as_millis(),
                        attempts = attempt,
                        "Received HTTP response"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt,
                        method = %request.method,
                        path = %request.path,
                        "Request failed"
                    );
                }
            }

            let outcome = match &result {
                Ok(response) => Outcome::Response(response),
                Err(e) => Outcome::Error(e),
            };
            if !self.inner.retry_predicate.should_retry(&outcome, attempt) {
                return result;
            }

            match self.inner.retry_strategy.delay_for_attempt(attempt) {
                Some(delay) => {
                    tracing::info!(
                        delay_ms = delay.as_millis(),
                        attempt = attempt,
                        "Retrying request after delay"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return match result {
                        Ok(response) => Ok(response),
                        Err(e) if attempt > 1 => Err(Error::MaxRetriesExceeded {
                            attempts: attempt,
                            last_error: Box::new(e),
                        }),
                        Err(e) => Err(e),
                    };
                }
            }
        }
    }
}

fn classify(error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout
    } else {
        Error::Network(error)
    }
}

/// Builder for configuring and creating an [`HttpTransport`].
///
/// # Examples
///
/// ```no_run
/// use storyblok_mapi::HttpTransportBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), storyblok_mapi::Error> {
/// let transport = HttpTransportBuilder::new()
///     .personal_access_token("my-token")
///     .base_url("https://mapi.storyblok.com/v1")?
///     .default_header("X-Request-Source", "importer")?
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct HttpTransportBuilder {
    base_url: Option<Url>,
    region: Region,
    authorization: Option<String>,
    default_headers: HeaderMap,
    retry_strategy: RetryStrategy,
    retry_predicate: Option<Box<dyn RetryPredicate>>,
    timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    /// Creates a builder targeting the EU region with no retries.
    pub fn new() -> Self {
        Self {
            base_url: None,
            region: Region::default(),
            authorization: None,
            default_headers: HeaderMap::new(),
            retry_strategy: RetryStrategy::None,
            retry_predicate: None,
            timeout: None,
        }
    }

    /// Creates a builder from `STORYBLOK_PERSONAL_ACCESS_TOKEN`,
    /// `STORYBLOK_REGION` and `STORYBLOK_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or a value is malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup(TOKEN_ENV)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::ConfigurationError(format!("{} is not set", TOKEN_ENV)))?;

        let mut builder = Self::new().personal_access_token(token);
        if let Some(region) = lookup(REGION_ENV) {
            builder = builder.region(region.parse()?);
        }
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            builder = builder.base_url(base_url)?;
        }
        Ok(builder)
    }

    /// Selects the regional API host. Ignored if [`base_url`](Self::base_url) is set.
    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Overrides the API root, e.g. for a proxy or a mock server.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let mut url = Url::parse(url.as_ref())?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Authenticates with a personal access token.
    pub fn personal_access_token(mut self, token: impl Into<String>) -> Self {
        self.authorization = Some(token.into());
        self
    }

    /// Authenticates with an OAuth access token.
    pub fn oauth_token(mut self, token: impl AsRef<str>) -> Self {
        self.authorization = Some(format!("Bearer {}", token.as_ref()));
        self
    }

    /// Adds a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the retry strategy for network faults and 5xx answers.
    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.retry_strategy = strategy;
        self
    }

    /// Sets a custom retry predicate. Defaults to [`RetryOnRetryable`].
    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.retry_predicate = Some(predicate);
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured transport.
    ///
    /// # Errors
    ///
    /// Returns an error if no token was provided or the token is not a valid
    /// header value.
    pub fn build(self) -> Result<HttpTransport> {
        let authorization = self.authorization.ok_or_else(|| {
            Error::ConfigurationError("A personal access token is required".to_string())
        })?;
        let mut authorization = HeaderValue::try_from(authorization)
            .map_err(|e| Error::ConfigurationError(format!("Invalid access token: {}", e)))?;
        authorization.set_sensitive(true);

        let mut default_headers = self.default_headers;
        default_headers.insert(header::AUTHORIZATION, authorization);

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(self.region.base_url())?,
        };

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        let retry_predicate = self
            .retry_predicate
            .unwrap_or_else(|| Box::new(RetryOnRetryable));

        Ok(HttpTransport {
            inner: Arc::new(TransportInner {
                http_client,
                base_url,
                default_headers,
                retry_strategy: self.retry_strategy,
                retry_predicate,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
