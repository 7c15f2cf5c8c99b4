//! The Management API client.

use crate::client::{HttpTransport, HttpTransportBuilder};
use crate::endpoints::{
    AssetApi, ComponentApi, ManagementApi, SpaceApi, StoryApi, StoryBulkApi, TagApi, UserApi,
    WorkflowApi, WorkflowStageApi,
};
use crate::logger::Logger;
use crate::record::Payload;
use crate::region::Region;
use crate::response::ApiResponse;
use crate::retry::{RateLimitPolicy, RetryPredicate, RetryStrategy};
use crate::transport::{ApiRequest, Transport};
use crate::Result;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Entry point to the Management API.
///
/// The client is generic over its [`Transport`] so tests and embedders can
/// supply their own; by default it talks HTTP through [`HttpTransport`].
/// Resource APIs are borrowed views created per call site:
///
/// ```no_run
/// use storyblok_mapi::{ManagementClient, Story};
///
/// # async fn example() -> Result<(), storyblok_mapi::Error> {
/// let client = ManagementClient::builder()
///     .personal_access_token("my-token")
///     .build()?;
///
/// let stories = client.stories(12345);
/// let created = stories.create(&Story::new("About", "about")).await?.data()?;
/// println!("created story {:?}", created.id());
/// # Ok(())
/// # }
/// ```
pub struct ManagementClient<T = HttpTransport> {
    transport: Arc<T>,
    logger: Logger,
    rate_limit: RateLimitPolicy,
}

impl ManagementClient<HttpTransport> {
    pub fn builder() -> ManagementClientBuilder {
        ManagementClientBuilder::new()
    }

    /// Creates a client configured from the environment.
    ///
    /// See [`HttpTransportBuilder::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or a value is malformed.
    pub fn from_env() -> Result<Self> {
        ManagementClientBuilder::from_env()?.build()
    }
}

impl<T: Transport> ManagementClient<T> {
    /// Creates a client over `transport` with a silent logger and the
    /// default rate-limit policy.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            logger: Logger::none(),
            rate_limit: RateLimitPolicy::default(),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_rate_limit_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn rate_limit_policy(&self) -> RateLimitPolicy {
        self.rate_limit
    }

    /// Sends a request and wraps the answer, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the transport got no response at all.
    pub async fn send<P: Payload>(&self, request: ApiRequest) -> Result<ApiResponse<P>> {
        let raw = self.transport.request(request).await?;
        Ok(ApiResponse::new(raw))
    }

    /// Untyped access to any endpoint.
    pub fn api(&self) -> ManagementApi<'_, T> {
        ManagementApi::new(self)
    }

    pub fn spaces(&self) -> SpaceApi<'_, T> {
        SpaceApi::new(self)
    }

    pub fn stories(&self, space_id: i64) -> StoryApi<'_, T> {
        StoryApi::new(self, space_id)
    }

    /// Paginated fetching and sequential creation of stories.
    pub fn story_bulk(&self, space_id: i64) -> StoryBulkApi<'_, T> {
        StoryBulkApi::new(self.stories(space_id))
    }

    pub fn components(&self, space_id: i64) -> ComponentApi<'_, T> {
        ComponentApi::new(self, space_id)
    }

    pub fn assets(&self, space_id: i64) -> AssetApi<'_, T> {
        AssetApi::new(self, space_id)
    }

    pub fn tags(&self, space_id: i64) -> TagApi<'_, T> {
        TagApi::new(self, space_id)
    }

    pub fn workflows(&self, space_id: i64) -> WorkflowApi<'_, T> {
        WorkflowApi::new(self, space_id)
    }

    pub fn workflow_stages(&self, space_id: i64) -> WorkflowStageApi<'_, T> {
        WorkflowStageApi::new(self, space_id)
    }

    pub fn users(&self) -> UserApi<'_, T> {
        UserApi::new(self)
    }
}

impl<T> Clone for ManagementClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            logger: self.logger.clone(),
            rate_limit: self.rate_limit,
        }
    }
}

impl<T> fmt::Debug for ManagementClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagementClient")
            .field("logger", &self.logger)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`ManagementClient`] over HTTP.
///
/// # Examples
///
/// ```no_run
/// use storyblok_mapi::{Logger, ManagementClient, RateLimitPolicy, Region};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), storyblok_mapi::Error> {
/// let client = ManagementClient::builder()
///     .personal_access_token("my-token")
///     .region(Region::Us)
///     .timeout(Duration::from_secs(20))
///     .logger(Logger::current())
///     .rate_limit_policy(RateLimitPolicy::new(5, Duration::from_millis(500)))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ManagementClientBuilder {
    transport: HttpTransportBuilder,
    logger: Logger,
    rate_limit: RateLimitPolicy,
}

impl ManagementClientBuilder {
    pub fn new() -> Self {
        Self::with_transport(HttpTransportBuilder::new())
    }

    /// Starts from [`HttpTransportBuilder::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or a value is malformed.
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_transport(HttpTransportBuilder::from_env()?))
    }

    fn with_transport(transport: HttpTransportBuilder) -> Self {
        Self {
            transport,
            logger: Logger::none(),
            rate_limit: RateLimitPolicy::default(),
        }
    }

    pub fn personal_access_token(mut self, token: impl Into<String>) -> Self {
        self.transport = self.transport.personal_access_token(token);
        self
    }

    pub fn oauth_token(mut self, token: impl AsRef<str>) -> Self {
        self.transport = self.transport.oauth_token(token);
        self
    }

    pub fn region(mut self, region: Region) -> Self {
        self.transport = self.transport.region(region);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.transport = self.transport.base_url(url)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        self.transport = self.transport.default_header(name, value)?;
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport = self.transport.timeout(timeout);
        self
    }

    pub fn retry_strategy(mut self, strategy: RetryStrategy) -> Self {
        self.transport = self.transport.retry_strategy(strategy);
        self
    }

    pub fn retry_predicate(mut self, predicate: Box<dyn RetryPredicate>) -> Self {
        self.transport = self.transport.retry_predicate(predicate);
        self
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    pub fn rate_limit_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit = policy;
        self
    }

    /// # Errors
    ///
    /// Returns an error if no token was provided or the transport could not
    /// be built.
    pub fn build(self) -> Result<ManagementClient> {
        Ok(ManagementClient::new(self.transport.build()?)
            .with_logger(self.logger)
            .with_rate_limit_policy(self.rate_limit))
    }
}

impl Default for ManagementClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
