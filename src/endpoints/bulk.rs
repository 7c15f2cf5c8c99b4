//! Bulk story operations.
//!
//! [`StoryPages`] walks every page of a story listing and yields stories one
//! at a time. [`CreatedStories`] creates stories one after another. Both
//! answer 429 by sleeping and repeating the same request, within the
//! client's [`RateLimitPolicy`](crate::RateLimitPolicy). They are pull-based:
//! nothing is requested until [`next`](StoryPages::next) is awaited, and
//! dropping a stream stops it.

use super::ensure_valid;
use super::stories::StoryApi;
use crate::logger::Logger;
use crate::query::{PaginationParams, QueryFilters, StoriesParams, MAX_PER_PAGE};
use crate::resources::Story;
use crate::retry::RateLimitPolicy;
use crate::transport::Transport;
use crate::{Error, Result};
use http::StatusCode;
use std::collections::VecDeque;

/// Paginated fetching and sequential creation of stories.
///
/// ```no_run
/// use storyblok_mapi::query::{QueryFilters, StoriesParams};
/// use storyblok_mapi::{ManagementClient, Story};
///
/// # async fn example() -> Result<(), storyblok_mapi::Error> {
/// let client = ManagementClient::builder()
///     .personal_access_token("my-token")
///     .build()?;
/// let bulk = client.story_bulk(12345);
///
/// let mut pages = bulk.all(StoriesParams::default(), QueryFilters::new(), 100);
/// while let Some(story) = pages.next().await {
///     println!("{}", story?.full_slug());
/// }
///
/// let drafts = vec![Story::new("One", "one"), Story::new("Two", "two")];
/// let created = bulk.create_stories(drafts).try_collect().await?;
/// assert_eq!(created.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct StoryBulkApi<'a, T> {
    stories: StoryApi<'a, T>,
}

impl<'a, T: Transport> StoryBulkApi<'a, T> {
    pub(crate) fn new(stories: StoryApi<'a, T>) -> Self {
        Self { stories }
    }

    /// Streams every story matching `params` and `filters`.
    ///
    /// `per_page` is clamped to `1..=100`.
    pub fn all(&self, params: StoriesParams, filters: QueryFilters, per_page: u32) -> StoryPages<'a, T> {
        StoryPages::new(self.stories, params, filters, per_page)
    }

    /// Creates `stories` in order, yielding each created story.
    pub fn create_stories<I>(&self, stories: I) -> CreatedStories<'a, T, I::IntoIter>
    where
        I: IntoIterator<Item = Story>,
    {
        CreatedStories::new(self.stories, stories.into_iter())
    }
}

/// The stories of a listing, fetched page by page.
///
/// Pages are requested in order, one at a time, and each page's stories are
/// yielded in server order before the next page is requested. The page count
/// comes from the `total` header of the first successful page; if that
/// header is missing, the first page is also the last.
///
/// The first error ends the stream.
pub struct StoryPages<'a, T> {
    api: StoryApi<'a, T>,
    params: StoriesParams,
    filters: QueryFilters,
    per_page: u32,
    current_page: u32,
    total_pages: Option<u32>,
    retry_count: usize,
    buffer: VecDeque<Story>,
    requests_sent: usize,
    finished: bool,
}

impl<'a, T: Transport> StoryPages<'a, T> {
    fn new(api: StoryApi<'a, T>, params: StoriesParams, filters: QueryFilters, per_page: u32) -> Self {
        Self {
            api,
            params,
            filters,
            per_page: per_page.clamp(1, MAX_PER_PAGE),
            current_page: 1,
            total_pages: None,
            retry_count: 0,
            buffer: VecDeque::new(),
            requests_sent: 0,
            finished: false,
        }
    }

    /// Returns the next story, fetching the next page when the current one is
    /// used up. `None` once every page has been yielded or an error was.
    pub async fn next(&mut self) -> Option<Result<Story>> {
        loop {
            if let Some(story) = self.buffer.pop_front() {
                return Some(Ok(story));
            }
            if self.finished {
                return None;
            }
            if matches!(self.total_pages, Some(total) if self.current_page > total) {
                self.finished = true;
                return None;
            }
            if let Err(e) = self.fetch_page().await {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }

    /// Drains the stream into a vector, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream yields.
    pub async fn try_collect(mut self) -> Result<Vec<Story>> {
        let mut stories = Vec::new();
        while let Some(story) = self.next().await {
            stories.push(story?);
        }
        Ok(stories)
    }

    /// Requests sent so far, retries included.
    pub fn requests_sent(&self) -> usize {
        self.requests_sent
    }

    /// The page count, once the first page has been fetched.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    fn logger(&self) -> &'a Logger {
        self.api.client().logger()
    }

    fn policy(&self) -> RateLimitPolicy {
        self.api.client().rate_limit_policy()
    }

    async fn fetch_page(&mut self) -> Result<()> {
        let page = self.current_page;
        loop {
            self.requests_sent += 1;
            let pagination = PaginationParams::new(page, self.per_page);
            let response = match self.api.page(&self.params, &self.filters, pagination).await {
                Ok(response) => response,
                Err(e) => {
                    self.logger().scope(|| {
                        tracing::error!(page = page, error = %e, "Failed to fetch stories page")
                    });
                    return Err(e.in_context(format!("page {}", page)));
                }
            };

            if response.is_ok() {
                let stories = match response.data() {
                    Ok(stories) => stories,
                    Err(e) => {
                        self.logger().scope(|| {
                            tracing::error!(page = page, error = %e, "Malformed stories page")
                        });
                        return Err(e.in_context(format!("page {}", page)));
                    }
                };
                if self.total_pages.is_none() {
                    self.total_pages = Some(match response.total() {
                        Some(total) => page_count(total, self.per_page),
                        None => page,
                    });
                }
                self.buffer.extend(stories);
                self.current_page += 1;
                self.retry_count = 0;
                return Ok(());
            }

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let policy = self.policy();
                if policy.allows_retry(self.retry_count) {
                    self.retry_count += 1;
                    let retry = self.retry_count;
                    self.logger().scope(|| {
                        tracing::warn!(
                            page = page,
                            retry = retry,
                            max_retries = policy.max_retries,
                            "Rate limited while fetching stories, retrying"
                        )
                    });
                    tokio::time::sleep(policy.backoff).await;
                    continue;
                }
                let attempts = self.retry_count + 1;
                self.logger().scope(|| {
                    tracing::error!(
                        page = page,
                        attempts = attempts,
                        "Rate limit retries exhausted while fetching stories"
                    )
                });
                return Err(Error::RateLimitExceeded {
                    attempts,
                    context: format!("page {}", page),
                });
            }

            let status = response.status();
            let error = response.into_error();
            self.logger().scope(|| {
                tracing::error!(
                    page = page,
                    status = status.as_u16(),
                    error = %error,
                    "Failed to fetch stories page"
                )
            });
            return Err(error);
        }
    }
}

fn page_count(total: u64, per_page: u32) -> u32 {
    let pages = total.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Stories being created one after another.
///
/// Each call to [`next`](Self::next) sends one create request and yields the
/// story the server stored. The 429 retry budget applies per story. The first
/// error ends the stream; the remaining stories are not sent.
pub struct CreatedStories<'a, T, I> {
    api: StoryApi<'a, T>,
    stories: I,
    finished: bool,
}

impl<'a, T, I> CreatedStories<'a, T, I>
where
    T: Transport,
    I: Iterator<Item = Story>,
{
    fn new(api: StoryApi<'a, T>, stories: I) -> Self {
        Self {
            api,
            stories,
            finished: false,
        }
    }

    /// Creates the next story. `None` once every story was sent or an error
    /// was yielded.
    pub async fn next(&mut self) -> Option<Result<Story>> {
        if self.finished {
            return None;
        }
        let story = self.stories.next()?;
        let created = self.create(&story).await;
        if created.is_err() {
            self.finished = true;
        }
        Some(created)
    }

    /// Creates every remaining story, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error the stream yields.
    pub async fn try_collect(mut self) -> Result<Vec<Story>> {
        let mut created = Vec::new();
        while let Some(story) = self.next().await {
            created.push(story?);
        }
        Ok(created)
    }

    async fn create(&self, story: &Story) -> Result<Story> {
        ensure_valid(story)?;
        let client = self.api.client();
        let logger = client.logger();
        let policy = client.rate_limit_policy();
        let mut retry_count = 0;

        loop {
            let response = match self.api.create(story).await {
                Ok(response) => response,
                Err(e) => {
                    logger.scope(|| {
                        tracing::error!(
                            name = %story.name(),
                            slug = %story.slug(),
                            error = %e,
                            "Failed to create story"
                        )
                    });
                    return Err(e.in_context(format!("story `{}`", story.slug())));
                }
            };

            if response.is_ok() {
                return response.data().map_err(|e| {
                    logger.scope(|| {
                        tracing::error!(
                            slug = %story.slug(),
                            error = %e,
                            "Malformed created story"
                        )
                    });
                    e.in_context(format!("story `{}`", story.slug()))
                });
            }

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                if policy.allows_retry(retry_count) {
                    retry_count += 1;
                    logger.scope(|| {
                        tracing::warn!(
                            slug = %story.slug(),
                            retry = retry_count,
                            max_retries = policy.max_retries,
                            "Rate limited while creating story, retrying"
                        )
                    });
                    tokio::time::sleep(policy.backoff).await;
                    continue;
                }
                logger.scope(|| {
                    tracing::error!(
                        name = %story.name(),
                        slug = %story.slug(),
                        attempts = retry_count + 1,
                        "Rate limit retries exhausted while creating story"
                    )
                });
                return Err(Error::RateLimitExceeded {
                    attempts: retry_count + 1,
                    context: format!("story `{}`", story.slug()),
                });
            }

            let status = response.status();
            let error = response.into_error();
            logger.scope(|| {
                tracing::error!(
                    slug = %story.slug(),
                    status = status.as_u16(),
                    error = %error,
                    "Failed to create story"
                )
            });
            return Err(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_rounds_up() {
        assert_eq!(page_count(6, 2), 3);
        assert_eq!(page_count(7, 2), 4);
        assert_eq!(page_count(0, 25), 0);
        assert_eq!(page_count(1, 100), 1);
    }
}
