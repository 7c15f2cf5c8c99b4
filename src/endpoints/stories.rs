use super::{ensure_valid, envelope, space_path};
use crate::management::ManagementClient;
use crate::query::{PaginationParams, QueryFilters, StoriesParams};
use crate::resources::{Stories, Story};
use crate::response::ApiResponse;
use crate::transport::{ApiRequest, Transport};
use crate::Result;
use serde_json::{json, Value};

/// Stories of one space.
///
/// ```no_run
/// use storyblok_mapi::query::{Filter, FilterOperator, PaginationParams, QueryFilters, StoriesParams};
/// use storyblok_mapi::ManagementClient;
///
/// # async fn example() -> Result<(), storyblok_mapi::Error> {
/// let client = ManagementClient::builder()
///     .personal_access_token("my-token")
///     .build()?;
/// let stories = client.stories(12345);
///
/// let params = StoriesParams {
///     starts_with: Some("blog/".to_string()),
///     ..Default::default()
/// };
/// let filters = QueryFilters::new().with(Filter::new("author", FilterOperator::Is, "jane"));
/// let page = stories.page(&params, &filters, PaginationParams::new(1, 50)).await?;
/// for story in page.data()? {
///     println!("{} ({})", story.name(), story.full_slug());
/// }
/// # Ok(())
/// # }
/// ```
pub struct StoryApi<'a, T> {
    client: &'a ManagementClient<T>,
    space_id: i64,
}

impl<T> Clone for StoryApi<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StoryApi<'_, T> {}

impl<'a, T: Transport> StoryApi<'a, T> {
    pub(crate) fn new(client: &'a ManagementClient<T>, space_id: i64) -> Self {
        Self { client, space_id }
    }

    pub fn space_id(&self) -> i64 {
        self.space_id
    }

    pub(crate) fn client(&self) -> &'a ManagementClient<T> {
        self.client
    }

    fn path(&self, rest: &str) -> String {
        space_path(self.space_id, rest)
    }

    /// Fetches one page of stories.
    pub async fn page(
        &self,
        params: &StoriesParams,
        filters: &QueryFilters,
        pagination: PaginationParams,
    ) -> Result<ApiResponse<Stories>> {
        let request = ApiRequest::get(self.path("stories"))
            .with_query(params)
            .with_query(filters)
            .with_query(&pagination);
        self.client.send(request).await
    }

    pub async fn get(&self, story_id: i64) -> Result<ApiResponse<Story>> {
        self.client
            .send(ApiRequest::get(self.path(&format!("stories/{}", story_id))))
            .await
    }

    /// Looks a story up by UUID. `None` if no story has it.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-2xx answer or a malformed payload.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<Story>> {
        let params = StoriesParams {
            by_uuids: vec![uuid.to_string()],
            ..Default::default()
        };
        let stories = self
            .page(&params, &QueryFilters::new(), PaginationParams::new(1, 1))
            .await?
            .error_for_status()?
            .data()?;
        Ok(stories.first())
    }

    /// Creates a draft story.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) without sending
    /// anything if the story has no name or slug.
    pub async fn create(&self, story: &Story) -> Result<ApiResponse<Story>> {
        ensure_valid(story)?;
        self.client
            .send(ApiRequest::post(self.path("stories"), envelope(story)))
            .await
    }

    /// Creates a story and publishes it in the same call.
    pub async fn create_and_publish(&self, story: &Story) -> Result<ApiResponse<Story>> {
        ensure_valid(story)?;
        let body = with_publish(envelope(story));
        self.client
            .send(ApiRequest::post(self.path("stories"), body))
            .await
    }

    pub async fn update(&self, story_id: i64, story: &Story) -> Result<ApiResponse<Story>> {
        ensure_valid(story)?;
        self.client
            .send(ApiRequest::put(
                self.path(&format!("stories/{}", story_id)),
                envelope(story),
            ))
            .await
    }

    /// Publishes a story, optionally for one language only.
    pub async fn publish(&self, story_id: i64, language: Option<&str>) -> Result<ApiResponse<Story>> {
        self.client
            .send(with_language(
                ApiRequest::get(self.path(&format!("stories/{}/publish", story_id))),
                language,
            ))
            .await
    }

    pub async fn unpublish(
        &self,
        story_id: i64,
        language: Option<&str>,
    ) -> Result<ApiResponse<Story>> {
        self.client
            .send(with_language(
                ApiRequest::get(self.path(&format!("stories/{}/unpublish", story_id))),
                language,
            ))
            .await
    }

    pub async fn delete(&self, story_id: i64) -> Result<ApiResponse<Story>> {
        self.client
            .send(ApiRequest::delete(self.path(&format!("stories/{}", story_id))))
            .await
    }
}

fn with_publish(mut body: Value) -> Value {
    if let Value::Object(map) = &mut body {
        map.insert("publish".to_string(), json!(1));
    }
    body
}

fn with_language(request: ApiRequest, language: Option<&str>) -> ApiRequest {
    match language {
        Some(lang) => request.with_query_param("lang", lang),
        None => request,
    }
}
