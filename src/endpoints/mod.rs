//! Resource APIs.
//!
//! Each API is a cheap, borrowed view over a [`ManagementClient`]: it builds
//! an [`ApiRequest`] for one endpoint and returns the typed [`ApiResponse`].
//! None of them check the status; call
//! [`ApiResponse::error_for_status`] or [`ApiResponse::data`] as needed.

mod assets;
mod bulk;
mod components;
mod spaces;
mod stories;
mod tags;
mod users;
mod workflows;

pub use assets::AssetApi;
pub use bulk::{CreatedStories, StoryBulkApi, StoryPages};
pub use components::ComponentApi;
pub use spaces::SpaceApi;
pub use stories::StoryApi;
pub use tags::TagApi;
pub use users::UserApi;
pub use workflows::{WorkflowApi, WorkflowStageApi};

use crate::management::ManagementClient;
use crate::query::QueryParams;
use crate::record::{Payload, Record};
use crate::response::ApiResponse;
use crate::transport::{ApiRequest, Transport};
use crate::{Error, Result};
use serde_json::{Map, Value};

/// Untyped access to any Management API path.
///
/// ```no_run
/// use storyblok_mapi::{Document, ManagementClient};
/// use storyblok_mapi::query::QueryParams;
///
/// # async fn example() -> Result<(), storyblok_mapi::Error> {
/// let client = ManagementClient::builder()
///     .personal_access_token("my-token")
///     .build()?;
///
/// let activities = client
///     .api()
///     .get::<Document>("spaces/12345/activities", QueryParams::new())
///     .await?
///     .error_for_status()?;
/// println!("{}", activities.document()?.to_json());
/// # Ok(())
/// # }
/// ```
pub struct ManagementApi<'a, T> {
    client: &'a ManagementClient<T>,
}

impl<'a, T: Transport> ManagementApi<'a, T> {
    pub(crate) fn new(client: &'a ManagementClient<T>) -> Self {
        Self { client }
    }

    pub async fn get<P: Payload>(&self, path: &str, query: QueryParams) -> Result<ApiResponse<P>> {
        self.client
            .send(ApiRequest::get(path).with_query(&query))
            .await
    }

    pub async fn post<P: Payload>(&self, path: &str, body: Value) -> Result<ApiResponse<P>> {
        self.client.send(ApiRequest::post(path, body)).await
    }

    pub async fn put<P: Payload>(&self, path: &str, body: Value) -> Result<ApiResponse<P>> {
        self.client.send(ApiRequest::put(path, body)).await
    }

    pub async fn delete<P: Payload>(&self, path: &str) -> Result<ApiResponse<P>> {
        self.client.send(ApiRequest::delete(path)).await
    }
}

pub(crate) fn space_path(space_id: i64, rest: &str) -> String {
    format!("spaces/{}/{}", space_id, rest)
}

/// Wraps a record in its write envelope, e.g. `{"story": {...}}`.
///
/// Records without an envelope key are sent bare.
pub(crate) fn envelope<R: Record>(record: &R) -> Value {
    match R::ENVELOPE_KEY {
        Some(key) => {
            let mut body = Map::new();
            body.insert(key.to_string(), record.to_value());
            Value::Object(body)
        }
        None => record.to_value(),
    }
}

/// Rejects records that would fail their own validity check before any
/// request is sent.
pub(crate) fn ensure_valid<R: Record>(record: &R) -> Result<()> {
    if record.is_valid() {
        Ok(())
    } else {
        Err(Error::Validation {
            resource: R::RESOURCE,
            message: "mandatory fields are missing or empty".to_string(),
        })
    }
}
