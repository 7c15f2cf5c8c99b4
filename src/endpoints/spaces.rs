use super::{ensure_valid, envelope};
use crate::management::ManagementClient;
use crate::resources::{Space, Spaces};
use crate::response::ApiResponse;
use crate::transport::{ApiRequest, Transport};
use crate::Result;
use serde_json::json;

/// Spaces the token has access to.
pub struct SpaceApi<'a, T> {
    client: &'a ManagementClient<T>,
}

impl<'a, T: Transport> SpaceApi<'a, T> {
    pub(crate) fn new(client: &'a ManagementClient<T>) -> Self {
        Self { client }
    }

    pub async fn all(&self) -> Result<ApiResponse<Spaces>> {
        self.client.send(ApiRequest::get("spaces")).await
    }

    pub async fn get(&self, space_id: i64) -> Result<ApiResponse<Space>> {
        self.client
            .send(ApiRequest::get(format!("spaces/{}", space_id)))
            .await
    }

    pub async fn create(&self, space: &Space) -> Result<ApiResponse<Space>> {
        ensure_valid(space)?;
        self.client
            .send(ApiRequest::post("spaces", envelope(space)))
            .await
    }

    pub async fn update(&self, space_id: i64, space: &Space) -> Result<ApiResponse<Space>> {
        self.client
            .send(ApiRequest::put(format!("spaces/{}", space_id), envelope(space)))
            .await
    }

    pub async fn delete(&self, space_id: i64) -> Result<ApiResponse<Space>> {
        self.client
            .send(ApiRequest::delete(format!("spaces/{}", space_id)))
            .await
    }

    /// Copies a space, content included, under a new name.
    pub async fn duplicate(&self, space_id: i64, name: &str) -> Result<ApiResponse<Space>> {
        let body = json!({
            "dup_id": space_id,
            "space": { "name": name },
        });
        self.client.send(ApiRequest::post("spaces", body)).await
    }
}
