use super::{ensure_valid, envelope, space_path};
use crate::management::ManagementClient;
use crate::query::ComponentsParams;
use crate::resources::{Component, Components};
use crate::response::ApiResponse;
use crate::transport::{ApiRequest, Transport};
use crate::Result;

/// Component schemas of one space.
pub struct ComponentApi<'a, T> {
    client: &'a ManagementClient<T>,
    space_id: i64,
}

impl<'a, T: Transport> ComponentApi<'a, T> {
    pub(crate) fn new(client: &'a ManagementClient<T>, space_id: i64) -> Self {
        Self { client, space_id }
    }

    fn path(&self, rest: &str) -> String {
        space_path(self.space_id, rest)
    }

    /// Lists components. The endpoint is not paginated.
    pub async fn all(&self, params: &ComponentsParams) -> Result<ApiResponse<Components>> {
        self.client
            .send(ApiRequest::get(self.path("components")).with_query(params))
            .await
    }

    pub async fn get(&self, component_id: i64) -> Result<ApiResponse<Component>> {
        self.client
            .send(ApiRequest::get(self.path(&format!("components/{}", component_id))))
            .await
    }

    pub async fn create(&self, component: &Component) -> Result<ApiResponse<Component>> {
        ensure_valid(component)?;
        self.client
            .send(ApiRequest::post(self.path("components"), envelope(component)))
            .await
    }

    pub async fn update(
        &self,
        component_id: i64,
        component: &Component,
    ) -> Result<ApiResponse<Component>> {
        ensure_valid(component)?;
        self.client
            .send(ApiRequest::put(
                self.path(&format!("components/{}", component_id)),
                envelope(component),
            ))
            .await
    }

    pub async fn delete(&self, component_id: i64) -> Result<ApiResponse<Component>> {
        self.client
            .send(ApiRequest::delete(
                self.path(&format!("components/{}", component_id)),
            ))
            .await
    }
}
