use super::space_path;
use crate::document::Document;
use crate::management::ManagementClient;
use crate::query::{AssetsParams, PaginationParams};
use crate::resources::{Asset, Assets};
use crate::response::ApiResponse;
use crate::transport::{ApiRequest, Transport};
use crate::Result;
use serde_json::json;

/// Assets of one space.
pub struct AssetApi<'a, T> {
    client: &'a ManagementClient<T>,
    space_id: i64,
}

impl<'a, T: Transport> AssetApi<'a, T> {
    pub(crate) fn new(client: &'a ManagementClient<T>, space_id: i64) -> Self {
        Self { client, space_id }
    }

    fn path(&self, rest: &str) -> String {
        space_path(self.space_id, rest)
    }

    pub async fn page(
        &self,
        params: &AssetsParams,
        pagination: PaginationParams,
    ) -> Result<ApiResponse<Assets>> {
        let request = ApiRequest::get(self.path("assets"))
            .with_query(params)
            .with_query(&pagination);
        self.client.send(request).await
    }

    /// Fetches one asset. The asset is the top-level object of the answer.
    pub async fn get(&self, asset_id: i64) -> Result<ApiResponse<Asset>> {
        self.client
            .send(ApiRequest::get(self.path(&format!("assets/{}", asset_id))))
            .await
    }

    pub async fn delete(&self, asset_id: i64) -> Result<ApiResponse<Asset>> {
        self.client
            .send(ApiRequest::delete(self.path(&format!("assets/{}", asset_id))))
            .await
    }

    /// Requests a signed upload for a file.
    ///
    /// `size` is the image size as `"<width>x<height>"`, or empty for other
    /// files. The answer carries the upload URL and the form fields to post
    /// with the file bytes.
    pub async fn sign(&self, filename: &str, size: &str) -> Result<ApiResponse<Document>> {
        let body = json!({ "filename": filename, "size": size });
        self.client
            .send(ApiRequest::post(self.path("assets"), body))
            .await
    }
}
