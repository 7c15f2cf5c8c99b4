use super::space_path;
use crate::management::ManagementClient;
use crate::query::PaginationParams;
use crate::resources::{Tag, Tags};
use crate::response::ApiResponse;
use crate::transport::{ApiRequest, Transport};
use crate::Result;
use serde_json::json;

/// Tags of one space. Tags are identified by name.
pub struct TagApi<'a, T> {
    client: &'a ManagementClient<T>,
    space_id: i64,
}

impl<'a, T: Transport> TagApi<'a, T> {
    pub(crate) fn new(client: &'a ManagementClient<T>, space_id: i64) -> Self {
        Self { client, space_id }
    }

    pub async fn page(&self, pagination: PaginationParams) -> Result<ApiResponse<Tags>> {
        self.client
            .send(ApiRequest::get(space_path(self.space_id, "tags")).with_query(&pagination))
            .await
    }

    pub async fn create(&self, name: &str) -> Result<ApiResponse<Tag>> {
        let body = json!({ "tag": { "name": name } });
        self.client
            .send(ApiRequest::post(space_path(self.space_id, "tags"), body))
            .await
    }

    pub async fn delete(&self, name: &str) -> Result<ApiResponse<Tag>> {
        let path = space_path(self.space_id, &format!("tags/{}", encode_segment(name)));
        self.client.send(ApiRequest::delete(path)).await
    }
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_names_are_escaped_in_paths() {
        assert_eq!(encode_segment("summer sale/2024"), "summer%20sale%2F2024");
        assert_eq!(encode_segment("news"), "news");
    }
}
