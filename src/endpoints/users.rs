use crate::management::ManagementClient;
use crate::resources::User;
use crate::response::ApiResponse;
use crate::transport::{ApiRequest, Transport};
use crate::Result;

/// The user owning the access token.
pub struct UserApi<'a, T> {
    client: &'a ManagementClient<T>,
}

impl<'a, T: Transport> UserApi<'a, T> {
    pub(crate) fn new(client: &'a ManagementClient<T>) -> Self {
        Self { client }
    }

    pub async fn me(&self) -> Result<ApiResponse<User>> {
        self.client.send(ApiRequest::get("users/me")).await
    }
}
