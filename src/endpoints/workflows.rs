use super::{ensure_valid, envelope, space_path};
use crate::management::ManagementClient;
use crate::resources::{Workflow, WorkflowStage, WorkflowStages, Workflows};
use crate::response::ApiResponse;
use crate::transport::{ApiRequest, Transport};
use crate::Result;

/// Workflows of one space.
pub struct WorkflowApi<'a, T> {
    client: &'a ManagementClient<T>,
    space_id: i64,
}

impl<'a, T: Transport> WorkflowApi<'a, T> {
    pub(crate) fn new(client: &'a ManagementClient<T>, space_id: i64) -> Self {
        Self { client, space_id }
    }

    fn path(&self, rest: &str) -> String {
        space_path(self.space_id, rest)
    }

    /// Lists workflows, optionally only those applying to one content type.
    pub async fn all(&self, content_type: Option<&str>) -> Result<ApiResponse<Workflows>> {
        let mut request = ApiRequest::get(self.path("workflows"));
        if let Some(content_type) = content_type {
            request = request.with_query_param("content_type", content_type);
        }
        self.client.send(request).await
    }

    pub async fn get(&self, workflow_id: i64) -> Result<ApiResponse<Workflow>> {
        self.client
            .send(ApiRequest::get(self.path(&format!("workflows/{}", workflow_id))))
            .await
    }

    pub async fn create(&self, workflow: &Workflow) -> Result<ApiResponse<Workflow>> {
        ensure_valid(workflow)?;
        self.client
            .send(ApiRequest::post(self.path("workflows"), envelope(workflow)))
            .await
    }

    pub async fn update(&self, workflow_id: i64, workflow: &Workflow) -> Result<ApiResponse<Workflow>> {
        ensure_valid(workflow)?;
        self.client
            .send(ApiRequest::put(
                self.path(&format!("workflows/{}", workflow_id)),
                envelope(workflow),
            ))
            .await
    }

    pub async fn delete(&self, workflow_id: i64) -> Result<ApiResponse<Workflow>> {
        self.client
            .send(ApiRequest::delete(
                self.path(&format!("workflows/{}", workflow_id)),
            ))
            .await
    }
}

/// Workflow stages of one space.
pub struct WorkflowStageApi<'a, T> {
    client: &'a ManagementClient<T>,
    space_id: i64,
}

impl<'a, T: Transport> WorkflowStageApi<'a, T> {
    pub(crate) fn new(client: &'a ManagementClient<T>, space_id: i64) -> Self {
        Self { client, space_id }
    }

    fn path(&self, rest: &str) -> String {
        space_path(self.space_id, rest)
    }

    /// Lists the stages of one workflow.
    pub async fn all(&self, workflow_id: i64) -> Result<ApiResponse<WorkflowStages>> {
        let request = ApiRequest::get(self.path("workflow_stages"))
            .with_query_param("by_workflow_id", workflow_id.to_string());
        self.client.send(request).await
    }

    pub async fn get(&self, stage_id: i64) -> Result<ApiResponse<WorkflowStage>> {
        self.client
            .send(ApiRequest::get(
                self.path(&format!("workflow_stages/{}", stage_id)),
            ))
            .await
    }

    pub async fn create(&self, stage: &WorkflowStage) -> Result<ApiResponse<WorkflowStage>> {
        ensure_valid(stage)?;
        self.client
            .send(ApiRequest::post(self.path("workflow_stages"), envelope(stage)))
            .await
    }

    pub async fn update(
        &self,
        stage_id: i64,
        stage: &WorkflowStage,
    ) -> Result<ApiResponse<WorkflowStage>> {
        ensure_valid(stage)?;
        self.client
            .send(ApiRequest::put(
                self.path(&format!("workflow_stages/{}", stage_id)),
                envelope(stage),
            ))
            .await
    }

    pub async fn delete(&self, stage_id: i64) -> Result<ApiResponse<WorkflowStage>> {
        self.client
            .send(ApiRequest::delete(
                self.path(&format!("workflow_stages/{}", stage_id)),
            ))
            .await
    }
}
