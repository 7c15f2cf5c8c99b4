//! Workflows and the stages stories move through inside them.

use super::optional_int;
use crate::document::Document;
use crate::record::{Collection, Record};
use serde_json::Value;

/// A workflow, optionally restricted to some content types.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    document: Document,
}

pub type Workflows = Collection<Workflow>;

impl Workflow {
    pub fn new(name: &str) -> Self {
        let mut document = Document::new();
        document.set("name", name);
        Self { document }
    }

    pub fn id(&self) -> Option<i64> {
        optional_int(&self.document, "id")
    }

    pub fn name(&self) -> String {
        self.document.get_string("name", "")
    }

    pub fn content_types(&self) -> Vec<String> {
        self.document.get_string_list("content_types")
    }

    /// The default workflow applies to content types no other workflow claims.
    pub fn is_default(&self) -> bool {
        self.document.get_bool("is_default", false)
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.document.set("name", name);
        self
    }

    pub fn set_content_types<S: AsRef<str>>(&mut self, content_types: &[S]) -> &mut Self {
        let content_types: Vec<Value> = content_types
            .iter()
            .map(|ct| Value::String(ct.as_ref().to_owned()))
            .collect();
        self.document.set("content_types", content_types);
        self
    }
}

impl Record for Workflow {
    const RESOURCE: &'static str = "Workflow";
    const ENVELOPE_KEY: Option<&'static str> = Some("workflow");
    const COLLECTION_KEY: &'static str = "workflows";

    fn construct(document: &Document) -> Self {
        Self::new(&document.get_string("name", ""))
    }

    fn from_document(document: Document) -> Self {
        Self { document }
    }

    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn is_valid(&self) -> bool {
        !self.name().is_empty()
    }
}

/// One stage of a [`Workflow`].
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowStage {
    document: Document,
}

pub type WorkflowStages = Collection<WorkflowStage>;

impl WorkflowStage {
    pub fn new(name: &str) -> Self {
        let mut document = Document::new();
        document.set("name", name);
        Self { document }
    }

    pub fn id(&self) -> Option<i64> {
        optional_int(&self.document, "id")
    }

    pub fn name(&self) -> String {
        self.document.get_string("name", "")
    }

    pub fn workflow_id(&self) -> Option<i64> {
        optional_int(&self.document, "workflow_id")
    }

    /// Hex color shown in the editor, e.g. `"#fbce41"`.
    pub fn color(&self) -> String {
        self.document.get_string("color", "")
    }

    pub fn position(&self) -> i64 {
        self.document.get_int("position", 0)
    }

    pub fn allow_publish(&self) -> bool {
        self.document.get_bool("allow_publish", false)
    }

    pub fn is_default(&self) -> bool {
        self.document.get_bool("is_default", false)
    }

    pub fn set_workflow_id(&mut self, workflow_id: i64) -> &mut Self {
        self.document.set("workflow_id", workflow_id);
        self
    }

    pub fn set_color(&mut self, color: &str) -> &mut Self {
        self.document.set("color", color);
        self
    }

    pub fn set_allow_publish(&mut self, allow_publish: bool) -> &mut Self {
        self.document.set("allow_publish", allow_publish);
        self
    }
}

impl Record for WorkflowStage {
    const RESOURCE: &'static str = "WorkflowStage";
    const ENVELOPE_KEY: Option<&'static str> = Some("workflow_stage");
    const COLLECTION_KEY: &'static str = "workflow_stages";

    fn construct(document: &Document) -> Self {
        Self::new(&document.get_string("name", ""))
    }

    fn from_document(document: Document) -> Self {
        Self { document }
    }

    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn is_valid(&self) -> bool {
        !self.name().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Payload;
    use serde_json::json;

    #[test]
    fn test_workflow_collection() {
        let workflows = Workflows::make_from_response(json!({
            "workflows": [
                { "id": 1, "name": "Default", "is_default": true, "content_types": [] },
                { "id": 2, "name": "Articles", "content_types": ["article", "news"] }
            ]
        }))
        .unwrap();

        let articles = workflows.get(1).unwrap();
        assert_eq!(articles.content_types(), vec!["article", "news"]);
        assert!(!articles.is_default());
        assert!(workflows.first().unwrap().is_default());
    }

    #[test]
    fn test_stage_defaults() {
        let stage = WorkflowStage::make(json!({ "name": "Review" })).unwrap();
        assert_eq!(stage.workflow_id(), None);
        assert_eq!(stage.color(), "");
        assert_eq!(stage.position(), 0);
        assert!(!stage.allow_publish());
    }
}
