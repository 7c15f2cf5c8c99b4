use super::{optional_int, DEFAULT_DATE_FORMAT};
use crate::document::Document;
use crate::record::{Collection, Record};
use serde_json::Value;

/// A block definition with its field schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    document: Document,
}

pub type Components = Collection<Component>;

impl Component {
    pub fn new(name: &str) -> Self {
        let mut document = Document::new();
        document.set("name", name);
        Self { document }
    }

    pub fn id(&self) -> Option<i64> {
        optional_int(&self.document, "id")
    }

    /// Technical name, e.g. `"hero_banner"`.
    pub fn name(&self) -> String {
        self.document.get_string("name", "")
    }

    pub fn display_name(&self) -> String {
        self.document.get_string("display_name", "")
    }

    /// Field definitions keyed by field name.
    pub fn schema(&self) -> Document {
        self.document.get_array("schema", Document::new())
    }

    /// Content type components can be the root of a story.
    pub fn is_root(&self) -> bool {
        self.document.get_bool("is_root", false)
    }

    pub fn is_nestable(&self) -> bool {
        self.document.get_bool("is_nestable", false)
    }

    pub fn component_group_uuid(&self) -> String {
        self.document.get_string("component_group_uuid", "")
    }

    pub fn created_at(&self) -> String {
        self.document
            .get_formatted_date_time("created_at", "", DEFAULT_DATE_FORMAT)
    }

    pub fn set_display_name(&mut self, display_name: &str) -> &mut Self {
        self.document.set("display_name", display_name);
        self
    }

    pub fn set_schema(&mut self, schema: Document) -> &mut Self {
        self.document.set("schema", schema);
        self
    }

    /// Adds or replaces one field definition in the schema.
    ///
    /// The field name is used as a single key, so names containing dots are
    /// kept intact.
    pub fn set_field(&mut self, name: &str, definition: impl Into<Value>) -> &mut Self {
        let mut schema = self.schema();
        schema.set_with_separator(name, definition, "");
        self.set_schema(schema)
    }

    pub fn set_is_root(&mut self, is_root: bool) -> &mut Self {
        self.document.set("is_root", is_root);
        self
    }

    pub fn set_is_nestable(&mut self, is_nestable: bool) -> &mut Self {
        self.document.set("is_nestable", is_nestable);
        self
    }

    pub fn set_component_group_uuid(&mut self, uuid: &str) -> &mut Self {
        self.document.set("component_group_uuid", uuid);
        self
    }
}

impl Record for Component {
    const RESOURCE: &'static str = "Component";
    const ENVELOPE_KEY: Option<&'static str> = Some("component");
    const COLLECTION_KEY: &'static str = "components";

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
    use serde_json::json;

    #[test]
    fn test_set_field_builds_schema() {
        let mut component = Component::new("hero");
        component
            .set_display_name("Hero")
            .set_is_root(false)
            .set_is_nestable(true)
            .set_field("headline", json!({ "type": "text", "pos": 0 }))
            .set_field("image", json!({ "type": "asset", "pos": 1 }));

        let schema = component.schema();
        assert_eq!(schema.keys().len(), 2);
        assert_eq!(component.document().get_string("schema.image.type", ""), "asset");
        assert!(component.is_nestable());
        assert!(!component.is_root());
    }

    #[test]
    fn test_defaults() {
        let component = Component::new("teaser");
        assert!(component.schema().is_empty());
        assert_eq!(component.display_name(), "");
        assert_eq!(component.component_group_uuid(), "");
        assert_eq!(component.id(), None);
    }
}
