use super::{optional_int, DEFAULT_DATE_FORMAT};
use crate::document::Document;
use crate::record::{Collection, Record};

/// A space: the top-level container for stories, components and assets.
#[derive(Debug, Clone, PartialEq)]
pub struct Space {
    document: Document,
}

pub type Spaces = Collection<Space>;

impl Space {
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

    /// Preview domain configured for the space.
    pub fn domain(&self) -> String {
        self.document.get_string("domain", "")
    }

    /// Server region code, e.g. `"EU"`.
    pub fn region(&self) -> String {
        self.document.get_string("region", "")
    }

    pub fn plan_level(&self) -> i64 {
        self.document.get_int("plan_level", 0)
    }

    pub fn owner_id(&self) -> Option<i64> {
        optional_int(&self.document, "owner_id")
    }

    pub fn is_demo(&self) -> bool {
        self.document.get_bool("is_demo", false)
    }

    pub fn created_at(&self) -> String {
        self.document
            .get_formatted_date_time("created_at", "", DEFAULT_DATE_FORMAT)
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.document.set("name", name);
        self
    }

    pub fn set_domain(&mut self, domain: &str) -> &mut Self {
        self.document.set("domain", domain);
        self
    }
}

impl Record for Space {
    const RESOURCE: &'static str = "Space";
    const ENVELOPE_KEY: Option<&'static str> = Some("space");
    const COLLECTION_KEY: &'static str = "spaces";

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
    fn test_space_accessors() {
        let space = Space::make_from_response(json!({
            "space": {
                "name": "Marketing",
                "id": 680,
                "region": "EU",
                "plan_level": 100,
                "created_at": "2023-11-20T14:05:12.000Z"
            }
        }))
        .unwrap();

        assert_eq!(space.id(), Some(680));
        assert_eq!(space.region(), "EU");
        assert_eq!(space.plan_level(), 100);
        assert_eq!(space.created_at(), "2023-11-20");
        assert_eq!(space.owner_id(), None);
        assert!(!space.is_demo());
    }

    #[test]
    fn test_space_requires_name() {
        assert!(Space::make(json!({ "id": 1 })).is_err());
    }
}
