use crate::document::Document;
use crate::record::{Collection, Record};

/// A story tag. Tags are identified by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    document: Document,
}

pub type Tags = Collection<Tag>;

impl Tag {
    pub fn new(name: &str) -> Self {
        let mut document = Document::new();
        document.set("name", name);
        Self { document }
    }

    pub fn name(&self) -> String {
        self.document.get_string("name", "")
    }

    /// Number of stories carrying the tag.
    pub fn taggings_count(&self) -> i64 {
        self.document.get_int("taggings_count", 0)
    }
}

impl Record for Tag {
    const RESOURCE: &'static str = "Tag";
    const ENVELOPE_KEY: Option<&'static str> = Some("tag");
    const COLLECTION_KEY: &'static str = "tags";

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
