use super::{optional_int, DEFAULT_DATE_FORMAT};
use crate::document::Document;
use crate::record::{Collection, Record};

/// An uploaded file.
///
/// The API returns single assets without an envelope key.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    document: Document,
}

pub type Assets = Collection<Asset>;

impl Asset {
    pub fn new(filename: &str) -> Self {
        let mut document = Document::new();
        document.set("filename", filename);
        Self { document }
    }

    pub fn id(&self) -> Option<i64> {
        optional_int(&self.document, "id")
    }

    /// Full asset URL.
    pub fn filename(&self) -> String {
        self.document.get_string("filename", "")
    }

    /// Last path segment of [`filename`](Self::filename).
    pub fn short_filename(&self) -> String {
        let filename = self.filename();
        match filename.rsplit_once('/') {
            Some((_, short)) => short.to_owned(),
            None => filename,
        }
    }

    pub fn content_type(&self) -> String {
        self.document.get_string("content_type", "")
    }

    pub fn content_length(&self) -> i64 {
        self.document.get_int("content_length", 0)
    }

    pub fn alt(&self) -> String {
        self.document.get_string("alt", "")
    }

    pub fn title(&self) -> String {
        self.document.get_string("title", "")
    }

    pub fn copyright(&self) -> String {
        self.document.get_string("copyright", "")
    }

    pub fn is_private(&self) -> bool {
        self.document.get_bool("is_private", false)
    }

    pub fn asset_folder_id(&self) -> Option<i64> {
        optional_int(&self.document, "asset_folder_id")
    }

    pub fn created_at(&self) -> String {
        self.document
            .get_formatted_date_time("created_at", "", DEFAULT_DATE_FORMAT)
    }

    pub fn set_alt(&mut self, alt: &str) -> &mut Self {
        self.document.set("alt", alt);
        self
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.document.set("title", title);
        self
    }

    pub fn set_asset_folder_id(&mut self, folder_id: i64) -> &mut Self {
        self.document.set("asset_folder_id", folder_id);
        self
    }
}

impl Record for Asset {
    const RESOURCE: &'static str = "Asset";
    const ENVELOPE_KEY: Option<&'static str> = None;
    const COLLECTION_KEY: &'static str = "assets";

    fn construct(document: &Document) -> Self {
        Self::new(&document.get_string("filename", ""))
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
        !self.filename().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Payload;
    use serde_json::json;

    #[test]
    fn test_bare_asset_response() {
        let asset = Asset::make_from_response(json!({
            "id": 14,
            "filename": "https://a.storyblok.com/f/606/1024x768/cat.jpg",
            "content_type": "image/jpeg",
            "content_length": "53411",
            "is_private": false
        }))
        .unwrap();

        assert_eq!(asset.id(), Some(14));
        assert_eq!(asset.short_filename(), "cat.jpg");
        assert_eq!(asset.content_length(), 53411);
        assert_eq!(asset.alt(), "");
        assert_eq!(asset.asset_folder_id(), None);
    }

    #[test]
    fn test_asset_requires_filename() {
        assert!(Asset::make(json!({ "id": 14 })).is_err());
    }
}
