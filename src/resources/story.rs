//! Stories: the content entries of a space.

use super::{optional_int, optional_string};
use crate::document::Document;
use crate::record::{Collection, Record};
use serde_json::Value;

/// Default format for story date accessors.
pub const STORY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A story or folder.
///
/// A valid story has a non-empty `name` and `slug`.
///
/// # Examples
///
/// ```
/// use storyblok_mapi::{Payload, Story};
/// use serde_json::json;
///
/// let mut story = Story::new("About us", "about-us");
/// story.set_content_type("page").set_parent_id(12);
/// assert_eq!(story.content_type(), "page");
///
/// let fetched = Story::make(json!({ "name": "Home", "slug": "home", "id": 7 }))?;
/// assert_eq!(fetched.id(), Some(7));
/// assert!(Story::make(json!({ "name": "No slug" })).is_err());
/// # Ok::<(), storyblok_mapi::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    document: Document,
}

/// A list of stories.
pub type Stories = Collection<Story>;

impl Story {
    /// Creates a story with its mandatory fields.
    pub fn new(name: &str, slug: &str) -> Self {
        let mut document = Document::new();
        document.set("name", name).set("slug", slug);
        Self { document }
    }

    pub fn id(&self) -> Option<i64> {
        optional_int(&self.document, "id")
    }

    pub fn uuid(&self) -> String {
        self.document.get_string("uuid", "")
    }

    pub fn name(&self) -> String {
        self.document.get_string("name", "")
    }

    pub fn slug(&self) -> String {
        self.document.get_string("slug", "")
    }

    pub fn full_slug(&self) -> String {
        self.document.get_string("full_slug", "")
    }

    /// The story body. Empty when the story has no content yet.
    pub fn content(&self) -> Document {
        self.document.get_array("content", Document::new())
    }

    /// The root component of the content, e.g. `"page"`.
    pub fn content_type(&self) -> String {
        self.document.get_string("content.component", "")
    }

    pub fn parent_id(&self) -> Option<i64> {
        optional_int(&self.document, "parent_id")
    }

    pub fn is_folder(&self) -> bool {
        self.document.get_bool("is_folder", false)
    }

    pub fn is_startpage(&self) -> bool {
        self.document.get_bool("is_startpage", false)
    }

    pub fn published(&self) -> bool {
        self.document.get_bool("published", false)
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.document.get_string_list("tag_list")
    }

    /// Creation date in [`STORY_DATE_FORMAT`].
    pub fn created_at(&self) -> String {
        self.created_at_with(STORY_DATE_FORMAT)
    }

    pub fn created_at_with(&self, format: &str) -> String {
        self.document.get_formatted_date_time("created_at", "", format)
    }

    pub fn updated_at(&self) -> String {
        self.document
            .get_formatted_date_time("updated_at", "", STORY_DATE_FORMAT)
    }

    /// Publication date, `None` for stories that were never published.
    pub fn published_at(&self) -> Option<String> {
        optional_string(&self.document, "published_at")?;
        Some(
            self.document
                .get_formatted_date_time("published_at", "", STORY_DATE_FORMAT),
        )
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.document.set("name", name);
        self
    }

    pub fn set_slug(&mut self, slug: &str) -> &mut Self {
        self.document.set("slug", slug);
        self
    }

    pub fn set_content(&mut self, content: Document) -> &mut Self {
        self.document.set("content", content);
        self
    }

    /// Sets the root component of the content, creating the content if needed.
    pub fn set_content_type(&mut self, component: &str) -> &mut Self {
        self.document.set("content.component", component);
        self
    }

    pub fn set_parent_id(&mut self, parent_id: i64) -> &mut Self {
        self.document.set("parent_id", parent_id);
        self
    }

    pub fn set_is_folder(&mut self, is_folder: bool) -> &mut Self {
        self.document.set("is_folder", is_folder);
        self
    }

    pub fn set_is_startpage(&mut self, is_startpage: bool) -> &mut Self {
        self.document.set("is_startpage", is_startpage);
        self
    }

    pub fn set_tag_list<S: AsRef<str>>(&mut self, tags: &[S]) -> &mut Self {
        let tags: Vec<Value> = tags
            .iter()
            .map(|tag| Value::String(tag.as_ref().to_owned()))
            .collect();
        self.document.set("tag_list", tags);
        self
    }
}

impl Record for Story {
    const RESOURCE: &'static str = "Story";
    const ENVELOPE_KEY: Option<&'static str> = Some("story");
    const COLLECTION_KEY: &'static str = "stories";

    fn construct(document: &Document) -> Self {
        Self::new(
            &document.get_string("name", ""),
            &document.get_string("slug", ""),
        )
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
        !self.name().is_empty() && !self.slug().is_empty()
    }
}
