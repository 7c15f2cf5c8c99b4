//! Management API resources as typed records.
//!
//! Each resource owns one [`Document`](crate::Document) and exposes named
//! accessors over it. Accessors never fail: a missing or unconvertible field
//! reads as the empty string, `false`, `0` or `None`. Construction through
//! [`Payload::make`](crate::Payload::make) checks the resource's mandatory
//! fields.

mod asset;
mod component;
mod space;
mod story;
mod tag;
mod user;
mod workflow;

pub use asset::{Asset, Assets};
pub use component::{Component, Components};
pub use space::{Space, Spaces};
pub use story::{Stories, Story, STORY_DATE_FORMAT};
pub use tag::{Tag, Tags};
pub use user::{User, Users};
pub use workflow::{Workflow, WorkflowStage, WorkflowStages, Workflows};

use crate::document::Document;

/// Date format used by resource date accessors unless a resource overrides it.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Reads an integer field that may legitimately be absent or `null`.
pub(crate) fn optional_int(document: &Document, key: &str) -> Option<i64> {
    document.get(key).and_then(|item| item.to_i64())
}

/// Reads a string field that may legitimately be absent or `null`.
pub(crate) fn optional_string(document: &Document, key: &str) -> Option<String> {
    document.get(key).and_then(|item| item.to_text())
}
