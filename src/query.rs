//! Query parameters for list endpoints.
//!
//! Parameters are a flat, ordered list of key/value strings. List-valued
//! options are comma-joined, and filter expressions use the bracket
//! convention `filter_query[<field>][<operator>]=<value>`.
//!
//! ```
//! use storyblok_mapi::query::{Filter, FilterOperator, QueryFilters, StoriesParams, ToQuery};
//!
//! let params = StoriesParams {
//!     contain_component: Some("article".to_string()),
//!     with_tag: vec!["news".to_string(), "featured".to_string()],
//!     ..Default::default()
//! };
//! assert_eq!(
//!     params.to_query().to_query_string(),
//!     "contain_component=article&with_tag=news%2Cfeatured"
//! );
//!
//! let filters = QueryFilters::new()
//!     .with(Filter::new("author", FilterOperator::Is, "jane"))
//!     .with(Filter::list("category", FilterOperator::AnyInArray, &["tech", "rust"]));
//! assert_eq!(
//!     filters.to_query().get("filter_query[category][any_in_array]"),
//!     Some("tech,rust")
//! );
//! ```

use std::fmt;

/// Largest page size the Management API serves.
pub const MAX_PER_PAGE: u32 = 100;

/// Page size used when none is given.
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Anything that renders itself as query parameters.
pub trait ToQuery {
    fn to_query(&self) -> QueryParams;
}

/// An ordered list of query parameters with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing an earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
        self
    }

    /// Sets `key` to the comma-joined `values`; does nothing for an empty list.
    pub fn insert_list<S: AsRef<str>>(&mut self, key: impl Into<String>, values: &[S]) -> &mut Self {
        if !values.is_empty() {
            self.insert(key, join(values));
        }
        self
    }

    /// Sets `key` if `value` is present.
    pub fn insert_opt<V: ToString>(&mut self, key: &str, value: Option<&V>) -> &mut Self {
        if let Some(value) = value {
            self.insert(key, value.to_string());
        }
        self
    }

    /// Merges `other` into `self`; keys of `other` win.
    pub fn extend(&mut self, other: QueryParams) -> &mut Self {
        for (key, value) in other.pairs {
            self.insert(key, value);
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Renders the parameters `application/x-www-form-urlencoded`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl ToQuery for QueryParams {
    fn to_query(&self) -> QueryParams {
        self.clone()
    }
}

fn join<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",")
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Page selection for list endpoints. Pages start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    pub page: u32,
    pub per_page: u32,
}

impl PaginationParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new(1, DEFAULT_PER_PAGE)
    }
}

impl ToQuery for PaginationParams {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .insert("page", self.page.to_string())
            .insert("per_page", self.per_page.to_string());
        query
    }
}

/// Comparison used by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Is,
    In,
    NotIn,
    Like,
    NotLike,
    AnyInArray,
    AllInArray,
    GtDate,
    LtDate,
    GtInt,
    LtInt,
    GtFloat,
    LtFloat,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Is => "is",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::Like => "like",
            FilterOperator::NotLike => "not_like",
            FilterOperator::AnyInArray => "any_in_array",
            FilterOperator::AllInArray => "all_in_array",
            FilterOperator::GtDate => "gt_date",
            FilterOperator::LtDate => "lt_date",
            FilterOperator::GtInt => "gt_int",
            FilterOperator::LtInt => "lt_int",
            FilterOperator::GtFloat => "gt_float",
            FilterOperator::LtFloat => "lt_float",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One condition on a content field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// A filter whose value is a comma-joined list.
    pub fn list<S: AsRef<str>>(field: impl Into<String>, operator: FilterOperator, values: &[S]) -> Self {
        Self::new(field, operator, join(values))
    }

    /// The bracketed query key, e.g. `filter_query[author][is]`.
    pub fn key(&self) -> String {
        format!("filter_query[{}][{}]", self.field, self.operator)
    }
}

/// A set of filters, all of which must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilters {
    filters: Vec<Filter>,
}

impl QueryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn add(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl ToQuery for QueryFilters {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        for filter in &self.filters {
            query.insert(filter.key(), filter.value.clone());
        }
        query
    }
}

/// Options for listing stories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoriesParams {
    /// Only stories whose content contains this component.
    pub contain_component: Option<String>,
    /// Full-text search over content.
    pub text_search: Option<String>,
    /// Search by name or slug.
    pub search: Option<String>,
    /// Sort expression, e.g. `"created_at:desc"` or `"content.position:asc"`.
    pub sort_by: Option<String>,
    pub with_tag: Vec<String>,
    pub with_slug: Option<String>,
    /// Full-slug prefix, e.g. `"blog/"`.
    pub starts_with: Option<String>,
    pub by_ids: Vec<i64>,
    pub by_uuids: Vec<String>,
    pub excluding_ids: Vec<i64>,
    pub with_parent: Option<i64>,
    pub in_workflow_stages: Vec<i64>,
    pub is_startpage: Option<bool>,
    pub folder_only: Option<bool>,
    pub story_only: Option<bool>,
    pub pinned: Option<bool>,
    pub in_trash: Option<bool>,
}

impl ToQuery for StoriesParams {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .insert_opt("contain_component", self.contain_component.as_ref())
            .insert_opt("text_search", self.text_search.as_ref())
            .insert_opt("search", self.search.as_ref())
            .insert_opt("sort_by", self.sort_by.as_ref())
            .insert_list("with_tag", &self.with_tag)
            .insert_opt("with_slug", self.with_slug.as_ref())
            .insert_opt("starts_with", self.starts_with.as_ref())
            .insert_list("by_uuids", &self.by_uuids)
            .insert_opt("with_parent", self.with_parent.as_ref())
            .insert_opt("is_startpage", self.is_startpage.as_ref())
            .insert_opt("folder_only", self.folder_only.as_ref())
            .insert_opt("story_only", self.story_only.as_ref())
            .insert_opt("pinned", self.pinned.as_ref())
            .insert_opt("in_trash", self.in_trash.as_ref());
        if !self.by_ids.is_empty() {
            query.insert("by_ids", join_ids(&self.by_ids));
        }
        if !self.excluding_ids.is_empty() {
            query.insert("excluding_ids", join_ids(&self.excluding_ids));
        }
        if !self.in_workflow_stages.is_empty() {
            query.insert("in_workflow_stages", join_ids(&self.in_workflow_stages));
        }
        query
    }
}

/// Options for listing assets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetsParams {
    /// Search by file name.
    pub search: Option<String>,
    pub in_folder: Option<i64>,
    pub sort_by: Option<String>,
    pub with_tags: Vec<String>,
    pub is_private: Option<bool>,
    pub by_ids: Vec<i64>,
}

impl ToQuery for AssetsParams {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .insert_opt("search", self.search.as_ref())
            .insert_opt("in_folder", self.in_folder.as_ref())
            .insert_opt("sort_by", self.sort_by.as_ref())
            .insert_list("with_tags", &self.with_tags)
            .insert_opt("is_private", self.is_private.as_ref());
        if !self.by_ids.is_empty() {
            query.insert("by_ids", join_ids(&self.by_ids));
        }
        query
    }
}

/// Options for listing components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentsParams {
    pub search: Option<String>,
    pub is_root: Option<bool>,
    pub in_group: Option<String>,
}

impl ToQuery for ComponentsParams {
    fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query
            .insert_opt("search", self.search.as_ref())
            .insert_opt("is_root", self.is_root.as_ref())
            .insert_opt("in_group", self.in_group.as_ref());
        query
    }
}
