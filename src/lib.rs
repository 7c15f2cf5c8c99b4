//! # storyblok-mapi - a client for the Storyblok Management API
//!
//! The crate is built in layers:
//!
//! - [`Document`] is an ordered JSON tree addressed by dot paths
//!   (`"content.body.0.component"`), with typed getters that fall back to a
//!   default instead of failing.
//! - Typed records such as [`Story`] or [`Component`] wrap one document each
//!   and are built through [`Payload::make`], which checks their mandatory
//!   fields. [`Collection<T>`] holds a list of them.
//! - [`ApiResponse`] adapts a raw HTTP answer: status, pagination headers,
//!   error message, and the body decoded into the expected payload.
//! - [`ManagementClient`] exposes the endpoints, including the bulk
//!   operations of [`StoryBulkApi`](endpoints::StoryBulkApi) that page
//!   through listings and back off when the API answers 429.
//!
//! ## Quick Start
//!
//! ```no_run
//! use storyblok_mapi::query::{QueryFilters, StoriesParams};
//! use storyblok_mapi::{ManagementClient, Region, Story};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), storyblok_mapi::Error> {
//!     let client = ManagementClient::builder()
//!         .personal_access_token("my-token")
//!         .region(Region::Eu)
//!         .build()?;
//!
//!     // One story
//!     let story = client.stories(12345).get(678).await?.data()?;
//!     println!("{} was created {}", story.name(), story.created_at());
//!
//!     // Every story of a folder, page by page
//!     let params = StoriesParams {
//!         starts_with: Some("blog/".to_string()),
//!         ..Default::default()
//!     };
//!     let mut pages = client.story_bulk(12345).all(params, QueryFilters::new(), 100);
//!     while let Some(story) = pages.next().await {
//!         let story = story?;
//!         println!("{}: {}", story.full_slug(), story.content_type());
//!     }
//!
//!     // Create a story
//!     let mut draft = Story::new("Hello", "hello");
//!     draft.set_content_type("article").set_parent_id(42);
//!     client.stories(12345).create(&draft).await?.error_for_status()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Endpoint calls only fail when no answer was received. A non-2xx answer is
//! still an [`ApiResponse`]; turn it into an [`Error::Http`] with
//! [`ApiResponse::error_for_status`], or read [`ApiResponse::error_message`]:
//!
//! ```no_run
//! use storyblok_mapi::{Error, ManagementClient};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = ManagementClient::builder().personal_access_token("t").build()?;
//! let response = client.stories(12345).get(678).await?;
//! if !response.is_ok() {
//!     eprintln!("{} failed: {}", response.last_called_url(), response.error_message());
//! }
//!
//! match response.error_for_status().and_then(|r| r.data()) {
//!     Ok(story) => println!("{}", story.name()),
//!     Err(Error::Http { status, message, .. }) => eprintln!("HTTP {status}: {message}"),
//!     Err(Error::Decode { raw_response, .. }) => eprintln!("not JSON: {raw_response}"),
//!     Err(e) => eprintln!("Other error: {e}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The HTTP transport reports through the ambient `tracing` subscriber. The
//! bulk operations report rate-limit retries and failures to the
//! [`Logger`] given to the client, which discards everything by default.

mod client;
mod date;
pub mod document;
pub mod endpoints;
mod error;
mod logger;
mod management;
pub mod query;
pub mod record;
mod region;
pub mod resources;
mod response;
pub mod retry;
pub mod transport;

pub use client::{HttpTransport, HttpTransportBuilder, BASE_URL_ENV, REGION_ENV, TOKEN_ENV};
pub use document::{Document, Item, Key};
pub use error::{Error, Result};
pub use logger::Logger;
pub use management::{ManagementClient, ManagementClientBuilder};
pub use record::{Collection, Payload, Record};
pub use region::Region;
pub use resources::{
    Asset, Assets, Component, Components, Space, Spaces, Stories, Story, Tag, Tags, User, Users,
    Workflow, WorkflowStage, WorkflowStages, Workflows,
};
pub use response::ApiResponse;
pub use retry::{RateLimitPolicy, RetryPredicate, RetryStrategy};
pub use transport::{ApiRequest, RawResponse, Transport};
