//! Lists every story of a space and copies drafts into it.
//!
//! This example shows how to:
//! - Configure a client from the environment
//! - Route bulk-operation warnings to a logger
//! - Page through a filtered story listing
//! - Create several stories with rate-limit backoff
//!
//! Run with:
//! `STORYBLOK_PERSONAL_ACCESS_TOKEN=... cargo run --example bulk_fetch -- <space_id>`

use storyblok_mapi::query::{Filter, FilterOperator, QueryFilters, StoriesParams};
use storyblok_mapi::{Error, Logger, ManagementClientBuilder, Story};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("storyblok_mapi=info,bulk_fetch=info")
        .init();

    let space_id: i64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .ok_or_else(|| Error::ConfigurationError("usage: bulk_fetch <space_id>".to_string()))?;

    let client = ManagementClientBuilder::from_env()?
        .logger(Logger::current())
        .build()?;
    let bulk = client.story_bulk(space_id);

    println!("=== Articles, newest first ===");
    let params = StoriesParams {
        contain_component: Some("article".to_string()),
        sort_by: Some("created_at:desc".to_string()),
        story_only: Some(true),
        ..Default::default()
    };
    let filters = QueryFilters::new().with(Filter::list(
        "category",
        FilterOperator::AnyInArray,
        &["news", "release"],
    ));

    let mut pages = bulk.all(params, filters, 100);
    let mut count = 0;
    while let Some(story) = pages.next().await {
        let story = story?;
        count += 1;
        println!("{:>4}  {}  {}", count, story.created_at(), story.full_slug());
    }
    println!(
        "{} stories in {} pages ({} requests)",
        count,
        pages.total_pages().unwrap_or(0),
        pages.requests_sent()
    );

    println!("\n=== Creating drafts ===");
    let drafts: Vec<Story> = (1..=3)
        .map(|n| {
            let mut story = Story::new(&format!("Draft {}", n), &format!("draft-{}", n));
            story.set_content_type("page").set_tag_list(&["imported"]);
            story
        })
        .collect();

    let mut created = bulk.create_stories(drafts);
    while let Some(story) = created.next().await {
        match story {
            Ok(story) => println!("created {} (id {:?})", story.slug(), story.id()),
            Err(e) => {
                eprintln!("stopped: {}", e);
                break;
            }
        }
    }

    Ok(())
}
