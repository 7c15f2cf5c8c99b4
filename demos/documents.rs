//! Working with documents and typed records offline.
//!
//! This example shows how to:
//! - Read nested fields by dot path with typed defaults
//! - Write nested fields, creating intermediate levels
//! - Build a validated record from raw JSON
//! - Iterate a list as typed records
//!
//! Run with: `cargo run --example documents`

use serde_json::json;
use storyblok_mapi::{Component, Document, Payload, Record, Stories, Story};

fn main() -> Result<(), storyblok_mapi::Error> {
    let mut content = Document::from_value(json!({
        "component": "page",
        "body": [
            { "component": "hero", "headline": "Welcome" },
            { "component": "grid", "columns": 3 }
        ],
        "seo": { "title": "Home", "noindex": false }
    }))?;

    println!("=== Reading ===");
    println!("first block: {}", content.get_string("body.0.component", "?"));
    println!("grid columns: {}", content.get_int("body.1.columns", 1));
    println!("missing with default: {}", content.get_string("seo.description", "(none)"));
    println!("noindex: {}", content.get_bool("seo.noindex", true));

    println!("\n=== Writing ===");
    content
        .set("seo.description", "The home page")
        .set("body.2", json!({ "component": "footer" }));
    println!("{}", content.to_pretty_json()?);

    println!("\n=== Records ===");
    let mut story = Story::make(json!({
        "name": "Home",
        "slug": "home",
        "created_at": "2024-03-18T09:15:00.000Z"
    }))?;
    story.set_content(content.clone());
    println!("{} [{}] created {}", story.name(), story.content_type(), story.created_at());

    match Story::make(json!({ "name": "Missing slug" })) {
        Ok(_) => println!("unexpectedly valid"),
        Err(e) => println!("rejected: {}", e),
    }

    let blocks: Vec<String> = content
        .get_array("body", Document::new())
        .iter_as::<Component>()
        .map(|block| block.document().get_string("component", ""))
        .collect();
    println!("blocks: {}", blocks.join(", "));

    println!("\n=== Collections ===");
    let stories = Stories::make_from_response(json!({
        "stories": [
            { "name": "Home", "slug": "home" },
            { "name": "About", "slug": "about" }
        ]
    }))?;
    for story in stories.iter() {
        println!("- {}", story.slug());
    }

    Ok(())
}
