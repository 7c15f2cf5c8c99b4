//! Bulk story operations against a scripted in-memory transport.
//!
//! The scripted transport answers from a queue and records every request,
//! so these tests can assert exact request counts and order.

use http::StatusCode;
use serde_json::json;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storyblok_mapi::query::{QueryFilters, StoriesParams};
use storyblok_mapi::{
    ApiRequest, Error, Logger, ManagementClient, RateLimitPolicy, RawResponse, Result, Story,
    Transport,
};

#[derive(Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<RawResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn pages_requested(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.query.get("page").unwrap_or_default().to_string())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    async fn request(&self, request: ApiRequest) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")
    }
}

fn page(slugs: &[&str], total: Option<u64>) -> Result<RawResponse> {
    let stories: Vec<_> = slugs
        .iter()
        .map(|slug| json!({ "name": slug.to_uppercase(), "slug": slug }))
        .collect();
    let raw = RawResponse::new(StatusCode::OK, json!({ "stories": stories }).to_string());
    match total {
        Some(total) => Ok(raw.with_header("total", total.to_string()).unwrap()),
        None => Ok(raw),
    }
}

fn created(slug: &str) -> Result<RawResponse> {
    let body = json!({ "story": { "id": 1, "name": slug.to_uppercase(), "slug": slug } });
    Ok(RawResponse::new(StatusCode::CREATED, body.to_string()))
}

fn status(code: u16) -> Result<RawResponse> {
    Ok(RawResponse::new(StatusCode::from_u16(code).unwrap(), ""))
}

fn client(responses: Vec<Result<RawResponse>>) -> ManagementClient<ScriptedTransport> {
    ManagementClient::new(ScriptedTransport::new(responses))
        .with_rate_limit_policy(RateLimitPolicy::new(3, Duration::from_millis(1)))
}

fn slugs(stories: &[Story]) -> Vec<String> {
    stories.iter().map(Story::slug).collect()
}

async fn fetch_all(client: &ManagementClient<ScriptedTransport>, per_page: u32) -> Result<Vec<Story>> {
    client
        .story_bulk(1)
        .all(StoriesParams::default(), QueryFilters::new(), per_page)
        .try_collect()
        .await
}

#[tokio::test]
async fn test_fetches_every_page_in_order() {
    let client = client(vec![
        page(&["a", "b"], Some(5)),
        page(&["c", "d"], None),
        page(&["e"], None),
    ]);

    let stories = fetch_all(&client, 2).await.unwrap();

    assert_eq!(slugs(&stories), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(client.transport().pages_requested(), vec!["1", "2", "3"]);
    assert!(client
        .transport()
        .requests()
        .iter()
        .all(|r| r.path == "spaces/1/stories" && r.query.get("per_page") == Some("2")));
}

#[tokio::test]
async fn test_rate_limited_first_page_is_retried_in_place() {
    let client = client(vec![
        status(429),
        status(429),
        page(&["a", "b"], Some(6)),
        page(&["c", "d"], Some(6)),
        page(&["e", "f"], Some(6)),
    ]);

    let stories = fetch_all(&client, 2).await.unwrap();

    assert_eq!(slugs(&stories), vec!["a", "b", "c", "d", "e", "f"]);
    assert_eq!(client.transport().requests().len(), 5);
    assert_eq!(
        client.transport().pages_requested(),
        vec!["1", "1", "1", "2", "3"]
    );
}

#[tokio::test]
async fn test_rate_limited_later_page_yields_its_records_once() {
    let client = client(vec![
        page(&["a", "b"], Some(4)),
        status(429),
        page(&["c", "d"], Some(4)),
    ]);

    let stories = fetch_all(&client, 2).await.unwrap();

    assert_eq!(slugs(&stories), vec!["a", "b", "c", "d"]);
    assert_eq!(client.transport().pages_requested(), vec!["1", "2", "2"]);
}

#[tokio::test]
async fn test_retry_budget_resets_after_each_page() {
    let client = client(vec![
        status(429),
        status(429),
        status(429),
        page(&["a"], Some(2)),
        status(429),
        status(429),
        status(429),
        page(&["b"], Some(2)),
    ]);

    let stories = fetch_all(&client, 1).await.unwrap();

    assert_eq!(slugs(&stories), vec!["a", "b"]);
    assert_eq!(client.transport().requests().len(), 8);
}

#[tokio::test]
async fn test_rate_limit_beyond_budget_stops_the_stream() {
    let client = client(vec![
        page(&["a"], Some(3)),
        status(429),
        status(429),
        status(429),
        status(429),
        page(&["unreachable"], Some(3)),
    ]);

    let mut pages = client
        .story_bulk(1)
        .all(StoriesParams::default(), QueryFilters::new(), 1);

    assert_eq!(pages.next().await.unwrap().unwrap().slug(), "a");
    match pages.next().await {
        Some(Err(Error::RateLimitExceeded { attempts, context })) => {
            assert_eq!(attempts, 4);
            assert_eq!(context, "page 2");
        }
        other => panic!("Expected RateLimitExceeded, got {:?}", other),
    }
    assert!(pages.next().await.is_none());
    assert_eq!(pages.requests_sent(), 5);
    assert_eq!(client.transport().requests().len(), 5);
}

#[tokio::test]
async fn test_stopping_early_sends_no_further_requests() {
    let client = client(vec![page(&["a", "b"], Some(6)), page(&["c", "d"], Some(6))]);

    {
        let mut pages = client
            .story_bulk(1)
            .all(StoriesParams::default(), QueryFilters::new(), 2);
        assert_eq!(pages.next().await.unwrap().unwrap().slug(), "a");
        assert_eq!(pages.total_pages(), Some(3));
    }

    assert_eq!(client.transport().requests().len(), 1);
}

#[tokio::test]
async fn test_missing_total_header_means_single_page() {
    let client = client(vec![page(&["a", "b"], None)]);

    let stories = fetch_all(&client, 2).await.unwrap();

    assert_eq!(slugs(&stories), vec!["a", "b"]);
    assert_eq!(client.transport().requests().len(), 1);
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let client = client(vec![page(&["a"], Some(2)), status(404)]);

    let result = fetch_all(&client, 1).await;

    match result {
        Err(Error::Http { status, message, .. }) => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert!(message.starts_with("Not Found"));
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
    assert_eq!(client.transport().requests().len(), 2);
}

#[tokio::test]
async fn test_transport_failure_is_wrapped_with_page() {
    let client = client(vec![page(&["a"], Some(2)), Err(Error::Timeout)]);

    match fetch_all(&client, 1).await {
        Err(Error::Request { context, source }) => {
            assert_eq!(context, "page 2");
            assert!(matches!(*source, Error::Timeout));
        }
        other => panic!("Expected Request error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_page_is_wrapped_with_page() {
    let client = client(vec![Ok(RawResponse::new(StatusCode::OK, "<html>"))]);

    match fetch_all(&client, 10).await {
        Err(Error::Request { context, source }) => {
            assert_eq!(context, "page 1");
            assert!(matches!(*source, Error::Decode { .. }));
        }
        other => panic!("Expected Request error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_stories_retries_rate_limits_per_item() {
    let client = client(vec![created("one"), status(429), created("two")]);

    let stories = client
        .story_bulk(1)
        .create_stories(vec![Story::new("One", "one"), Story::new("Two", "two")])
        .try_collect()
        .await
        .unwrap();

    assert_eq!(slugs(&stories), vec!["one", "two"]);
    let requests = client.transport().requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(
        requests[2].body,
        Some(json!({ "story": { "name": "Two", "slug": "two" } }))
    );
}

#[tokio::test]
async fn test_create_stories_stops_after_exhausted_budget() {
    let client = client(vec![
        status(429),
        status(429),
        status(429),
        status(429),
        created("unreachable"),
    ]);

    let mut created_stories = client
        .story_bulk(1)
        .create_stories(vec![Story::new("One", "one"), Story::new("Two", "two")]);

    match created_stories.next().await {
        Some(Err(Error::RateLimitExceeded { attempts, context })) => {
            assert_eq!(attempts, 4);
            assert_eq!(context, "story `one`");
        }
        other => panic!("Expected RateLimitExceeded, got {:?}", other),
    }
    assert!(created_stories.next().await.is_none());
    assert_eq!(client.transport().requests().len(), 4);
}

#[tokio::test]
async fn test_create_stories_rejects_invalid_story_before_sending() {
    let client = client(vec![]);

    let result = client
        .story_bulk(1)
        .create_stories(vec![Story::new("", "no-name")])
        .try_collect()
        .await;

    assert!(matches!(result, Err(Error::Validation { resource: "Story", .. })));
    assert!(client.transport().requests().is_empty());
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capturing_logger() -> (Logger, Captured) {
    let captured = Captured::default();
    let writer = captured.clone();
    let logger = Logger::from_subscriber(
        tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish(),
    );
    (logger, captured)
}

#[tokio::test]
async fn test_rate_limit_events_go_to_the_client_logger() {
    let (logger, captured) = capturing_logger();

    let client = client(vec![
        status(429),
        status(429),
        status(429),
        status(429),
    ])
    .with_logger(logger);

    assert!(fetch_all(&client, 10).await.is_err());

    let logs = captured.text();
    assert_eq!(
        logs.matches("Rate limited while fetching stories, retrying")
            .count(),
        3
    );
    assert!(logs.contains("Rate limit retries exhausted while fetching stories"));
    assert!(logs.contains("page=1"));
}

#[tokio::test]
async fn test_failed_page_status_is_logged_with_page() {
    let (logger, captured) = capturing_logger();
    let client = client(vec![page(&["a"], Some(2)), status(404)]).with_logger(logger);

    assert!(fetch_all(&client, 1).await.is_err());

    let logs = captured.text();
    assert!(logs.contains("Failed to fetch stories page"));
    assert!(logs.contains("page=2"));
    assert!(logs.contains("status=404"));
}

#[tokio::test]
async fn test_malformed_created_story_is_logged_and_wrapped() {
    let (logger, captured) = capturing_logger();
    let client = client(vec![Ok(RawResponse::new(StatusCode::CREATED, "<html>"))])
        .with_logger(logger);

    let result = client
        .story_bulk(1)
        .create_stories(vec![Story::new("One", "one")])
        .try_collect()
        .await;

    match result {
        Err(Error::Request { context, source }) => {
            assert_eq!(context, "story `one`");
            assert!(matches!(*source, Error::Decode { .. }));
        }
        other => panic!("Expected Request error, got {:?}", other),
    }
    assert!(captured.text().contains("Malformed created story"));
}

#[tokio::test]
async fn test_failed_create_status_is_logged_with_slug() {
    let (logger, captured) = capturing_logger();
    let client = client(vec![status(422)]).with_logger(logger);

    let result = client
        .story_bulk(1)
        .create_stories(vec![Story::new("One", "one")])
        .try_collect()
        .await;

    assert!(matches!(result, Err(Error::Http { .. })));
    let logs = captured.text();
    assert!(logs.contains("Failed to create story"));
    assert!(logs.contains("status=422"));
    assert!(logs.contains("slug=one"));
}
