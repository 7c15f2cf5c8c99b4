//! Integration tests using wiremock to simulate the Management API.

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storyblok_mapi::query::{
    Filter, FilterOperator, PaginationParams, QueryFilters, StoriesParams,
};
use storyblok_mapi::retry::RetryOnRetryable;
use storyblok_mapi::{
    Error, ManagementClient, RateLimitPolicy, RetryStrategy, Story, Transport,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SPACE: i64 = 606;

fn client(server: &MockServer) -> ManagementClient {
    ManagementClient::builder()
        .personal_access_token("test-token")
        .base_url(format!("{}/v1", server.uri()))
        .unwrap()
        .rate_limit_policy(RateLimitPolicy::new(3, Duration::from_millis(5)))
        .build()
        .unwrap()
}

fn stories_body(slugs: &[&str]) -> serde_json::Value {
    let stories: Vec<_> = slugs
        .iter()
        .map(|slug| json!({ "name": slug.to_uppercase(), "slug": slug }))
        .collect();
    json!({ "stories": stories })
}

#[tokio::test]
async fn test_get_story_sends_token_and_decodes_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/spaces/606/stories/42"))
        .and(header("Authorization", "test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "story": {
                "id": 42,
                "name": "Home",
                "slug": "home",
                "content": { "component": "page" }
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client(&mock_server).stories(SPACE).get(42).await.unwrap();

    assert!(response.is_ok());
    assert!(response
        .last_called_url()
        .ends_with("/v1/spaces/606/stories/42"));
    let story = response.data().unwrap();
    assert_eq!(story.id(), Some(42));
    assert_eq!(story.content_type(), "page");
}

#[tokio::test]
async fn test_non_success_status_is_a_response_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/spaces/606/stories/7"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "error": "This record could not be found" })),
        )
        .mount(&mock_server)
        .await;

    let response = client(&mock_server).stories(SPACE).get(7).await.unwrap();

    assert_eq!(response.status().as_u16(), 404);
    assert!(!response.is_ok());
    assert_eq!(response.error_message(), "This record could not be found");

    match response.error_for_status() {
        Err(Error::Http {
            status,
            message,
            raw_response,
        }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "This record could not be found");
            assert!(raw_response.contains("could not be found"));
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_page_sends_params_filters_and_pagination() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/spaces/606/stories"))
        .and(query_param("starts_with", "blog/"))
        .and(query_param("filter_query[author][is]", "jane"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("total", "12")
                .insert_header("per-page", "10")
                .set_body_json(stories_body(&["blog/a", "blog/b"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = StoriesParams {
        starts_with: Some("blog/".to_string()),
        ..Default::default()
    };
    let filters = QueryFilters::new().with(Filter::new("author", FilterOperator::Is, "jane"));

    let response = client(&mock_server)
        .stories(SPACE)
        .page(&params, &filters, PaginationParams::new(2, 10))
        .await
        .unwrap();

    assert_eq!(response.total(), Some(12));
    assert_eq!(response.per_page(), Some(10));
    let slugs: Vec<String> = response.data().unwrap().iter().map(|s| s.slug()).collect();
    assert_eq!(slugs, vec!["blog/a", "blog/b"]);
}

#[tokio::test]
async fn test_create_story_posts_envelope() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/spaces/606/stories"))
        .and(body_json(json!({
            "story": {
                "name": "About",
                "slug": "about",
                "content": { "component": "page" }
            },
            "publish": 1
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "story": { "id": 9, "name": "About", "slug": "about" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut story = Story::new("About", "about");
    story.set_content_type("page");

    let created = client(&mock_server)
        .stories(SPACE)
        .create_and_publish(&story)
        .await
        .unwrap()
        .data()
        .unwrap();

    assert_eq!(created.id(), Some(9));
}

#[tokio::test]
async fn test_bulk_fetch_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/spaces/606/stories"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("total", "3")
                .set_body_json(stories_body(&["a", "b"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let page_two_calls = Arc::new(AtomicUsize::new(0));
    let page_two_calls_clone = page_two_calls.clone();
    Mock::given(method("GET"))
        .and(path("/v1/spaces/606/stories"))
        .and(query_param("page", "2"))
        .respond_with(move |_req: &wiremock::Request| {
            if page_two_calls_clone.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseTemplate::new(429).set_body_string("Too Many Requests")
            } else {
                ResponseTemplate::new(200).set_body_json(stories_body(&["c"]))
            }
        })
        .mount(&mock_server)
        .await;

    let client = client(&mock_server);
    let stories = client
        .story_bulk(SPACE)
        .all(StoriesParams::default(), QueryFilters::new(), 2)
        .try_collect()
        .await
        .unwrap();

    let slugs: Vec<String> = stories.iter().map(Story::slug).collect();
    assert_eq!(slugs, vec!["a", "b", "c"]);
    assert_eq!(page_two_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_transport_retries_server_errors() {
    let mock_server = MockServer::start().await;
    let attempt_count = Arc::new(AtomicUsize::new(0));
    let attempt_count_clone = attempt_count.clone();

    Mock::given(method("GET"))
        .and(path("/v1/users/me"))
        .respond_with(move |_req: &wiremock::Request| {
            if attempt_count_clone.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(503).set_body_string("Service unavailable")
            } else {
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "user": { "id": 1, "firstname": "Ada" } }))
            }
        })
        .mount(&mock_server)
        .await;

    let client = ManagementClient::builder()
        .personal_access_token("test-token")
        .base_url(format!("{}/v1", mock_server.uri()))
        .unwrap()
        .retry_strategy(RetryStrategy::Linear {
            delay: Duration::from_millis(10),
            max_retries: 3,
        })
        .retry_predicate(Box::new(RetryOnRetryable))
        .build()
        .unwrap();

    let user = client.users().me().await.unwrap().data().unwrap();

    assert_eq!(user.firstname(), "Ada");
    assert_eq!(attempt_count.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_transport_gives_back_last_server_error_when_retries_run_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/spaces"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Server error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let client = ManagementClient::builder()
        .personal_access_token("test-token")
        .base_url(format!("{}/v1", mock_server.uri()))
        .unwrap()
        .retry_strategy(RetryStrategy::Linear {
            delay: Duration::from_millis(10),
            max_retries: 2,
        })
        .build()
        .unwrap();

    let response = client.spaces().all().await.unwrap();

    assert_eq!(response.status().as_u16(), 500);
    assert!(response.error_message().starts_with("Server Error"));
}

#[tokio::test]
async fn test_rate_limit_is_not_retried_by_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/spaces/606/components"))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ManagementClient::builder()
        .personal_access_token("test-token")
        .base_url(format!("{}/v1", mock_server.uri()))
        .unwrap()
        .retry_strategy(RetryStrategy::Linear {
            delay: Duration::from_millis(10),
            max_retries: 3,
        })
        .build()
        .unwrap();

    let response = client
        .components(SPACE)
        .all(&Default::default())
        .await
        .unwrap();

    assert!(response.into_error().is_rate_limited());
}

#[tokio::test]
async fn test_timeout_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/users/me"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    let client = ManagementClient::builder()
        .personal_access_token("test-token")
        .base_url(format!("{}/v1", mock_server.uri()))
        .unwrap()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let result = client.transport().request(storyblok_mapi::ApiRequest::get("users/me")).await;

    assert!(matches!(result, Err(Error::Timeout)));
}

#[tokio::test]
async fn test_sign_asset_returns_document() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/spaces/606/assets"))
        .and(body_json(json!({ "filename": "hero.png", "size": "800x600" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "post_url": "https://s3.amazonaws.com/a.storyblok.com",
            "fields": { "key": "f/606/800x600/hero.png", "acl": "public-read" }
        })))
        .mount(&mock_server)
        .await;

    let signed = client(&mock_server)
        .assets(SPACE)
        .sign("hero.png", "800x600")
        .await
        .unwrap()
        .data()
        .unwrap();

    assert_eq!(signed.get_string("fields.acl", ""), "public-read");
    assert_eq!(
        signed.get_string("post_url", ""),
        "https://s3.amazonaws.com/a.storyblok.com"
    );
}
