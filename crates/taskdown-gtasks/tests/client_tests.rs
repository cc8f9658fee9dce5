//! HTTP client tests: auth headers, error mapping, pagination.

mod helpers;

use helpers::mock_tasks_server::MockTasksServer;
use serde_json::json;
use taskdown_gtasks::auth::{Authenticator, Credentials};
use taskdown_gtasks::models::ApiTaskList;
use taskdown_gtasks::{ApiError, TasksClient};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bearer_client(uri: &str, token: &str) -> TasksClient {
    let auth = Authenticator::new(
        Credentials::Bearer { token: token.to_string() },
        reqwest::Client::new(),
    );
    TasksClient::with_base_url(uri, auth, reqwest::Client::new())
}

#[tokio::test]
async fn requests_carry_the_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .and(header("authorization", "Bearer sesame"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = bearer_client(&server.uri(), "sesame");
    let page = client.list_task_lists("").await.unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn not_found_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/users/@me/lists/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such list"))
        .mount(&server)
        .await;

    let client = bearer_client(&server.uri(), "t");
    let err = client.delete_task_list("nope").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "30")
                .set_body_string("slow down"),
        )
        .mount(&server)
        .await;

    let client = bearer_client(&server.uri(), "t");
    let err = client.list_task_lists("").await.unwrap_err();
    assert!(err.is_retryable());
    match err {
        ApiError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, Some(30)),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&server)
        .await;

    let client = bearer_client(&server.uri(), "t");
    let err = client.list_task_lists("").await.unwrap_err();
    assert!(matches!(err, ApiError::Auth(_)));
}

#[tokio::test]
async fn server_errors_keep_their_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/@me/lists"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = bearer_client(&server.uri(), "t");
    let err = client
        .insert_task_list(&ApiTaskList {
            title: "L".into(),
            ..ApiTaskList::default()
        })
        .await
        .unwrap_err();
    match err {
        ApiError::Service { status, detail } => {
            assert_eq!(status, 503);
            assert!(detail.contains("maintenance"));
        }
        other => panic!("expected Service, got {other:?}"),
    }
}

#[tokio::test]
async fn garbage_bodies_are_parse_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = bearer_client(&server.uri(), "t");
    let err = client.list_task_lists("").await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn list_pages_follow_the_page_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "l1", "title": "First"}],
            "nextPageToken": "page-2",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/@me/lists"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "l2", "title": "Second"}],
        })))
        .mount(&server)
        .await;

    let client = bearer_client(&server.uri(), "t");

    let first = client.list_task_lists("").await.unwrap();
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.next_page_token, "page-2");

    let second = client.list_task_lists(&first.next_page_token).await.unwrap();
    assert_eq!(second.items[0].title, "Second");
    assert!(second.next_page_token.is_empty());
}

#[tokio::test]
async fn move_omits_empty_parent_and_previous() {
    let server = MockTasksServer::start().await;
    let list_id = server.seed_list("L");
    let task_id = server.seed_task(&list_id, "", "T", "needsAction", "");

    let client = server.client();
    client.move_task(&list_id, &task_id, "", "").await.unwrap();

    let moves = server.moves();
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].parent, "");
    assert_eq!(moves[0].previous, "");
}
