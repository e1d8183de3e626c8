//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `HttpClient` over real
//! HTTP through the default reqwest transport: the todo CRUD lifecycle, query
//! and header plumbing via `/echo`, plain-text decoding, non-2xx statuses and
//! timeouts against `/slow`.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use swiftfetch::{ClientConfig, FetchError, HttpClient, RequestConfig, ResponseEnvelope};
use tokio::net::TcpListener;

#[derive(Debug, PartialEq, Deserialize)]
struct Todo {
    id: u64,
    title: String,
    completed: bool,
}

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    format!("http://{addr}")
}

async fn client() -> HttpClient {
    HttpClient::new(ClientConfig::new().with_base_url(start_server().await))
}

#[tokio::test]
async fn crud_lifecycle() {
    let client = client().await;

    // Step 1: list: should be empty.
    let list: ResponseEnvelope<Vec<Todo>> = client.get("/todos", None).await.unwrap();
    assert_eq!(list.status, 200);
    assert!(list.data.is_empty(), "expected empty list");

    // Step 2: create a todo.
    let created: ResponseEnvelope<Todo> = client
        .post("/todos", &json!({"title": "Integration test", "completed": false}), None)
        .await
        .unwrap();
    assert_eq!(created.status, 201);
    assert_eq!(created.status_text, "Created");
    assert_eq!(created.data.title, "Integration test");
    assert!(!created.data.completed);
    let id = created.data.id;

    // Step 3: get the created todo.
    let fetched: ResponseEnvelope<Todo> = client.get(&format!("/todos/{id}"), None).await.unwrap();
    assert_eq!(fetched.data, created.data);
    assert!(fetched.headers["content-type"].contains("application/json"));

    // Step 4: replace the document with PUT.
    let updated: ResponseEnvelope<Todo> = client
        .put(
            &format!("/todos/{id}"),
            &json!({"title": "Updated title", "completed": false}),
            None,
        )
        .await
        .unwrap();
    assert_eq!(updated.data.title, "Updated title");
    assert!(!updated.data.completed);

    // Step 5: merge one field with PATCH.
    let updated: ResponseEnvelope<Todo> = client
        .patch(&format!("/todos/{id}"), &json!({"completed": true}), None)
        .await
        .unwrap();
    assert_eq!(updated.data.title, "Updated title");
    assert!(updated.data.completed);

    // Step 6: delete. 204 carries no content type, so data is the empty text.
    let deleted: ResponseEnvelope<String> =
        client.delete(&format!("/todos/{id}"), None).await.unwrap();
    assert_eq!(deleted.status, 204);
    assert_eq!(deleted.data, "");

    // Step 7: get after delete: 404 resolves, it is not an error.
    let missing: ResponseEnvelope<String> =
        client.get(&format!("/todos/{id}"), None).await.unwrap();
    assert_eq!(missing.status, 404);
    assert_eq!(missing.status_text, "Not Found");

    // Step 8: list: should be empty again.
    let list: ResponseEnvelope<Vec<Todo>> = client.get("/todos", None).await.unwrap();
    assert!(list.data.is_empty(), "expected empty list after delete");
}

#[tokio::test]
async fn query_and_headers_reach_the_server() {
    let base = start_server().await;
    let client = HttpClient::new(
        ClientConfig::new()
            .with_base_url(base)
            .with_header("x-client", "swiftfetch")
            .with_header("x-mode", "default"),
    );

    let config = RequestConfig::new()
        .header("x-mode", "override")
        .param("tag", "a")
        .param("page", 2)
        .param("tag", "b c");
    let echoed: ResponseEnvelope = client
        .post("/echo", &json!({"hello": "world"}), Some(config))
        .await
        .unwrap();

    assert_eq!(echoed.data["method"], "POST");
    assert_eq!(
        echoed.data["query"],
        json!([["tag", "a"], ["page", "2"], ["tag", "b c"]])
    );
    assert_eq!(echoed.data["headers"]["x-client"], "swiftfetch");
    assert_eq!(echoed.data["headers"]["x-mode"], "override");
    assert_eq!(echoed.data["headers"]["content-type"], "application/json");
    let body: Value = serde_json::from_str(echoed.data["body"].as_str().unwrap()).unwrap();
    assert_eq!(body, json!({"hello": "world"}));
}

#[tokio::test]
async fn existing_query_is_extended() {
    let client = client().await;
    let echoed: ResponseEnvelope = client
        .get("/echo?first=1", Some(RequestConfig::new().param("second", 2)))
        .await
        .unwrap();
    assert_eq!(echoed.data["query"], json!([["first", "1"], ["second", "2"]]));
    assert_eq!(echoed.data["method"], "GET");
    assert_eq!(echoed.data["body"], "");
}

#[tokio::test]
async fn plain_text_is_returned_verbatim() {
    let client = client().await;
    let text: ResponseEnvelope = client.get("/text", None).await.unwrap();
    assert_eq!(text.data, Value::String("plain text body".to_string()));
    assert!(text.headers["content-type"].starts_with("text/plain"));
}

#[tokio::test]
async fn server_error_status_resolves() {
    let client = client().await;
    let response: ResponseEnvelope = client.get("/status/500", None).await.unwrap();
    assert_eq!(response.status, 500);
    assert_eq!(response.status_text, "Internal Server Error");
    assert_eq!(response.data, json!({"status": 500}));
}

#[tokio::test]
async fn slow_response_times_out() {
    let client = client().await;
    let config = RequestConfig::new()
        .param("ms", 2000)
        .timeout(Duration::from_millis(100));
    let err = client.get::<Value>("/slow", Some(config)).await.unwrap_err();
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn fast_response_beats_timeout() {
    let client = client().await;
    let config = RequestConfig::new()
        .param("ms", 10)
        .timeout(Duration::from_secs(5));
    let response: ResponseEnvelope = client.get("/slow", Some(config)).await.unwrap();
    assert_eq!(response.data["slept_ms"], 10);
}

#[tokio::test]
async fn unreachable_host_is_a_request_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::new(ClientConfig::default());
    let err = client
        .get::<Value>(&format!("http://{addr}/todos"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Request(_)));
    assert!(err.to_string().starts_with("SwiftFetch Error: "));
}
