//! Drives the real HTTP client against an in-process stub of the search API.

use alketab_lib::{
    AlKetabError, Phase, SearchApi, SearchClient, SearchSession, Settings, SortOrder,
};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Seen = Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/search", addr)
}

fn client(base_url: String) -> SearchClient {
    SearchClient::new(&Settings {
        base_url,
        api_key: "ak_test".to_string(),
        ..Settings::default()
    })
    .unwrap()
}

/// Stub answering every request with the same status and body.
async fn fixed(status: StatusCode, body: &'static str) -> SearchClient {
    let router = Router::new().route("/api/search", get(move || async move { (status, body) }));
    client(serve(router).await)
}

fn results_body(page: u32, nb_pages: u32) -> Value {
    json!({
        "success": true,
        "search": {
            "ayas": {
                "1": {
                    "aya": { "text": "b", "text_no_highlight": "b" },
                    "identifier": { "gid": page * 10 + 1, "aya_id": 2, "sura_id": 1 }
                },
                "0": {
                    "aya": { "text": "a", "text_no_highlight": "a" },
                    "identifier": { "gid": page * 10, "aya_id": 1, "sura_id": 1 }
                }
            },
            "interval": { "page": page, "nb_pages": nb_pages, "total": nb_pages * 2 },
            "runtime": 0.01
        },
        "ai": { "explain": "Verses on patience", "generated_query": "gq-token", "sort_by": "score" }
    })
}

async fn record(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let page = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    seen.lock().unwrap().push((params, key));
    Json(results_body(page, 3))
}

async fn recording_server() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/api/search", get(record))
        .with_state(Arc::clone(&seen));
    (serve(router).await, seen)
}

#[tokio::test]
async fn initial_search_sends_message_and_key() {
    let (url, seen) = recording_server().await;
    let page = client(url).search_initial("  stories about patience ").await.unwrap();

    let seen = seen.lock().unwrap();
    let (params, key) = &seen[0];
    assert_eq!(params.len(), 1);
    assert_eq!(params["message"], "stories about patience");
    assert_eq!(key.as_deref(), Some("ak_test"));

    let ids: Vec<i64> = page.verses.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![10, 11]);
    assert_eq!(page.continuation_token.as_deref(), Some("gq-token"));
    assert_eq!(page.sort_order, SortOrder::Relevance);
}

#[tokio::test]
async fn continuation_sends_token_page_and_sort_only() {
    let (url, seen) = recording_server().await;
    let page = client(url)
        .search_continuation("gq-token", 2, SortOrder::Alphabetical)
        .await
        .unwrap();
    assert_eq!(page.pagination.current_page, 2);

    let seen = seen.lock().unwrap();
    let (params, _) = &seen[0];
    assert_eq!(params["generated_query"], "gq-token");
    assert_eq!(params["page"], "2");
    assert_eq!(params["sort_by"], "alphabet");
    assert!(!params.contains_key("message"));
}

#[tokio::test]
async fn unauthorized_regardless_of_body() {
    let body = r#"{"success":true,"search":{"ayas":{"0":{"aya":{},"identifier":{}}}}}"#;
    let client = fixed(StatusCode::UNAUTHORIZED, body).await;
    assert_eq!(client.search_initial("patience").await, Err(AlKetabError::Unauthorized));
}

#[tokio::test]
async fn payment_required_and_bad_request() {
    let client = fixed(StatusCode::PAYMENT_REQUIRED, "").await;
    assert_eq!(client.search_initial("patience").await, Err(AlKetabError::InsufficientCredits));

    let client = fixed(StatusCode::BAD_REQUEST, "").await;
    assert_eq!(
        client.search_continuation("gq", 2, SortOrder::Mushaf).await,
        Err(AlKetabError::Api { code: 400, message: "Bad Request".into() })
    );
}

#[tokio::test]
async fn other_statuses_fall_through_to_body() {
    let client = fixed(StatusCode::INTERNAL_SERVER_ERROR, r#"{"success":false}"#).await;
    assert_eq!(
        client.search_initial("patience").await,
        Err(AlKetabError::Api { code: 0, message: "Search failed".into() })
    );

    let client = fixed(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").await;
    assert!(matches!(client.search_initial("patience").await, Err(AlKetabError::Parsing(_))));
}

#[tokio::test]
async fn empty_body_and_empty_results() {
    let client = fixed(StatusCode::OK, "").await;
    assert_eq!(client.search_initial("patience").await, Err(AlKetabError::NoData));

    let client = fixed(StatusCode::OK, r#"{"success":true,"search":{"ayas":{}}}"#).await;
    assert_eq!(client.search_initial("patience").await, Err(AlKetabError::NoResults));
}

#[tokio::test]
async fn connection_refused_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(format!("http://{}/api/search", addr));
    assert!(matches!(client.search_initial("patience").await, Err(AlKetabError::Network(_))));
}

#[tokio::test]
async fn timeout_is_network_error() {
    let router = Router::new().route(
        "/api/search",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "{}"
        }),
    );
    let client = SearchClient::new(&Settings {
        base_url: serve(router).await,
        timeout_secs: 1,
        ..Settings::default()
    })
    .unwrap();

    assert!(matches!(client.search_initial("patience").await, Err(AlKetabError::Network(_))));
}

#[tokio::test]
async fn session_pages_through_results() {
    let (url, seen) = recording_server().await;
    let session = SearchSession::new(client(url));

    session.start_search("patience").await;
    session.load_more().await;
    session.load_more().await;
    session.load_more().await;

    let state = session.snapshot();
    assert_eq!(state.phase, Phase::Success);
    let ids: Vec<i64> = state.verses.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![10, 11, 20, 21, 30, 31]);
    assert_eq!(state.current_page, 3);
    assert!(!state.has_more_pages());

    // Third load_more is a no-op: three requests in total.
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert!(seen[1..].iter().all(|(params, _)| params["generated_query"] == "gq-token"));
}
