//! Integration test: serve a canned detectIntent response from a local stub
//! server and drive one full turn through the client and interpreter.
//! Does not require a real dialog backend.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use lib::agent::DialogClient;
use lib::history::Origin;
use lib::session::Session;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

async fn canned_detect_intent(
    State(hits): State<Arc<AtomicUsize>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let text = body["queryInput"]["text"]["text"].as_str().unwrap_or("");
    Json(serde_json::json!({
        "queryResult": { "responseMessages": [ {
            "text": { "text": [format!("echo: {}", text)] },
            "payload": { "richContent": [[
                { "type": "description", "text": ["Part A"] },
                { "type": "description", "text": ["Part B"] },
                { "type": "chips", "options": [ { "text": "X" }, { "text": "Y" } ] },
                { "type": "button", "link": "https://example.com" }
            ]] }
        } ] }
    }))
}

#[tokio::test]
async fn detect_intent_round_trip() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/v3/*session", post(canned_detect_intent))
        .with_state(hits.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let client = DialogClient::new(format!("http://{}", addr), "test-token");
    let session = Session::new("proj", "global", "agent-1");
    let response = client
        .detect_intent(&session.name, "Hi", "en-US")
        .await
        .expect("detect intent");

    let messages = lib::reply::interpret(&response);
    assert_eq!(messages.len(), 2);

    assert_eq!(messages[0].origin, Origin::Agent);
    assert_eq!(messages[0].text, "echo: Hi");
    assert!(messages[0].link.is_empty());
    assert!(messages[0].actions.is_empty());

    let card = &messages[1];
    assert_eq!(card.origin, Origin::Card);
    assert_eq!(card.text, "Part A Part B");
    assert_eq!(card.actions, ["X", "Y"]);
    assert_eq!(card.link, "https://example.com");

    // One submitted message means exactly one outbound call.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn detect_intent_surfaces_api_errors() {
    async fn unavailable() -> (axum::http::StatusCode, &'static str) {
        (axum::http::StatusCode::SERVICE_UNAVAILABLE, "backend down")
    }
    let app = Router::new().route("/v3/*session", post(unavailable));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let client = DialogClient::new(format!("http://{}", addr), "test-token");
    let session = Session::new("proj", "global", "agent-1");
    let err = client
        .detect_intent(&session.name, "Hi", "en-US")
        .await
        .expect_err("expected api error");
    let message = err.to_string();
    assert!(message.contains("503"), "unexpected error: {}", message);
    assert!(message.contains("backend down"), "unexpected error: {}", message);
}
