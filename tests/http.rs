//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.
#![cfg(feature = "http")]

use std::sync::Arc;

use serde_json::json;
use coursemarket::handlers;
use coursemarket::model::{InMemoryModelStore, ModelsExt};
use coursemarket::service::{self, Service};
use coursemarket::Course;

fn seeded_service() -> Arc<Service<InMemoryModelStore>> {
    let store = InMemoryModelStore::new();
    store
        .docs::<Course>()
        .save(&Course::open("c10", "inst-1", 4900, 1))
        .unwrap();
    Arc::new(handlers::service_over(store))
}

/// Bind to port 0 and return the actual address.
async fn start_server(service: Arc<Service<InMemoryModelStore>>) -> String {
    let app = service::router(service);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_check_lists_commands() {
    let base = start_server(seeded_service()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["ok"], true);

    let commands = body["commands"].as_array().unwrap();
    assert!(commands.iter().any(|c| c == "cart.select"));
    assert!(commands.iter().any(|c| c == "settlement.run"));
}

#[tokio::test]
async fn settle_over_http() {
    let base = start_server(seeded_service()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/cart.select"))
        .header("x-account-id", "acct-1")
        .json(&json!({ "course_id": "c10" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{base}/settlement.run"))
        .header("x-account-id", "acct-1")
        .json(&json!({
            "charge_ref": "ch_1",
            "course_ids": ["c10"],
            "amount_cents": 4900
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "applied");
    assert_eq!(body["courses"][0]["seats_available"], 0);
}

#[tokio::test]
async fn oversold_maps_to_409() {
    let base = start_server(seeded_service()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/settlement.run"))
        .header("x-account-id", "acct-1")
        .json(&json!({ "charge_ref": "ch_1", "course_ids": ["c10"], "amount_cents": 4900 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{base}/settlement.run"))
        .header("x-account-id", "acct-2")
        .json(&json!({ "charge_ref": "ch_2", "course_ids": ["c10"], "amount_cents": 4900 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn missing_identity_maps_to_401() {
    let base = start_server(seeded_service()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/cart.get"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn unknown_command_maps_to_404() {
    let base = start_server(seeded_service()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/nonexistent"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
