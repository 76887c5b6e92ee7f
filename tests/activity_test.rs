//! Integration tests for the activity log and reverting changes.

mod common;

use axum::http::StatusCode;
use common::TestClient;
use serde_json::{json, Value};

async fn setup() -> (TestClient, i64) {
    let client = TestClient::new();
    client.signup("alex@example.com", "Alex", "groom").await;
    let (_, sub) = client.section_with_sub("Kitchen", "Appliances").await;
    (client, sub)
}

async fn latest_log(client: &TestClient) -> Value {
    let (_, logs) = client.get("/api/activity?limit=1").await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    logs[0].clone()
}

#[tokio::test]
async fn test_mutations_are_logged_newest_first() {
    let (client, sub) = setup().await;
    let kettle = client.create_item("Kettle", sub, 100, 200).await;
    client
        .post_json(
            &format!("/api/items/{kettle}/purchase"),
            json!({ "final_price_cents": 2999 }),
        )
        .await;

    let (status, logs) = client.get("/api/activity").await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["action"].as_str().unwrap())
        .collect();
    assert_eq!(
        actions,
        vec![
            "item_purchased",
            "item_created",
            "category_created",
            "category_created"
        ]
    );
    assert_eq!(logs[0]["user_name"], "Alex");
    assert_eq!(logs[0]["details"], "Bought \"Kettle\" for 29.99");
}

#[tokio::test]
async fn test_revert_delete_restores_item() {
    let (client, sub) = setup().await;
    let kettle = client.create_item("Kettle", sub, 100, 200).await;
    client.delete(&format!("/api/items/{kettle}")).await;

    let log = latest_log(&client).await;
    assert_eq!(log["action"], "item_deleted");

    let (status, revert) = client
        .post(&format!("/api/activity/{}/revert", log["id"]))
        .await;
    assert_eq!(status, StatusCode::OK, "{revert}");
    assert_eq!(revert["action"], "reverted");

    let (status, item) = client.get(&format!("/api/items/{kettle}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["name"], "Kettle");
    assert_eq!(item["max_price_cents"], 200);

    // The same entry cannot be reverted twice.
    let (status, _) = client
        .post(&format!("/api/activity/{}/revert", log["id"]))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_revert_purchase_and_update() {
    let (client, sub) = setup().await;
    let kettle = client.create_item("Kettle", sub, 100, 200).await;

    client
        .put_json(
            &format!("/api/items/{kettle}"),
            json!({ "name": "Big kettle", "category_id": sub, "min_price_cents": 500, "max_price_cents": 900 }),
        )
        .await;
    let update_log = latest_log(&client).await;

    client
        .post_json(
            &format!("/api/items/{kettle}/purchase"),
            json!({ "final_price_cents": 700 }),
        )
        .await;
    let purchase_log = latest_log(&client).await;

    let (status, _) = client
        .post(&format!("/api/activity/{}/revert", purchase_log["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, item) = client.get(&format!("/api/items/{kettle}")).await;
    assert_eq!(item["is_purchased"], false);

    let (status, _) = client
        .post(&format!("/api/activity/{}/revert", update_log["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, item) = client.get(&format!("/api/items/{kettle}")).await;
    assert_eq!(item["name"], "Kettle");
    assert_eq!(item["min_price_cents"], 100);

    let (_, logs) = client.get("/api/activity").await;
    let reverted: Vec<bool> = logs
        .as_array()
        .unwrap()
        .iter()
        .filter(|l| l["id"] == purchase_log["id"] || l["id"] == update_log["id"])
        .map(|l| l["reverted"].as_bool().unwrap())
        .collect();
    assert_eq!(reverted, vec![true, true]);
}

#[tokio::test]
async fn test_revert_unpurchase_restores_price() {
    let (client, sub) = setup().await;
    let kettle = client.create_item("Kettle", sub, 100, 200).await;
    client
        .post_json(
            &format!("/api/items/{kettle}/purchase"),
            json!({ "final_price_cents": 150 }),
        )
        .await;
    client.post(&format!("/api/items/{kettle}/unpurchase")).await;
    let log = latest_log(&client).await;
    assert_eq!(log["action"], "item_unpurchased");

    client
        .post(&format!("/api/activity/{}/revert", log["id"]))
        .await;
    let (_, item) = client.get(&format!("/api/items/{kettle}")).await;
    assert_eq!(item["is_purchased"], true);
    assert_eq!(item["final_price_cents"], 150);
}

#[tokio::test]
async fn test_revert_rejections() {
    let (client, _) = setup().await;
    let category_log = latest_log(&client).await;
    assert_eq!(category_log["action"], "category_created");

    let (status, body) = client
        .post(&format!("/api/activity/{}/revert", category_log["id"]))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "business_rule");

    let (status, _) = client.post("/api/activity/99999/revert").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let stranger = client.second_browser();
    stranger.signup("robin@example.com", "Robin", "bride").await;
    let (status, _) = stranger
        .post(&format!("/api/activity/{}/revert", category_log["id"]))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_activity_limit_is_clamped() {
    let (client, _) = setup().await;
    let (status, logs) = client.get("/api/activity?limit=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_revert_repurchase_restores_earlier_price() {
    let (client, sub) = setup().await;
    let kettle = client.create_item("Kettle", sub, 100, 200).await;
    for price in [100, 150] {
        client
            .post_json(
                &format!("/api/items/{kettle}/purchase"),
                json!({ "final_price_cents": price }),
            )
            .await;
    }
    let log = latest_log(&client).await;
    assert_eq!(log["action"], "item_purchased");

    let (status, _) = client
        .post(&format!("/api/activity/{}/revert", log["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, item) = client.get(&format!("/api/items/{kettle}")).await;
    assert_eq!(item["is_purchased"], true);
    assert_eq!(item["final_price_cents"], 100);
}
