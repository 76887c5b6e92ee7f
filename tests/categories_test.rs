//! Integration tests for the category hierarchy endpoints.

mod common;

use axum::http::StatusCode;
use common::TestClient;
use serde_json::json;

async fn signed_in() -> TestClient {
    let client = TestClient::new();
    client.signup("alex@example.com", "Alex", "groom").await;
    client
}

#[tokio::test]
async fn test_create_and_list_categories() {
    let client = signed_in().await;
    let (kitchen, _) = client.section_with_sub("Kitchen", "Appliances").await;
    client.create_category("Bedroom", None).await;

    let (status, body) = client.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 3);
    assert!(names.contains(&"Appliances"));

    let (status, detail) = client.get(&format!("/api/categories/{kitchen}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Kitchen");
    assert_eq!(detail["children"][0]["name"], "Appliances");
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let client = signed_in().await;
    let (status, body) = client
        .post_json("/api/categories", json!({ "name": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}

#[tokio::test]
async fn test_tree_rolls_up_totals_in_name_order() {
    let client = signed_in().await;
    let (living, sofas) = client.section_with_sub("living room", "Sofas").await;
    let (_, pots) = client.section_with_sub("Kitchen", "Pots").await;
    client.create_item("Couch", sofas, 100_00, 200_00).await;
    client.create_item("Pan", pots, 20_00, 40_00).await;

    let (status, rows) = client.get("/api/categories/tree").await;
    assert_eq!(status, StatusCode::OK);
    let rows = rows.as_array().unwrap();

    // Case-insensitive name order: "Kitchen" before "living room".
    assert_eq!(rows[0]["name"], "Kitchen");
    assert_eq!(rows[0]["depth"], 0);
    assert_eq!(rows[1]["name"], "Pots");
    assert_eq!(rows[1]["depth"], 1);

    let living_row = rows.iter().find(|r| r["id"] == living).unwrap();
    assert_eq!(living_row["totals"]["expected_cents"], 150_00);
    assert_eq!(living_row["totals"]["item_count"], 1);
}

#[tokio::test]
async fn test_delete_rules() {
    let client = signed_in().await;
    let (section, sub) = client.section_with_sub("Bathroom", "Towels").await;
    let item = client.create_item("Bath towel", sub, 10_00, 15_00).await;

    let (status, body) = client.delete(&format!("/api/categories/{section}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "business_rule");

    let (status, _) = client.delete(&format!("/api/categories/{sub}")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    client.delete(&format!("/api/items/{item}")).await;
    let (status, _) = client.delete(&format!("/api/categories/{sub}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = client.delete(&format!("/api/categories/{section}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = client.get(&format!("/api/categories/{section}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reparenting_cannot_create_cycle() {
    let client = signed_in().await;
    let a = client.create_category("A", None).await;
    let b = client.create_category("B", Some(a)).await;
    let c = client.create_category("C", Some(b)).await;

    let (status, body) = client
        .put_json(
            &format!("/api/categories/{a}"),
            json!({ "name": "A", "parent_id": c }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot set parent: would create a circular reference"
    );

    let (status, _) = client
        .put_json(
            &format!("/api/categories/{b}"),
            json!({ "name": "B", "parent_id": b }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Promoting C to a section is fine.
    let (status, body) = client
        .put_json(
            &format!("/api/categories/{c}"),
            json!({ "name": "C renamed", "parent_id": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parent_id"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_cannot_nest_under_category_holding_items() {
    let client = signed_in().await;
    let (_, sub) = client.section_with_sub("Garden", "Tools").await;
    client.create_item("Rake", sub, 5_00, 5_00).await;

    let (status, _) = client
        .post_json("/api/categories", json!({ "name": "Small tools", "parent_id": sub }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_other_household_cannot_see_category() {
    let client = signed_in().await;
    let kitchen = client.create_category("Kitchen", None).await;

    let stranger = client.second_browser();
    stranger.signup("robin@example.com", "Robin", "bride").await;

    let (status, body) = stranger.get(&format!("/api/categories/{kitchen}")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission");

    let (status, _) = stranger
        .post_json("/api/categories", json!({ "name": "Mine", "parent_id": kitchen }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
