//! Integration tests for households and partner invitations.

mod common;

use axum::http::StatusCode;
use common::TestClient;
use serde_json::json;

/// Two separate households: Alex (groom) and Robin (bride).
async fn couple() -> (TestClient, TestClient) {
    let alex = TestClient::new();
    alex.signup("alex@example.com", "Alex", "groom").await;
    let robin = alex.second_browser();
    robin.signup("robin@example.com", "Robin", "bride").await;
    (alex, robin)
}

#[tokio::test]
async fn test_solo_household_offers_invite() {
    let (alex, _) = couple().await;
    let (status, summary) = alex.get("/api/household").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["members"].as_array().unwrap().len(), 1);
    assert_eq!(summary["partner"], serde_json::Value::Null);
    assert_eq!(summary["can_invite_partner"], true);
}

#[tokio::test]
async fn test_invitation_rules() {
    let (alex, _) = couple().await;

    let (status, body) = alex
        .post_json("/api/invitations", json!({ "email": "alex@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "You cannot invite yourself");

    let (status, body) = alex
        .post_json("/api/invitations", json!({ "email": "nobody@example.com" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = alex
        .post_json("/api/invitations", json!({ "email": "not an email" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, invitation) = alex
        .post_json("/api/invitations", json!({ "email": "Robin@Example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invitation["status"], "pending");
    assert_eq!(invitation["inviter_role"], "groom");

    let (status, _) = alex
        .post_json("/api/invitations", json!({ "email": "robin@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_accepting_merges_households() {
    let (alex, robin) = couple().await;
    let (_, sub) = alex.section_with_sub("Kitchen", "Appliances").await;
    alex.create_item("Kettle", sub, 100, 200).await;
    let (_, robin_sub) = robin.section_with_sub("Bedroom", "Linens").await;
    robin.create_item("Sheets", robin_sub, 50, 50).await;

    let (_, invitation) = alex
        .post_json("/api/invitations", json!({ "email": "robin@example.com" }))
        .await;
    let invitation_id = invitation["id"].as_i64().unwrap();

    let (_, lists) = robin.get("/api/invitations").await;
    assert_eq!(lists["incoming"][0]["id"], invitation_id);

    // Only the invitee may answer.
    let (status, _) = alex
        .post(&format!("/api/invitations/{invitation_id}/accept"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, summary) = robin
        .post(&format!("/api/invitations/{invitation_id}/accept"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["members"].as_array().unwrap().len(), 2);
    assert_eq!(summary["partner"]["first_name"], "Alex");
    assert_eq!(summary["can_invite_partner"], false);

    // Both now see the combined checklist.
    let (_, alex_items) = alex.get("/api/items").await;
    let (_, robin_items) = robin.get("/api/items").await;
    assert_eq!(alex_items.as_array().unwrap().len(), 2);
    assert_eq!(alex_items, robin_items);

    let (_, logs) = alex.get("/api/activity").await;
    assert_eq!(logs[0]["action"], "partner_joined");

    let (status, _) = robin
        .post(&format!("/api/invitations/{invitation_id}/accept"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_full_household_cannot_invite_third_person() {
    let (alex, robin) = couple().await;
    let (_, invitation) = alex
        .post_json("/api/invitations", json!({ "email": "robin@example.com" }))
        .await;
    robin
        .post(&format!("/api/invitations/{}/accept", invitation["id"]))
        .await;

    let third = alex.second_browser();
    third.signup("kim@example.com", "Kim", "groom").await;

    let (status, body) = alex
        .post_json("/api/invitations", json!({ "email": "kim@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "business_rule");

    // Kim cannot pull Robin out of a full household either.
    let (status, _) = third
        .post_json("/api/invitations", json!({ "email": "robin@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_decline_invitation() {
    let (alex, robin) = couple().await;
    let (_, invitation) = alex
        .post_json("/api/invitations", json!({ "email": "robin@example.com" }))
        .await;

    let (status, declined) = robin
        .post(&format!("/api/invitations/{}/decline", invitation["id"]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(declined["status"], "declined");

    let (_, summary) = alex.get("/api/household").await;
    assert_eq!(summary["members"].as_array().unwrap().len(), 1);

    // A declined invitation does not block a new one.
    let (status, _) = alex
        .post_json("/api/invitations", json!({ "email": "robin@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_setup_requires_no_household() {
    let (alex, _) = couple().await;
    let (status, _) = alex
        .post_json("/api/household/setup", json!({ "role": "bride" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
