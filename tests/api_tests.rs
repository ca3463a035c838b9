//! API integration tests
//!
//! These run against a live server: start one with `cargo run`, then
//! `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:9090/api/v1";
const CALLER_HEADER: &str = "X-Sharer-User-Id";

/// Create a user with a unique email, returning its id
async fn create_user(client: &Client, name: &str) -> i64 {
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": name,
            "email": format!("{}-{}@lendhub.test", name, nonce)
        }))
        .send()
        .await
        .expect("Failed to create user");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse user response");
    body["id"].as_i64().expect("No user ID")
}

/// Create an available item owned by `owner_id`, returning its id
async fn create_item(client: &Client, owner_id: i64, name: &str) -> i64 {
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header(CALLER_HEADER, owner_id)
        .json(&json!({
            "name": name,
            "description": format!("{} for lending", name),
            "available": true
        }))
        .send()
        .await
        .expect("Failed to create item");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse item response");
    body["id"].as_i64().expect("No item ID")
}

/// Create a booking of `item_id` by `booker_id` over the given period
async fn create_booking(
    client: &Client,
    booker_id: i64,
    item_id: i64,
    start: chrono::DateTime<Utc>,
    end: chrono::DateTime<Utc>,
) -> Value {
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header(CALLER_HEADER, booker_id)
        .json(&json!({
            "item_id": item_id,
            "start": start.to_rfc3339(),
            "end": end.to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to create booking");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse booking response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_missing_caller_header() {
    let client = Client::new();

    let response = client
        .get(format!("{}/items", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_conflict() {
    let client = Client::new();
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let email = format!("dup-{}@lendhub.test", nonce);

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({"name": "First", "email": email}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({"name": "Second", "email": email}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_create_booking_starts_waiting() {
    let client = Client::new();
    let owner = create_user(&client, "owner-a").await;
    let booker = create_user(&client, "booker-a").await;
    let item = create_item(&client, owner, "ladder").await;

    let now = Utc::now();
    let booking = create_booking(&client, booker, item, now + Duration::days(1), now + Duration::days(2)).await;

    assert_eq!(booking["status"], "WAITING");
    assert_eq!(booking["booker"]["id"].as_i64(), Some(booker));
    assert_eq!(booking["item"]["id"].as_i64(), Some(item));
}

#[tokio::test]
#[ignore]
async fn test_empty_period_rejected() {
    let client = Client::new();
    let owner = create_user(&client, "owner-b").await;
    let booker = create_user(&client, "booker-b").await;
    let item = create_item(&client, owner, "tent").await;

    let start = Utc::now() + Duration::days(1);
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header(CALLER_HEADER, booker)
        .json(&json!({
            "item_id": item,
            "start": start.to_rfc3339(),
            "end": start.to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_owner_cannot_book_own_item() {
    let client = Client::new();
    let owner = create_user(&client, "owner-c").await;
    let item = create_item(&client, owner, "projector").await;

    let now = Utc::now();
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header(CALLER_HEADER, owner)
        .json(&json!({
            "item_id": item,
            "start": (now + Duration::days(1)).to_rfc3339(),
            "end": (now + Duration::days(2)).to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_approval_is_terminal() {
    let client = Client::new();
    let owner = create_user(&client, "owner-d").await;
    let booker = create_user(&client, "booker-d").await;
    let item = create_item(&client, owner, "bike").await;

    let now = Utc::now();
    let booking = create_booking(&client, booker, item, now + Duration::days(1), now + Duration::days(2)).await;
    let booking_id = booking["id"].as_i64().unwrap();

    // Owner approves
    let response = client
        .patch(format!("{}/bookings/{}?approved=true", BASE_URL, booking_id))
        .header(CALLER_HEADER, owner)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "APPROVED");

    // Second review of an approved booking fails
    let response = client
        .patch(format!("{}/bookings/{}?approved=false", BASE_URL, booking_id))
        .header(CALLER_HEADER, owner)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_rejected_booking_can_be_rejected_again() {
    let client = Client::new();
    let owner = create_user(&client, "owner-e").await;
    let booker = create_user(&client, "booker-e").await;
    let item = create_item(&client, owner, "kayak").await;

    let now = Utc::now();
    let booking = create_booking(&client, booker, item, now + Duration::days(1), now + Duration::days(2)).await;
    let booking_id = booking["id"].as_i64().unwrap();

    for _ in 0..2 {
        let response = client
            .patch(format!("{}/bookings/{}?approved=false", BASE_URL, booking_id))
            .header(CALLER_HEADER, owner)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], "REJECTED");
    }
}

#[tokio::test]
#[ignore]
async fn test_booking_hidden_from_third_parties() {
    let client = Client::new();
    let owner = create_user(&client, "owner-f").await;
    let booker = create_user(&client, "booker-f").await;
    let outsider = create_user(&client, "outsider-f").await;
    let item = create_item(&client, owner, "drone").await;

    let now = Utc::now();
    let booking = create_booking(&client, booker, item, now + Duration::days(1), now + Duration::days(2)).await;
    let booking_id = booking["id"].as_i64().unwrap();

    // Booker and owner see it
    for caller in [booker, owner] {
        let response = client
            .get(format!("{}/bookings/{}", BASE_URL, booking_id))
            .header(CALLER_HEADER, caller)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
    }

    // Anybody else does not
    let response = client
        .get(format!("{}/bookings/{}", BASE_URL, booking_id))
        .header(CALLER_HEADER, outsider)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_unknown_state_filter() {
    let client = Client::new();
    let caller = create_user(&client, "lister-a").await;

    let response = client
        .get(format!("{}/bookings?state=UNIC&from=0&size=5", BASE_URL))
        .header(CALLER_HEADER, caller)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Unknown state: UNIC");
}

#[tokio::test]
#[ignore]
async fn test_state_filter_is_case_insensitive() {
    let client = Client::new();
    let caller = create_user(&client, "lister-b").await;

    for state in ["all", "All", "ALL", "past", "FuTuRe"] {
        let response = client
            .get(format!("{}/bookings?state={}", BASE_URL, state))
            .header(CALLER_HEADER, caller)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 200);
    }
}

#[tokio::test]
#[ignore]
async fn test_single_row_pages_reproduce_full_ordering() {
    let client = Client::new();
    let owner = create_user(&client, "owner-g").await;
    let booker = create_user(&client, "booker-g").await;
    let item = create_item(&client, owner, "trailer").await;

    let now = Utc::now();
    for offset in 1..=3 {
        create_booking(
            &client,
            booker,
            item,
            now + Duration::days(offset),
            now + Duration::days(offset + 1),
        )
        .await;
    }

    let full: Value = client
        .get(format!("{}/bookings?state=ALL&from=0&size=50", BASE_URL))
        .header(CALLER_HEADER, booker)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .unwrap();
    let full = full.as_array().unwrap();
    assert_eq!(full.len(), 3);

    for (index, expected) in full.iter().enumerate() {
        let page: Value = client
            .get(format!("{}/bookings?state=ALL&from={}&size=1", BASE_URL, index))
            .header(CALLER_HEADER, booker)
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .unwrap();
        let page = page.as_array().unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["id"], expected["id"]);
    }
}

#[tokio::test]
#[ignore]
async fn test_owner_sees_bookings_on_own_items() {
    let client = Client::new();
    let owner = create_user(&client, "owner-h").await;
    let booker = create_user(&client, "booker-h").await;
    let item = create_item(&client, owner, "canoe").await;

    let now = Utc::now();
    let booking = create_booking(&client, booker, item, now + Duration::days(1), now + Duration::days(2)).await;

    let response = client
        .get(format!("{}/bookings/owner?state=WAITING", BASE_URL))
        .header(CALLER_HEADER, owner)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_i64().unwrap())
        .collect();
    assert!(ids.contains(&booking["id"].as_i64().unwrap()));
}

#[tokio::test]
#[ignore]
async fn test_comment_requires_completed_booking() {
    let client = Client::new();
    let owner = create_user(&client, "owner-i").await;
    let renter = create_user(&client, "renter-i").await;
    let rented = create_item(&client, owner, "mixer").await;
    let untouched = create_item(&client, owner, "sander").await;

    // A booking that already started, approved by the owner
    let now = Utc::now();
    let booking = create_booking(&client, renter, rented, now - Duration::days(2), now - Duration::days(1)).await;
    let booking_id = booking["id"].as_i64().unwrap();

    let response = client
        .patch(format!("{}/bookings/{}?approved=true", BASE_URL, booking_id))
        .header(CALLER_HEADER, owner)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    // Comment on the rented item succeeds
    let response = client
        .post(format!("{}/items/{}/comment", BASE_URL, rented))
        .header(CALLER_HEADER, renter)
        .json(&json!({"text": "worked great"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["text"], "worked great");
    assert_eq!(body["author_name"], "renter-i");

    // Comment on an item nobody ever booked fails
    let response = client
        .post(format!("{}/items/{}/comment", BASE_URL, untouched))
        .header(CALLER_HEADER, renter)
        .json(&json!({"text": "no stay yet"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_comment_blocked_without_any_booking() {
    let client = Client::new();
    let owner = create_user(&client, "owner-j").await;
    let stranger = create_user(&client, "stranger-j").await;
    let item = create_item(&client, owner, "heater").await;

    let response = client
        .post(format!("{}/items/{}/comment", BASE_URL, item))
        .header(CALLER_HEADER, stranger)
        .json(&json!({"text": "never used it"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "NotBooked");
}

#[tokio::test]
#[ignore]
async fn test_wishlist_request_round_trip() {
    let client = Client::new();
    let requester = create_user(&client, "wisher-a").await;
    let owner = create_user(&client, "owner-k").await;

    let response = client
        .post(format!("{}/requests", BASE_URL))
        .header(CALLER_HEADER, requester)
        .json(&json!({"description": "looking for a pressure washer"}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let request: Value = response.json().await.unwrap();
    let request_id = request["id"].as_i64().unwrap();

    // Owner lists an item in answer to the request
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header(CALLER_HEADER, owner)
        .json(&json!({
            "name": "pressure washer",
            "description": "2000 psi",
            "available": true,
            "request_id": request_id
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    // The requester sees the answering item
    let response = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .header(CALLER_HEADER, requester)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "pressure washer");
}

#[tokio::test]
#[ignore]
async fn test_search_ignores_blank_text() {
    let client = Client::new();

    let response = client
        .get(format!("{}/items/search?text=", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 0);
}
