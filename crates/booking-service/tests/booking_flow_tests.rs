//! End-to-end booking tests.
//!
//! Runs the real booking router against a migrated database, with the
//! building service stubbed by wiremock.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use hostel_test_utils::*;
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::time::Duration;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OCCUPANCY_PATH: &str = r"^/api/buildings/beds/[^/]+/occupancy$";

async fn inventory_responding(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(OCCUPANCY_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "success": status == 200,
            "message": "Bed occupancy updated successfully"
        })))
        .mount(&server)
        .await;
    server
}

async fn occupancy_calls(inventory: &MockServer) -> Vec<(String, Value)> {
    inventory
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|req| (req.url.path().to_string(), req.body_json::<Value>().unwrap()))
        .collect()
}

async fn active_bookings(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE status = 'active'")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn create(
    client: &reqwest::Client,
    server: &TestBookingServer,
    token: &str,
    body: &Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/bookings", server.url()))
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .unwrap()
}

async fn cancel(
    client: &reqwest::Client,
    server: &TestBookingServer,
    token: &str,
    id: &str,
) -> reqwest::Response {
    client
        .put(format!("{}/api/bookings/{id}/cancel", server.url()))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_create_booking_occupies_bed(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = inventory_responding(200).await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();

    let response = create(
        &client,
        &server,
        &student_token(STUDENT_A),
        &booking_body(STUDENT_A, BED_1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Booking created successfully");
    assert_eq!(body["booking"]["status"], "active");
    assert_eq!(body["booking"]["bed_id"], BED_1);
    assert_eq!(body["booking"]["building_name"], BUILDING_1_NAME);

    let calls = occupancy_calls(&inventory).await;
    assert_eq!(
        calls,
        vec![(
            format!("/api/buildings/beds/{BED_1}/occupancy"),
            json!({
                "is_occupied": true,
                "occupied_by": STUDENT_A,
                "occupied_by_name": format!("{STUDENT_A} name")
            })
        )]
    );
    assert_eq!(active_bookings(server.pool()).await, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_missing_fields_rejected(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = inventory_responding(200).await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();

    let response = create(
        &client,
        &server,
        &student_token(STUDENT_A),
        &json!({ "user_id": STUDENT_A }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "User ID and Bed ID are required");
    assert!(occupancy_calls(&inventory).await.is_empty());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_inventory_failure_rolls_back(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = inventory_responding(500).await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();

    let response = create(
        &client,
        &server,
        &student_token(STUDENT_A),
        &booking_body(STUDENT_A, BED_1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Failed to update bed occupancy");

    // Compensating delete removed the row entirely
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(server.pool())
        .await?;
    assert_eq!(rows, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_inventory_timeout_rolls_back(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(OCCUPANCY_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(TEST_INVENTORY_TIMEOUT_SECONDS + 3)),
        )
        .mount(&inventory)
        .await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();

    let response = create(
        &client,
        &server,
        &student_token(STUDENT_A),
        &booking_body(STUDENT_A, BED_1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(active_bookings(server.pool()).await, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_book_cancel_rebook_scenario(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = inventory_responding(200).await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();
    let token = student_token(STUDENT_A);

    // A books B1
    let response = create(&client, &server, &token, &booking_body(STUDENT_A, BED_1)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first: Value = response.json().await?;
    let first_id = first["booking"]["id"].as_str().unwrap().to_string();

    // A cannot also book B2
    let response = create(&client, &server, &token, &booking_body(STUDENT_A, BED_2)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await?;
    assert_eq!(
        body["error"],
        "You already have an active booking. Cancel it first to book a new bed."
    );

    // A cancels B1, which is released
    let response = cancel(&client, &server, &token, &first_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["message"], "Booking cancelled successfully");
    assert_eq!(body["booking"]["status"], "cancelled");

    let calls = occupancy_calls(&inventory).await;
    assert_eq!(
        calls.last().unwrap(),
        &(
            format!("/api/buildings/beds/{BED_1}/occupancy"),
            json!({"is_occupied": false, "occupied_by": null, "occupied_by_name": null})
        )
    );

    // A can now book B2
    let response = create(&client, &server, &token, &booking_body(STUDENT_A, BED_2)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // History is newest first
    let body: Value = client
        .get(format!("{}/api/bookings/users/{STUDENT_A}", server.url()))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    assert_eq!(bookings[0]["bed_id"], BED_2);
    assert_eq!(bookings[1]["status"], "cancelled");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_occupied_bed_conflicts(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = inventory_responding(200).await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();

    let response = create(
        &client,
        &server,
        &student_token(STUDENT_A),
        &booking_body(STUDENT_A, BED_1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = create(
        &client,
        &server,
        &student_token(STUDENT_B),
        &booking_body(STUDENT_B, BED_1),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "This bed is already occupied");
    assert_eq!(body["code"], "CONFLICT");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_double_cancel_conflicts(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = inventory_responding(200).await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();
    let token = student_token(STUDENT_A);

    let created: Value = create(&client, &server, &token, &booking_body(STUDENT_A, BED_1))
        .await
        .json()
        .await?;
    let id = created["booking"]["id"].as_str().unwrap();

    assert_eq!(cancel(&client, &server, &token, id).await.status(), StatusCode::OK);

    let response = cancel(&client, &server, &token, id).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Booking is already cancelled");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_cancel_survives_release_failure(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(OCCUPANCY_PATH))
        .and(wiremock::matchers::body_partial_json(json!({"is_occupied": true})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&inventory)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(OCCUPANCY_PATH))
        .and(wiremock::matchers::body_partial_json(json!({"is_occupied": false})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&inventory)
        .await;

    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();
    let token = student_token(STUDENT_A);

    let created: Value = create(&client, &server, &token, &booking_body(STUDENT_A, BED_1))
        .await
        .json()
        .await?;
    let id = created["booking"]["id"].as_str().unwrap();

    let response = cancel(&client, &server, &token, id).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(active_bookings(server.pool()).await, 0);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_concurrent_creates_on_same_bed(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = inventory_responding(200).await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();

    let students: Vec<String> = (0..8).map(|i| format!("student-{i}")).collect();
    let tokens: Vec<String> = students.iter().map(|s| student_token(s)).collect();
    let bodies: Vec<Value> = students.iter().map(|s| booking_body(s, BED_1)).collect();

    let responses = futures::future::join_all(
        tokens
            .iter()
            .zip(&bodies)
            .map(|(token, body)| create(&client, &server, token, body)),
    )
    .await;

    let created = responses
        .iter()
        .filter(|r| r.status() == StatusCode::CREATED)
        .count();
    let conflicts = responses
        .iter()
        .filter(|r| r.status() == StatusCode::CONFLICT)
        .count();

    assert_eq!(created, 1);
    assert_eq!(conflicts, students.len() - 1);
    assert_eq!(active_bookings(server.pool()).await, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_concurrent_creates_for_same_user(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = inventory_responding(200).await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();
    let token = student_token(STUDENT_A);
    let bodies = [
        booking_body(STUDENT_A, BED_1),
        booking_body(STUDENT_A, BED_2),
        booking_body(STUDENT_A, BED_3),
    ];

    let responses = futures::future::join_all(
        bodies
            .iter()
            .map(|body| create(&client, &server, &token, body)),
    )
    .await;

    let created = responses
        .iter()
        .filter(|r| r.status() == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);
    assert_eq!(active_bookings(server.pool()).await, 1);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations/booking")]
async fn test_oversized_field_is_bad_request(pool: PgPool) -> Result<(), anyhow::Error> {
    let inventory = inventory_responding(200).await;
    let server = TestBookingServer::spawn(pool, &inventory.uri()).await?;
    let client = reqwest::Client::new();

    let mut body = booking_body(STUDENT_A, BED_1);
    body["room_number"] = json!("9".repeat(51));

    let response = create(&client, &server, &student_token(STUDENT_A), &body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(occupancy_calls(&inventory).await.is_empty());
    assert_eq!(active_bookings(server.pool()).await, 0);

    Ok(())
}
