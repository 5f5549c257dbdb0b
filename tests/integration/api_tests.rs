//! API integration tests
//!
//! Require a running server whose bootstrap administrator matches
//! `EQUIPTRACK_TEST_ADMIN` / `EQUIPTRACK_TEST_PASSWORD`.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn admin_credentials() -> (String, String) {
    (
        std::env::var("EQUIPTRACK_TEST_ADMIN").unwrap_or_else(|_| "admin".to_string()),
        std::env::var("EQUIPTRACK_TEST_PASSWORD").unwrap_or_else(|_| "admin-password".to_string()),
    )
}

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to get an administrator token
async fn admin_token(client: &Client) -> String {
    let (username, password) = admin_credentials();
    login(client, &username, &password).await
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
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
async fn test_login() {
    let client = Client::new();
    let (username, password) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["dashboard"]["dashboard"], "/dashboards/admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let (username, _) = admin_credentials();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_signup_gets_default_dashboard() {
    let client = Client::new();
    let username = unique("tech");

    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "username": username,
            "first_name": "Test",
            "last_name": "Technician",
            "email": format!("{}@example.com", username),
            "password": "s3cure-pass",
            "password_confirm": "s3cure-pass"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let token = login(&client, &username, "s3cure-pass").await;

    let route: Value = client
        .get(format!("{}/dashboard", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(route["dashboard"], "/dashboards/default");

    // no role yet
    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // same username again
    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "username": username.to_uppercase(),
            "first_name": "Test",
            "last_name": "Technician",
            "email": format!("{}@example.com", username),
            "password": "s3cure-pass",
            "password_confirm": "s3cure-pass"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_equipment_lifecycle() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let machine_id = unique("it-press");

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "machine_id": machine_id,
            "machine_name": "Integration press",
            "machine_type": "PRODUCTION",
            "machine_location": "Line 9",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let created: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(created["machine_id"], machine_id.to_uppercase());
    assert_eq!(created["calibration_interval_days"], 365);
    assert_eq!(created["maintenance_interval_days"], 90);
    assert_eq!(created["status"], "no_data");

    let duplicate = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "machine_id": machine_id.to_lowercase(),
            "machine_name": "Again",
            "machine_location": "Line 9",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let completed: Value = client
        .post(format!("{}/equipment/{}/complete", BASE_URL, machine_id))
        .bearer_auth(&token)
        .json(&json!({ "procedure_type": "maintenance", "notes": "Belts replaced" }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(completed["next_due_date"].is_string());
    assert_eq!(completed["equipment"]["maintenance"]["status"], "compliant");

    let status: Value = client
        .get(format!("{}/status/equipment/{}", BASE_URL, machine_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(status["calibration"]["status"], "no_data");

    let response = client
        .delete(format!("{}/equipment/{}", BASE_URL, machine_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/equipment/{}", BASE_URL, machine_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_future_dates_rejected() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "machine_id": unique("future"),
            "machine_name": "Time machine",
            "machine_location": "Lab",
            "last_calibration_date": "2999-01-01",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_dashboards_and_stats() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let admin: Value = client
        .get(format!("{}/dashboards/admin?status=overdue", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(admin["has_filters"], true);
    assert!(admin["overdue_maintenance"].as_array().unwrap().len() <= 3);

    let stats: Value = client
        .get(format!("{}/status/stats", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let pct = stats["compliance_percentage"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&pct));
}

#[tokio::test]
#[ignore]
async fn test_logout_revokes_token() {
    let client = Client::new();
    let token = admin_token(&client).await;

    let response = client
        .post(format!("{}/auth/logout", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
