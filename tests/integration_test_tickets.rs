mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

struct Team {
    admin_token: String,
    support_token: String,
    client_token: String,
    support_id: String,
    service_id: String,
}

async fn setup_team(app: &TestApp) -> Team {
    let admin_token = app.register_and_login("Admin", "admin@example.com", "password123", "admin").await;
    let support_token = app.register_and_login("Sam Support", "support@example.com", "password123", "support").await;
    let client_token = app.register_and_login("Cleo Client", "client@example.com", "password123", "client").await;

    let res = app.api("POST", "/api/services", Some(&admin_token), Some(json!({
        "name": "IT Support",
        "description": "Hardware and software issues"
    }))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let service_id = parse_body(res).await["data"]["id"].as_str().unwrap().to_string();

    // Resolve the support user's id through the admin listing
    let res = app.api("GET", "/api/users", Some(&admin_token), None).await;
    let users = parse_body(res).await;
    let support_id = users.as_array().unwrap().iter()
        .find(|u| u["email"] == json!("support@example.com"))
        .unwrap()["id"].as_str().unwrap().to_string();

    Team { admin_token, support_token, client_token, support_id, service_id }
}

async fn create_ticket(app: &TestApp, team: &Team) -> String {
    let res = app.api("POST", "/api/tickets", Some(&team.client_token), Some(json!({
        "title": "Laptop will not boot",
        "description": "Screen stays black after pressing power.",
        "serviceId": team.service_id
    }))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_ticket_creation_defaults() {
    let app = TestApp::new().await;
    let team = setup_team(&app).await;

    let res = app.api("POST", "/api/tickets", Some(&team.client_token), Some(json!({
        "title": "Printer jam",
        "description": "Paper stuck in tray 2.",
        "serviceId": team.service_id
    }))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = parse_body(res).await;

    assert_eq!(body["data"]["status"], json!("open"));
    assert_eq!(body["data"]["priority"], json!("medium"));
    assert_eq!(body["data"]["client"]["name"], json!("Cleo Client"));
    assert_eq!(body["data"]["service"]["name"], json!("IT Support"));
    assert!(body["data"]["assignedTo"].is_null());
}

#[tokio::test]
async fn test_ticket_creation_requires_known_service() {
    let app = TestApp::new().await;
    let team = setup_team(&app).await;

    let res = app.api("POST", "/api/tickets", Some(&team.client_token), Some(json!({
        "title": "Broken keyboard",
        "description": "Keys missing.",
        "serviceId": "no-such-service"
    }))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ticket_creation_rejects_bad_priority() {
    let app = TestApp::new().await;
    let team = setup_team(&app).await;

    let res = app.api("POST", "/api/tickets", Some(&team.client_token), Some(json!({
        "title": "Mouse drift",
        "description": "Cursor moves on its own.",
        "serviceId": team.service_id,
        "priority": "apocalyptic"
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assignment_lifecycle() {
    let app = TestApp::new().await;
    let team = setup_team(&app).await;
    let ticket_id = create_ticket(&app, &team).await;

    let mails_before = app.mailer.sent().len();

    // Admin assigns the support user: status flips to in_progress
    let res = app.api("PATCH", &format!("/api/tickets/{}/assign", ticket_id), Some(&team.admin_token), Some(json!({
        "userId": team.support_id
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["status"], json!("in_progress"));
    assert_eq!(body["data"]["assignedTo"]["email"], json!("support@example.com"));
    assert_eq!(body["emailSent"], json!(true));

    // The new assignee got exactly one notification
    let sent = app.mailer.sent();
    assert_eq!(sent.len(), mails_before + 1);
    let mail = sent.last().unwrap();
    assert_eq!(mail.recipient, "support@example.com");
    assert!(mail.subject.contains("New Ticket Assigned"));

    // Re-assigning the same person sends no second email
    let res = app.api("PATCH", &format!("/api/tickets/{}/assign", ticket_id), Some(&team.admin_token), Some(json!({
        "userId": team.support_id
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(app.mailer.sent().len(), mails_before + 1);

    // Unassigning resets the status to open
    let res = app.api("PATCH", &format!("/api/tickets/{}/assign", ticket_id), Some(&team.admin_token), Some(json!({
        "userId": null
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["status"], json!("open"));
    assert!(body["data"]["assignedTo"].is_null());
    assert_eq!(body["emailSent"], json!(false));
}

#[tokio::test]
async fn test_assignment_authorization() {
    let app = TestApp::new().await;
    let team = setup_team(&app).await;
    let ticket_id = create_ticket(&app, &team).await;

    // Only admins may assign
    let res = app.api("PATCH", &format!("/api/tickets/{}/assign", ticket_id), Some(&team.support_token), Some(json!({
        "userId": team.support_id
    }))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.api("PATCH", &format!("/api/tickets/{}/assign", ticket_id), Some(&team.client_token), Some(json!({
        "userId": team.support_id
    }))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_only_support_staff_can_be_assigned() {
    let app = TestApp::new().await;
    let team = setup_team(&app).await;
    let ticket_id = create_ticket(&app, &team).await;

    let res = app.api("GET", "/api/users", Some(&team.admin_token), None).await;
    let users = parse_body(res).await;
    let client_id = users.as_array().unwrap().iter()
        .find(|u| u["email"] == json!("client@example.com"))
        .unwrap()["id"].as_str().unwrap().to_string();

    let res = app.api("PATCH", &format!("/api/tickets/{}/assign", ticket_id), Some(&team.admin_token), Some(json!({
        "userId": client_id
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(res).await;
    assert_eq!(body["error"], json!("Only support staff can be assigned tickets"));
}

#[tokio::test]
async fn test_update_ticket_validation_and_roles() {
    let app = TestApp::new().await;
    let team = setup_team(&app).await;
    let ticket_id = create_ticket(&app, &team).await;

    // Clients may not update tickets
    let res = app.api("PUT", &format!("/api/tickets/{}", ticket_id), Some(&team.client_token), Some(json!({
        "status": "resolved"
    }))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Values outside the enumerations are rejected
    let res = app.api("PUT", &format!("/api/tickets/{}", ticket_id), Some(&team.admin_token), Some(json!({
        "status": "abandoned"
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.api("PUT", &format!("/api/tickets/{}", ticket_id), Some(&team.admin_token), Some(json!({
        "priority": "urgent"
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Support staff can move a ticket through its lifecycle
    let res = app.api("PUT", &format!("/api/tickets/{}", ticket_id), Some(&team.support_token), Some(json!({
        "status": "waiting_on_client",
        "priority": "critical"
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["status"], json!("waiting_on_client"));
    assert_eq!(body["data"]["priority"], json!("critical"));

    // Assignment through the generic update also insists on support role
    let res = app.api("GET", "/api/users", Some(&team.admin_token), None).await;
    let users = parse_body(res).await;
    let client_id = users.as_array().unwrap().iter()
        .find(|u| u["email"] == json!("client@example.com"))
        .unwrap()["id"].as_str().unwrap().to_string();

    let res = app.api("PUT", &format!("/api/tickets/{}", ticket_id), Some(&team.admin_token), Some(json!({
        "assignedTo": client_id
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.api("PUT", &format!("/api/tickets/{}", ticket_id), Some(&team.admin_token), Some(json!({
        "assignedTo": team.support_id
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"]["assignedTo"]["email"], json!("support@example.com"));

    // Explicit null unassigns
    let res = app.api("PUT", &format!("/api/tickets/{}", ticket_id), Some(&team.admin_token), Some(json!({
        "assignedTo": null
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert!(body["data"]["assignedTo"].is_null());
}

#[tokio::test]
async fn test_staff_listing() {
    let app = TestApp::new().await;
    let team = setup_team(&app).await;
    let ticket_id = create_ticket(&app, &team).await;

    app.api("PATCH", &format!("/api/tickets/{}/assign", ticket_id), Some(&team.admin_token), Some(json!({
        "userId": team.support_id
    }))).await;

    let res = app.api("GET", "/api/tickets/staff", Some(&team.support_token), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], json!(ticket_id));

    // The staff view is support-only
    let res = app.api("GET", "/api/tickets/staff", Some(&team.client_token), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ticket_listing_and_lookup() {
    let app = TestApp::new().await;
    let team = setup_team(&app).await;
    let ticket_id = create_ticket(&app, &team).await;

    let res = app.api("GET", "/api/tickets", Some(&team.client_token), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let res = app.api("GET", &format!("/api/tickets/{}", ticket_id), Some(&team.client_token), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.api("GET", "/api/tickets/no-such-ticket", Some(&team.client_token), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // No bearer token, no tickets
    let res = app.api("GET", "/api/tickets", None, None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
