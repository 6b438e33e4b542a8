mod common;

use axum::http::{Method, StatusCode};
use common::{OdooStub, UNREACHABLE_ODOO, get, post_json, send, setup_app, setup_with_stub, spawn_odoo};
use serde_json::{Value, json};

fn order() -> Value {
    json!({
        "customer": { "email": "buyer@example.com", "firstName": "Ada", "lastName": "Byrne" },
        "items": [{ "courseId": 1, "name": "IOSH Managing Safely", "price": 595.0 }]
    })
}

fn contact() -> Value {
    json!({
        "firstName": "Liam",
        "lastName": "O'Neill",
        "email": "liam@example.com",
        "subject": "Group booking",
        "message": "We need <b>12</b> places on fire marshal training."
    })
}

fn consultation() -> Value {
    json!({
        "firstName": "Priya",
        "lastName": "Shah",
        "email": "priya@example.com",
        "phone": "07700 900123",
        "serviceInterested": ["Fire Risk Assessment"],
        "preferredContact": "email"
    })
}

#[tokio::test]
async fn test_order_validation() {
    let (_, app) = setup_app(UNREACHABLE_ODOO);

    let (status, body) = send(&app, post_json("/api/orders", None, json!({ "items": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Customer email is required");

    let (status, body) = send(
        &app,
        post_json("/api/orders", None, json!({ "customer": { "email": "a@b.com" }, "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No items in order");
}

#[tokio::test]
async fn test_order_placed() {
    let stub = OdooStub::new().rest(
        Method::POST,
        "/api/orders",
        StatusCode::OK,
        json!({ "success": true, "data": { "orderId": 99, "orderReference": "S00099" } }),
    );
    let (_, app) = setup_with_stub(stub).await;

    let (status, body) = send(&app, post_json("/api/orders", None, order())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["orderReference"], "S00099");
}

#[tokio::test]
async fn test_order_decline_mirrors_erp() {
    let stub = OdooStub::new().rest(
        Method::POST,
        "/api/orders",
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "success": false, "error": "Course 1 is not for sale" }),
    );
    let (_, app) = setup_with_stub(stub).await;

    let (status, body) = send(&app, post_json("/api/orders", None, order())).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Course 1 is not for sale");
}

#[tokio::test]
async fn test_order_with_erp_down() {
    let (_, app) = setup_app(UNREACHABLE_ODOO);

    let (status, body) = send(&app, post_json("/api/orders", None, order())).await;

    assert!(status.is_server_error());
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_orders_by_email() {
    let stub = OdooStub::new().rest(
        Method::GET,
        "/api/orders/by-email/buyer%40example.com",
        StatusCode::OK,
        json!({ "success": true, "data": [{ "orderReference": "S00099" }] }),
    );
    let (_, app) = setup_with_stub(stub).await;

    let (status, body) = send(&app, get("/api/orders", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email is required");

    let (status, body) = send(&app, get("/api/orders?email=buyer%40example.com", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["orderReference"], "S00099");
}

#[tokio::test]
async fn test_contact_files_lead_and_note() {
    let stub = OdooStub::new()
        .orm("crm.lead", "create", json!(31))
        .orm("mail.message", "create", json!(310));
    let url = spawn_odoo(stub.clone()).await;
    let (_, app) = setup_app(&url);

    let (status, body) = send(&app, post_json("/api/contact", None, contact())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Thank you for contacting us. We will get back to you shortly.");
    assert_eq!(body["data"]["id"], 31);

    let leads = stub.calls_to("crm.lead", "create");
    assert_eq!(leads[0].args[0]["name"], "Group booking");
    assert_eq!(leads[0].args[0]["email_from"], "liam@example.com");
    assert_eq!(leads[0].args[0]["phone"], false);

    let notes = stub.calls_to("mail.message", "create");
    assert_eq!(notes[0].args[0]["res_id"], 31);
    let note = notes[0].args[0]["body"].as_str().unwrap();
    assert!(note.contains("&lt;b&gt;12&lt;/b&gt;"));
    assert!(!note.contains("<b>12</b>"));
}

#[tokio::test]
async fn test_contact_rejects_short_message() {
    let (_, app) = setup_app(UNREACHABLE_ODOO);
    let mut dto = contact();
    dto["message"] = json!("Hi");

    let (status, body) = send(&app, post_json("/api/contact", None, dto)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid form data");
}

#[tokio::test]
async fn test_consultation_accepted_when_erp_down() {
    let (_, app) = setup_app(UNREACHABLE_ODOO);

    let (status, body) = send(&app, post_json("/api/consultation", None, consultation())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], 0);
}

#[tokio::test]
async fn test_consultation_forwarded() {
    let stub = OdooStub::new().rest(
        Method::POST,
        "/api/consultation",
        StatusCode::OK,
        json!({ "success": true, "data": { "id": 14 } }),
    );
    let (_, app) = setup_with_stub(stub).await;

    let (status, body) = send(&app, post_json("/api/consultation", None, consultation())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], 14);
}

#[tokio::test]
async fn test_consultation_requires_a_service() {
    let (_, app) = setup_app(UNREACHABLE_ODOO);
    let mut dto = consultation();
    dto["serviceInterested"] = json!([]);

    let (status, body) = send(&app, post_json("/api/consultation", None, dto)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid form data");
}
