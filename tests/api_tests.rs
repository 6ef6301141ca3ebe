use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Default admin seeded by migration (must match m20240101_initial.rs)
const ADMIN_EMAIL: &str = "admin@bookcafe.local";
const ADMIN_PASSWORD: &str = "changeme123";

async fn spawn_app() -> Router {
    spawn_app_with_state().await.0
}

async fn spawn_app_with_state() -> (Router, std::sync::Arc<bookcafe::api::AppState>) {
    let mut config = bookcafe::Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = bookcafe::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    (bookcafe::api::router(state.clone()), state)
}

/// Pull the pending verification token straight from the database, standing
/// in for the link a real user would follow from the mail.
async fn verification_token(state: &bookcafe::api::AppState, email: &str) -> String {
    use bookcafe::entities::{prelude::Users, users};
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    Users::find()
        .filter(users::Column::Email.eq(email))
        .one(&state.store.conn)
        .await
        .expect("query user")
        .expect("user exists")
        .verification_token
        .expect("token pending")
}

async fn register_and_verify(
    app: &Router,
    state: &bookcafe::api::AppState,
    name: &str,
    email: &str,
    password: &str,
) {
    let (status, body, _) = send(
        app,
        "POST",
        "/api/auth/register",
        Some(json!({
            "name": name,
            "email": email,
            "phone": "0701234567",
            "password": password,
            "confirm_password": password,
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");

    let token = verification_token(state, email).await;
    let (status, body, _) = send(
        app,
        "GET",
        &format!("/api/auth/verify?token={token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verify failed: {body}");
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let session_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(ToString::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json, session_cookie)
}

async fn login(app: &Router, email: &str, password: &str) -> String {
    let (status, body, cookie) = send(
        app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": email, "password": password })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    cookie.expect("login should set a session cookie")
}

async fn create_event(
    app: &Router,
    admin_cookie: &str,
    title: &str,
    max_participants: i32,
    status: &str,
) -> i32 {
    let (http_status, body, _) = send(
        app,
        "POST",
        "/api/admin/events",
        Some(json!({
            "title": title,
            "description": "An evening with the author",
            "event_date": "2026-10-01",
            "event_time": "18:00",
            "location": "Main hall",
            "price": 50.0,
            "max_participants": max_participants,
            "status": status,
        })),
        Some(admin_cookie),
    )
    .await;

    assert_eq!(http_status, StatusCode::OK, "create event failed: {body}");
    i32::try_from(body["data"]["id"].as_i64().unwrap()).unwrap()
}

fn registration_body(event_id: i32, email: &str, guests: i32) -> Value {
    json!({
        "event_id": event_id,
        "name": "Guest Reader",
        "email": email,
        "phone": "+46 70 123 45 67",
        "guests": guests,
    })
}

async fn available_spots(app: &Router, event_id: i32) -> i64 {
    let (status, body, _) = send(app, "GET", &format!("/api/events/{event_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["available_spots"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, body, _) = send(&app, "GET", "/api/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    // Plain reads still carry a message string
    assert!(body["message"].is_string());
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
}

#[tokio::test]
async fn test_auth_flow() {
    let (app, state) = spawn_app_with_state().await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({
            "name": "Alex Reader",
            "email": "alex@example.com",
            "phone": "0701234567",
            "password": "secret-pass-1",
            "confirm_password": "secret-pass-1",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);

    // Login is gated until the mailed token is redeemed
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "alex@example.com", "password": "secret-pass-1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    // A made-up token does not verify anything
    let (status, _, _) = send(
        &app,
        "GET",
        "/api/auth/verify?token=not-a-real-token",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let token = verification_token(&state, "alex@example.com").await;
    let (status, body, _) = send(
        &app,
        "GET",
        &format!("/api/auth/verify?token={token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);

    // The token is one-shot
    let (status, _, _) = send(
        &app,
        "GET",
        &format!("/api/auth/verify?token={token}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let cookie = login(&app, "alex@example.com", "secret-pass-1").await;

    let (status, body, _) = send(&app, "GET", "/api/auth/me", None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "alex@example.com");
    assert_eq!(body["data"]["role"], "user");

    let (status, _, _) = send(&app, "POST", "/api/auth/logout", None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&app, "GET", "/api/auth/me", None, Some(&cookie)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": ADMIN_EMAIL, "password": "wrong-password" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn test_register_validation() {
    let app = spawn_app().await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({
            "name": "Al",
            "email": "al@example.com",
            "phone": "0701234567",
            "password": "secret-pass-1",
            "confirm_password": "secret-pass-1",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({
            "name": "Alex Reader",
            "email": "not-an-email",
            "phone": "0701234567",
            "password": "secret-pass-1",
            "confirm_password": "secret-pass-1",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        Some(json!({
            "name": "Alex Reader",
            "email": "alex2@example.com",
            "phone": "0701234567",
            "password": "secret-pass-1",
            "confirm_password": "different",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_listing_hides_inactive() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    create_event(&app, &admin, "Poetry Night", 20, "active").await;
    create_event(&app, &admin, "Staff Meeting", 10, "inactive").await;

    let (status, body, _) = send(&app, "GET", "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Poetry Night");

    // Admin view includes both
    let (status, body, _) = send(&app, "GET", "/api/admin/events", None, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_registration_flow() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let event_id = create_event(&app, &admin, "Book Club", 10, "active").await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "guest@example.com", 3)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert!(body["data"]["registration_id"].as_i64().unwrap() > 0);

    assert_eq!(available_spots(&app, event_id).await, 7);

    // Same email again is a business rejection, not an HTTP error
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "guest@example.com", 1)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "already_registered");

    assert_eq!(available_spots(&app, event_id).await, 7);
}

#[tokio::test]
async fn test_registration_guest_bounds() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let event_id = create_event(&app, &admin, "Wine & Words", 10, "active").await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "greedy@example.com", 6)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "greedy@example.com", 0)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(available_spots(&app, event_id).await, 10);
}

#[tokio::test]
async fn test_event_full_rejection() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let event_id = create_event(&app, &admin, "Tiny Reading", 2, "active").await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "first@example.com", 2)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "second@example.com", 1)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "event_full");
}

#[tokio::test]
async fn test_last_seat_fills_event_exactly() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let event_id = create_event(&app, &admin, "Packed House", 10, "active").await;

    // 5 + 4 = 9 of 10 seats claimed
    send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "five@example.com", 5)),
        None,
    )
    .await;
    send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "four@example.com", 4)),
        None,
    )
    .await;
    assert_eq!(available_spots(&app, event_id).await, 1);

    // The last seat goes to one more single-guest registration
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "last@example.com", 1)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(available_spots(&app, event_id).await, 0);

    // And the next one is turned away
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "late@example.com", 1)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "event_full");
}

#[tokio::test]
async fn test_registration_inactive_event() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let event_id = create_event(&app, &admin, "Private Event", 10, "inactive").await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "guest@example.com", 1)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "event_inactive");
}

#[tokio::test]
async fn test_cancellation_restores_seats() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let event_id = create_event(&app, &admin, "Author Q&A", 10, "active").await;

    let (_, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "guest@example.com", 4)),
        None,
    )
    .await;
    let registration_id = body["data"]["registration_id"].as_i64().unwrap();
    assert_eq!(available_spots(&app, event_id).await, 6);

    // Wrong guest email cannot cancel
    let (status, _, _) = send(
        &app,
        "POST",
        &format!("/api/events/registrations/{registration_id}/cancel"),
        Some(json!({ "email": "intruder@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // No session and no email gives 401
    let (status, _, _) = send(
        &app,
        "POST",
        &format!("/api/events/registrations/{registration_id}/cancel"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Owning email may cancel
    let (status, body, _) = send(
        &app,
        "POST",
        &format!("/api/events/registrations/{registration_id}/cancel"),
        Some(json!({ "email": "guest@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(available_spots(&app, event_id).await, 10);

    // Cancelling twice is a business rejection
    let (status, body, _) = send(
        &app,
        "POST",
        &format!("/api/events/registrations/{registration_id}/cancel"),
        Some(json!({ "email": "guest@example.com" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "not_confirmed");

    // Re-registering after cancellation is allowed
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "guest@example.com", 1)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true, "{body}");
}

#[tokio::test]
async fn test_session_identity_wins_over_body() {
    let (app, state) = spawn_app_with_state().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let event_id = create_event(&app, &admin, "Members Evening", 10, "active").await;

    register_and_verify(&app, &state, "Member One", "member@example.com", "secret-pass-1").await;
    let member = login(&app, "member@example.com", "secret-pass-1").await;

    // Body claims another email; the session account is registered anyway.
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "spoofed@example.com", 1)),
        Some(&member),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body, _) = send(
        &app,
        "GET",
        "/api/events/registrations",
        None,
        Some(&member),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let registrations = body["data"].as_array().unwrap();
    assert_eq!(registrations.len(), 1);
    assert_eq!(registrations[0]["email"], "member@example.com");
    assert_eq!(registrations[0]["event_title"], "Members Evening");
}

#[tokio::test]
async fn test_admin_routes_require_admin_session() {
    let (app, state) = spawn_app_with_state().await;

    let (status, _, _) = send(&app, "GET", "/api/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    register_and_verify(&app, &state, "Plain User", "plain@example.com", "secret-pass-1").await;
    let user = login(&app, "plain@example.com", "secret-pass-1").await;

    let (status, _, _) = send(&app, "GET", "/api/admin/users", None, Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body, _) = send(&app, "GET", "/api/admin/users", None, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_last_admin_guard() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (_, body, _) = send(&app, "GET", "/api/auth/me", None, Some(&admin)).await;
    let admin_id = body["data"]["id"].as_i64().unwrap();

    // Demoting the only admin is refused
    let (status, body, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/users/{admin_id}"),
        Some(json!({ "role": "user" })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "last_admin");

    // So is bulk-deleting a set containing every admin
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/admin/users/bulk",
        Some(json!({ "action": "delete", "user_ids": [admin_id] })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "last_admin");

    // And self-deletion of the last admin account
    let (status, body, _) = send(
        &app,
        "DELETE",
        "/api/auth/account",
        Some(json!({ "password": ADMIN_PASSWORD })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "last_admin");

    // With a second admin present, demotion works
    let (status, body, _) = send(
        &app,
        "POST",
        "/api/admin/users",
        Some(json!({
            "name": "Second Admin",
            "email": "admin2@example.com",
            "phone": "0701234567",
            "password": "secret-pass-1",
            "role": "admin",
        })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/users/{admin_id}"),
        Some(json!({ "role": "user" })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn test_capacity_shrink_below_reserved_is_refused() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let event_id = create_event(&app, &admin, "Popular Talk", 5, "active").await;

    send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "guest@example.com", 3)),
        None,
    )
    .await;

    let update = |max: i32| {
        json!({
            "title": "Popular Talk",
            "event_date": "2026-10-01",
            "event_time": "18:00",
            "location": "Main hall",
            "price": 50.0,
            "max_participants": max,
            "status": "active",
        })
    };

    // 3 seats are claimed; capacity 2 would go negative
    let (status, body, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/events/{event_id}"),
        Some(update(2)),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");

    // Growing capacity shifts the free-seat pool
    let (status, body, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/events/{event_id}"),
        Some(update(8)),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(available_spots(&app, event_id).await, 5);
}

#[tokio::test]
async fn test_event_roster() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let event_id = create_event(&app, &admin, "Roster Event", 10, "active").await;

    send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "a@example.com", 1)),
        None,
    )
    .await;
    send(
        &app,
        "POST",
        "/api/events/register",
        Some(registration_body(event_id, "b@example.com", 2)),
        None,
    )
    .await;

    let (status, body, _) = send(
        &app,
        "GET",
        &format!("/api/admin/events/{event_id}/registrations"),
        None,
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_contact_flow() {
    let app = spawn_app().await;

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/contact",
        Some(json!({
            "name": "Curious Visitor",
            "email": "visitor@example.com",
            "subject": "Opening hours",
            "message": "Are you open on Sundays?",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);

    // Empty message is refused
    let (status, _, _) = send(
        &app,
        "POST",
        "/api/contact",
        Some(json!({
            "name": "Curious Visitor",
            "email": "visitor@example.com",
            "message": "   ",
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, body, _) = send(&app, "GET", "/api/admin/contact", None, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    let message_id = messages[0]["id"].as_i64().unwrap();

    let (status, _, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/contact/{message_id}/read"),
        None,
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = send(
        &app,
        "GET",
        "/api/admin/contact?unread_only=true",
        None,
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_books_catalog() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/admin/books",
        Some(json!({
            "title": "The Long Shelf",
            "author": "P. Binder",
            "genre": "Fiction",
            "price": 24.0,
            "available": true,
        })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = send(
        &app,
        "POST",
        "/api/admin/books",
        Some(json!({
            "title": "Out of Print",
            "author": "P. Binder",
            "available": false,
        })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // Public catalog lists only available titles
    let (status, body, _) = send(&app, "GET", "/api/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let books = body["data"].as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "The Long Shelf");
}

#[tokio::test]
async fn test_profile_and_password_change() {
    let (app, state) = spawn_app_with_state().await;

    register_and_verify(&app, &state, "Rename Me", "rename@example.com", "secret-pass-1").await;
    let cookie = login(&app, "rename@example.com", "secret-pass-1").await;

    let (status, _, _) = send(
        &app,
        "PUT",
        "/api/auth/profile",
        Some(json!({ "name": "Renamed User", "phone": "0709999999" })),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body, _) = send(&app, "GET", "/api/auth/me", None, Some(&cookie)).await;
    assert_eq!(body["data"]["name"], "Renamed User");

    // Wrong current password is refused
    let (status, _, _) = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(json!({ "current_password": "wrong", "new_password": "another-pass-2" })),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(
        &app,
        "PUT",
        "/api/auth/password",
        Some(json!({ "current_password": "secret-pass-1", "new_password": "another-pass-2" })),
        Some(&cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    login(&app, "rename@example.com", "another-pass-2").await;
}

#[tokio::test]
async fn test_disabled_account_cannot_login() {
    let app = spawn_app().await;
    let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let (_, body, _) = send(
        &app,
        "POST",
        "/api/admin/users",
        Some(json!({
            "name": "Soon Disabled",
            "email": "disabled@example.com",
            "phone": "0701234567",
            "password": "secret-pass-1",
        })),
        Some(&admin),
    )
    .await;
    let user_id = body["data"]["id"].as_i64().unwrap();

    let (status, _, _) = send(
        &app,
        "PUT",
        &format!("/api/admin/users/{user_id}"),
        Some(json!({ "status": "disabled" })),
        Some(&admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "disabled@example.com", "password": "secret-pass-1" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
