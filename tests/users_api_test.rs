//! Registration, login, profile and user administration

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::json;

use EventHub::models::Role;

#[tokio::test]
async fn test_register_and_login() {
    let ctx = TestContext::new().await;
    let email = test_email("Lindy");

    let registered = ctx
        .post(
            "/api/users",
            None,
            json!({ "name": "Lindy", "email": email.to_uppercase(), "password": TEST_PASSWORD, "role": "admin" }),
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);
    assert_eq!(registered.body["email"], email);
    assert_eq!(registered.body["role"], "user");
    assert!(registered.body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(registered.body.get("passwordHash").is_none());

    let duplicate = ctx
        .post(
            "/api/users",
            None,
            json!({ "name": "Again", "email": email, "password": TEST_PASSWORD }),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);

    let login = ctx
        .post("/api/users/login", None, json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.id(), registered.id());

    let token = login.body["token"].as_str().unwrap().to_string();
    let profile = ctx.get("/api/users/profile", Some(&token)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["name"], "Lindy");
    assert!(profile.body.get("passwordHash").is_none());
    assert_eq!(profile.body["changedHistory"][0]["changeType"], "create");

    let wrong = ctx
        .post("/api/users/login", None, json!({ "email": email, "password": "nope12345" }))
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_rules() {
    let ctx = TestContext::new().await;

    for body in [
        json!({ "name": "No email", "password": TEST_PASSWORD }),
        json!({ "name": "Bad email", "email": "not-an-email", "password": TEST_PASSWORD }),
        json!({ "name": "Weak", "email": test_email("weak"), "password": "letters" }),
        json!({ "name": "Short", "email": test_email("short"), "password": "a1" }),
    ] {
        let response = ctx.post("/api/users", None, body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", response.body);
        assert!(!response.message().is_empty());
    }

    let malformed = ctx
        .request(
            axum::http::Method::POST,
            "/api/users",
            None,
            Some(json!("just a string")),
        )
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_registers_with_role() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;

    let response = ctx
        .post(
            "/api/users",
            Some(&admin.token),
            json!({ "name": "Staff", "email": test_email("staff"), "password": TEST_PASSWORD, "role": "operator" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["role"], "operator");
}

#[tokio::test]
async fn test_tokens_are_checked() {
    let ctx = TestContext::new().await;

    let missing = ctx.get("/api/users/profile", None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.message(), "Not authorized, no token");

    let garbage = ctx.get("/api/users/profile", Some("garbage")).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.message(), "Not authorized, invalid token");

    let unknown = ctx
        .get("/api/users/profile", Some(&ctx.token_for(uuid::Uuid::new_v4())))
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update() {
    let ctx = TestContext::new().await;
    let user = ctx.register("Balboa").await;
    let taken = ctx.register("Taken").await;

    let clash = ctx
        .put("/api/users/profile", Some(&user.token), json!({ "email": taken.email }))
        .await;
    assert_eq!(clash.status, StatusCode::BAD_REQUEST);

    let updated = ctx
        .put(
            "/api/users/profile",
            Some(&user.token),
            json!({ "name": "Balboa Jr", "phone": "555-0100", "password": "newpass99" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Balboa Jr");
    assert_eq!(updated.body["phone"], "555-0100");

    let login = ctx
        .post("/api/users/login", None, json!({ "email": user.email, "password": "newpass99" }))
        .await;
    assert_eq!(login.status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_administration() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let user = ctx.register("Member").await;

    let forbidden = ctx.get("/api/users", Some(&user.token)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let listed = ctx.get("/api/users", Some(&admin.token)).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 2);

    let promoted = ctx
        .put(
            &format!("/api/users/{}", user.id),
            Some(&admin.token),
            json!({ "role": "operator", "permissions": { "isAssistant": true } }),
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.body["role"], "operator");
    assert_eq!(promoted.body["permissions"]["isAssistant"], true);
    assert_eq!(promoted.body["permissions"]["isOperator"], false);
    assert_eq!(promoted.body["changedHistory"].as_array().unwrap().len(), 2);

    let removed = ctx.delete(&format!("/api/users/{}", user.id), Some(&admin.token)).await;
    assert_eq!(removed.message(), "User removed");

    let gone = ctx.get(&format!("/api/users/{}", user.id), Some(&admin.token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let listed = ctx.get("/api/users", Some(&admin.token)).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);

    let stale_token = ctx.get("/api/users/profile", Some(&user.token)).await;
    assert_eq!(stale_token.status, StatusCode::UNAUTHORIZED);

    let login = ctx
        .post("/api/users/login", None, json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_attempts_are_limited() {
    let ctx = TestContext::new_with_settings(|settings| settings.auth.login_max_attempts = 3).await;
    let user = ctx.seed_user("Target", Role::User).await;

    for _ in 0..3 {
        let response = ctx
            .post("/api/users/login", None, json!({ "email": user.email, "password": "wrong999" }))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    let limiter = &ctx.state.services.login_limiter;
    assert!(limiter.get_rate_limit_status(&user.email).is_limited());

    let limited = ctx
        .post("/api/users/login", None, json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_successful_login_clears_failed_attempts() {
    let ctx = TestContext::new_with_settings(|settings| settings.auth.login_max_attempts = 3).await;
    let user = ctx.seed_user("Returning", Role::User).await;
    let limiter = &ctx.state.services.login_limiter;

    for _ in 0..2 {
        ctx.post("/api/users/login", None, json!({ "email": user.email, "password": "wrong999" }))
            .await;
    }
    let status = limiter.get_rate_limit_status(&user.email);
    assert_eq!(status.current_requests, 2);
    assert_eq!(status.remaining_requests, 1);

    let ok = ctx
        .post("/api/users/login", None, json!({ "email": user.email, "password": TEST_PASSWORD }))
        .await;
    assert_eq!(ok.status, StatusCode::OK, "{}", ok.body);
    assert_eq!(limiter.get_rate_limit_status(&user.email).remaining_requests, 3);
}
