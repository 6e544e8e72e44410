//! Event, operator and activity endpoints

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::json;
use uuid::Uuid;

use EventHub::models::Role;

async fn create_event(ctx: &TestContext, admin: &TestUser, is_public: bool) -> Uuid {
    let response = ctx.post("/api/events", Some(&admin.token), event_body(is_public)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.id()
}

async fn create_activity(ctx: &TestContext, token: &str, event: Uuid, title: &str, seats: i64) -> Uuid {
    let response = ctx
        .post(
            &format!("/api/events/{}/activities", event),
            Some(token),
            activity_body(title, seats),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.id()
}

#[tokio::test]
async fn test_root_and_health() {
    let ctx = TestContext::new().await;

    let root = ctx.get("/", None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.message(), "EventHub API is running");

    let health = ctx.get("/health", None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["storeHealthy"], true);
}

#[tokio::test]
async fn test_admin_creates_event_with_history() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;

    let response = ctx.post("/api/events", Some(&admin.token), event_body(true)).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["changedType"], "create");
    assert_eq!(response.body["changedBy"], admin.id.to_string());
    let history = response.body["changedHistory"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["changeType"], "create");
    assert_eq!(history[0]["user"], admin.id.to_string());
    assert_eq!(response.body["infoColor"], "#123abc");
}

#[tokio::test]
async fn test_non_admin_cannot_create_event() {
    let ctx = TestContext::new().await;
    let user = ctx.register("Regular").await;

    let response = ctx.post("/api/events", Some(&user.token), event_body(true)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(!response.message().is_empty());

    let anonymous = ctx.post("/api/events", None, event_body(true)).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.message(), "Not authorized, no token");
}

#[tokio::test]
async fn test_event_validation() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;

    let missing_title = ctx
        .post("/api/events", Some(&admin.token), json!({ "description": "untitled" }))
        .await;
    assert_eq!(missing_title.status, StatusCode::BAD_REQUEST);

    let bad_color = ctx
        .post(
            "/api/events",
            Some(&admin.token),
            json!({ "title": "Colorful", "bgColor": "not-a-color" }),
        )
        .await;
    assert_eq!(bad_color.status, StatusCode::BAD_REQUEST);

    let malformed = ctx.get("/api/events/not-a-uuid", None).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert!(!malformed.message().is_empty());
}

#[tokio::test]
async fn test_listing_respects_visibility() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let public = create_event(&ctx, &admin, true).await;
    let private = create_event(&ctx, &admin, false).await;
    let assistant = ctx.register("Assistant").await;

    let added = ctx
        .post(
            &format!("/api/events/{}/assistants", private),
            Some(&admin.token),
            json!({ "userId": assistant.id }),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK);

    let ids = |body: &serde_json::Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_str().unwrap().to_string())
            .collect()
    };

    let anonymous = ctx.get("/api/events", None).await;
    assert_eq!(ids(&anonymous.body), vec![public.to_string()]);

    let as_assistant = ctx.get("/api/events", Some(&assistant.token)).await;
    assert_eq!(as_assistant.body.as_array().unwrap().len(), 2);

    let as_admin = ctx.get("/api/events", Some(&admin.token)).await;
    assert_eq!(as_admin.body.as_array().unwrap().len(), 2);

    let outsider = ctx.register("Outsider").await;
    let detail = ctx.get(&format!("/api/events/{}", private), Some(&outsider.token)).await;
    assert_eq!(detail.status, StatusCode::FORBIDDEN);

    let detail = ctx.get(&format!("/api/events/{}", private), Some(&assistant.token)).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["assistants"][0]["id"], assistant.id.to_string());
}

#[tokio::test]
async fn test_update_keeps_blank_fields_and_records_history() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let event = create_event(&ctx, &admin, true).await;
    let before = ctx.get(&format!("/api/events/{}", event), None).await;

    let response = ctx
        .put(
            &format!("/api/events/{}", event),
            Some(&admin.token),
            json!({ "title": "", "place": "Annex" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["title"], before.body["title"]);
    assert_eq!(response.body["place"], "Annex");
    assert_eq!(response.body["changedType"], "update");
    let history = response.body["changedHistory"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["changeType"], "update");

    let rejected = ctx
        .put(
            &format!("/api/events/{}", event),
            Some(&admin.token),
            json!({ "starColor": "#12" }),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activity_operator_is_scoped() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let event = create_event(&ctx, &admin, true).await;
    let a1 = create_activity(&ctx, &admin.token, event, "Workshop", 10).await;
    let a2 = create_activity(&ctx, &admin.token, event, "Social", 10).await;
    let operator = ctx.seed_user("Operator", Role::Operator).await;

    let added = ctx
        .post(
            &format!("/api/events/{}/operators", event),
            Some(&admin.token),
            json!({ "userId": operator.id, "role": "activity", "activities": [a1] }),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK, "{}", added.body);
    assert_eq!(added.body["operators"][0]["role"], "activity");

    let own = ctx
        .put(
            &format!("/api/activities/{}", a1),
            Some(&operator.token),
            json!({ "title": "Advanced workshop" }),
        )
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["title"], "Advanced workshop");

    let other = ctx
        .put(
            &format!("/api/activities/{}", a2),
            Some(&operator.token),
            json!({ "title": "Hijacked" }),
        )
        .await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);

    let event_edit = ctx
        .put(
            &format!("/api/events/{}", event),
            Some(&operator.token),
            json!({ "title": "Renamed" }),
        )
        .await;
    assert_eq!(event_edit.status, StatusCode::FORBIDDEN);

    let removed = ctx
        .delete(
            &format!("/api/events/{}/operators/{}", event, operator.id),
            Some(&admin.token),
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["operators"], json!([]));

    let revoked = ctx
        .put(
            &format!("/api/activities/{}", a1),
            Some(&operator.token),
            json!({ "title": "Again" }),
        )
        .await;
    assert_eq!(revoked.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_general_operator_sets_ticket_type() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let event = create_event(&ctx, &admin, true).await;
    let activity = create_activity(&ctx, &admin.token, event, "Workshop", 10).await;
    let general = ctx.seed_user("General", Role::Operator).await;
    let scoped = ctx.seed_user("Scoped", Role::Operator).await;

    for (user, role) in [(&general, "general"), (&scoped, "activity")] {
        let response = ctx
            .post(
                &format!("/api/events/{}/operators", event),
                Some(&admin.token),
                json!({ "userId": user.id, "role": role, "activities": [activity] }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let ignored = ctx
        .put(
            &format!("/api/activities/{}", activity),
            Some(&scoped.token),
            json!({ "ticketType": 7 }),
        )
        .await;
    assert_eq!(ignored.status, StatusCode::OK);
    assert_eq!(ignored.body["ticketType"], 0);

    let applied = ctx
        .put(
            &format!("/api/activities/{}", activity),
            Some(&general.token),
            json!({ "ticketType": 7 }),
        )
        .await;
    assert_eq!(applied.status, StatusCode::OK);
    assert_eq!(applied.body["ticketType"], 7);
}

#[tokio::test]
async fn test_nested_activity_routes_and_soft_delete() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let event = create_event(&ctx, &admin, true).await;
    let activity = create_activity(&ctx, &admin.token, event, "Workshop", 0).await;

    let flat = ctx
        .get(&format!("/api/activities/events/{}/activities", event), None)
        .await;
    assert_eq!(flat.status, StatusCode::OK);
    assert_eq!(flat.body.as_array().unwrap().len(), 1);

    let deleted = ctx
        .delete(&format!("/api/activities/{}", activity), Some(&admin.token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.message(), "Activity removed");

    let gone = ctx.get(&format!("/api/activities/{}", activity), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let listed = ctx.get(&format!("/api/events/{}/activities", event), None).await;
    assert_eq!(listed.body, json!([]));

    let removed = ctx.delete(&format!("/api/events/{}", event), Some(&admin.token)).await;
    assert_eq!(removed.message(), "Event removed");
    let missing = ctx.get(&format!("/api/events/{}", event), Some(&admin.token)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    let listing = ctx.get("/api/events", Some(&admin.token)).await;
    assert_eq!(listing.body, json!([]));
}

#[tokio::test]
async fn test_seat_increment_and_decrement() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let event = create_event(&ctx, &admin, true).await;
    let single = create_activity(&ctx, &admin.token, event, "Masterclass", 1).await;
    let unlimited = create_activity(&ctx, &admin.token, event, "Open floor", 0).await;

    let increment = format!("/api/activities/{}/seats/increment", single);
    let decrement = format!("/api/activities/{}/seats/decrement", single);

    let empty = ctx.put(&decrement, Some(&admin.token), json!({})).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let taken = ctx.put(&increment, Some(&admin.token), json!({})).await;
    assert_eq!(taken.status, StatusCode::OK);
    assert_eq!(taken.body["takenSeats"], 1);
    assert_eq!(taken.body["availableSeats"], 0);

    let full = ctx.put(&increment, Some(&admin.token), json!({})).await;
    assert_eq!(full.status, StatusCode::BAD_REQUEST);

    let released = ctx.put(&decrement, Some(&admin.token), json!({})).await;
    assert_eq!(released.body["takenSeats"], 0);
    assert_eq!(released.body["availableSeats"], 1);

    let open = ctx
        .put(
            &format!("/api/activities/{}/seats/increment", unlimited),
            Some(&admin.token),
            json!({}),
        )
        .await;
    assert_eq!(open.body["takenSeats"], 1);
    assert_eq!(open.body["availableSeats"], "unlimited");
}

#[tokio::test]
async fn test_seats_cannot_drop_below_taken() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin().await;
    let event = create_event(&ctx, &admin, true).await;
    let activity = create_activity(&ctx, &admin.token, event, "Workshop", 5).await;

    for _ in 0..3 {
        ctx.put(
            &format!("/api/activities/{}/seats/increment", activity),
            Some(&admin.token),
            json!({}),
        )
        .await;
    }

    let too_low = ctx
        .put(
            &format!("/api/activities/{}", activity),
            Some(&admin.token),
            json!({ "seats": 2 }),
        )
        .await;
    assert_eq!(too_low.status, StatusCode::BAD_REQUEST);
    assert_eq!(too_low.message(), "Seats cannot be lower than the 3 seats already taken");

    let exact = ctx
        .put(
            &format!("/api/activities/{}", activity),
            Some(&admin.token),
            json!({ "seats": 3, "title": "Full house" }),
        )
        .await;
    assert_eq!(exact.status, StatusCode::OK, "{}", exact.body);
    assert_eq!(exact.body["seats"], 3);
    assert_eq!(exact.body["title"], "Full house");

    let negative = ctx
        .put(
            &format!("/api/activities/{}", activity),
            Some(&admin.token),
            json!({ "seats": -1 }),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);

    let unlimited = ctx
        .put(
            &format!("/api/activities/{}", activity),
            Some(&admin.token),
            json!({ "seats": 0 }),
        )
        .await;
    assert_eq!(unlimited.status, StatusCode::OK);
    assert_eq!(unlimited.body["seats"], 0);
    assert_eq!(unlimited.body["takenSeats"], 3);
}
