//! Ticket endpoints and seat accounting

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::json;
use uuid::Uuid;

struct Fixture {
    ctx: TestContext,
    admin: TestUser,
    holder: TestUser,
    event: Uuid,
}

impl Fixture {
    async fn new() -> Self {
        let ctx = TestContext::new().await;
        let admin = ctx.admin().await;
        let holder = ctx.register("Holder").await;
        let event = ctx.post("/api/events", Some(&admin.token), event_body(true)).await.id();
        Self {
            ctx,
            admin,
            holder,
            event,
        }
    }

    async fn activity(&self, title: &str, seats: i64) -> Uuid {
        self.ctx
            .post(
                &format!("/api/events/{}/activities", self.event),
                Some(&self.admin.token),
                activity_body(title, seats),
            )
            .await
            .id()
    }

    async fn taken_seats(&self, activity: Uuid) -> u64 {
        self.ctx
            .get(&format!("/api/activities/{}", activity), None)
            .await
            .body["takenSeats"]
            .as_u64()
            .unwrap()
    }

    async fn ticket(&self, user: Uuid, activities: &[Uuid]) -> TestResponse {
        self.ctx
            .post(
                "/api/tickets",
                Some(&self.admin.token),
                ticket_body(self.event, user, activities),
            )
            .await
    }
}

#[tokio::test]
async fn test_create_ticket_reserves_and_links() {
    let f = Fixture::new().await;
    let workshop = f.activity("Workshop", 10).await;

    let response = f.ticket(f.holder.id, &[workshop, workshop]).await;

    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    assert_eq!(response.body["role"], "assistente");
    assert_eq!(response.body["event"]["id"], f.event.to_string());
    assert_eq!(response.body["user"]["id"], f.holder.id.to_string());
    assert_eq!(response.body["activities"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["activities"][0]["title"], "Workshop");
    assert_eq!(response.body["changedHistory"].as_array().unwrap().len(), 1);
    assert_eq!(f.taken_seats(workshop).await, 1);

    let profile = f.ctx.get("/api/users/profile", Some(&f.holder.token)).await;
    assert_eq!(profile.body["tickets"], json!([response.id()]));

    let event = f.ctx.get(&format!("/api/events/{}", f.event), Some(&f.admin.token)).await;
    assert_eq!(event.body["assistants"][0]["id"], f.holder.id.to_string());
}

#[tokio::test]
async fn test_over_capacity_changes_nothing() {
    let f = Fixture::new().await;
    let open = f.activity("Open", 10).await;
    let single = f.activity("Single seat", 1).await;
    let first = f.ctx.register("First").await;

    assert_eq!(f.ticket(first.id, &[single]).await.status, StatusCode::CREATED);
    assert_eq!(f.taken_seats(single).await, 1);

    let response = f.ticket(f.holder.id, &[open, single]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.message().contains("Single seat"), "{}", response.message());
    assert_eq!(f.taken_seats(open).await, 0);
    assert_eq!(f.taken_seats(single).await, 1);

    let profile = f.ctx.get("/api/users/profile", Some(&f.holder.token)).await;
    assert_eq!(profile.body["tickets"], json!([]));
}

#[tokio::test]
async fn test_ticket_validation() {
    let f = Fixture::new().await;
    let other_event = f
        .ctx
        .post("/api/events", Some(&f.admin.token), event_body(true))
        .await
        .id();
    let foreign = f
        .ctx
        .post(
            &format!("/api/events/{}/activities", other_event),
            Some(&f.admin.token),
            activity_body("Elsewhere", 5),
        )
        .await
        .id();

    let response = f.ticket(f.holder.id, &[foreign]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let missing_user = f.ticket(Uuid::new_v4(), &[]).await;
    assert_eq!(missing_user.status, StatusCode::NOT_FOUND);

    let no_title = f
        .ctx
        .post(
            "/api/tickets",
            Some(&f.admin.token),
            json!({ "event": f.event, "user": f.holder.id }),
        )
        .await;
    assert_eq!(no_title.status, StatusCode::BAD_REQUEST);

    let not_allowed = f
        .ctx
        .post(
            "/api/tickets",
            Some(&f.holder.token),
            ticket_body(f.event, f.holder.id, &[]),
        )
        .await;
    assert_eq!(not_allowed.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_moves_seats() {
    let f = Fixture::new().await;
    let a1 = f.activity("Morning", 5).await;
    let a2 = f.activity("Evening", 5).await;
    let ticket = f.ticket(f.holder.id, &[a1]).await.id();

    let response = f
        .ctx
        .put(
            &format!("/api/tickets/{}", ticket),
            Some(&f.admin.token),
            json!({ "activities": [a2], "price": 40.0 }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["price"], 40.0);
    assert_eq!(response.body["activities"][0]["id"], a2.to_string());
    assert_eq!(response.body["changedHistory"].as_array().unwrap().len(), 2);
    assert_eq!(f.taken_seats(a1).await, 0);
    assert_eq!(f.taken_seats(a2).await, 1);
}

#[tokio::test]
async fn test_ticket_read_permissions() {
    let f = Fixture::new().await;
    let ticket = f.ticket(f.holder.id, &[]).await.id();
    let stranger = f.ctx.register("Stranger").await;

    let own = f.ctx.get(&format!("/api/tickets/{}", ticket), Some(&f.holder.token)).await;
    assert_eq!(own.status, StatusCode::OK);

    let other = f.ctx.get(&format!("/api/tickets/{}", ticket), Some(&stranger.token)).await;
    assert_eq!(other.status, StatusCode::FORBIDDEN);

    let by_user = f
        .ctx
        .get(&format!("/api/tickets/user/{}", f.holder.id), Some(&f.holder.token))
        .await;
    assert_eq!(by_user.body.as_array().unwrap().len(), 1);

    let by_user = f
        .ctx
        .get(&format!("/api/tickets/user/{}", f.holder.id), Some(&stranger.token))
        .await;
    assert_eq!(by_user.status, StatusCode::FORBIDDEN);

    let by_event = f
        .ctx
        .get(&format!("/api/tickets/event/{}", f.event), Some(&stranger.token))
        .await;
    assert_eq!(by_event.status, StatusCode::FORBIDDEN);

    let by_event = f
        .ctx
        .get(&format!("/api/tickets/event/{}", f.event), Some(&f.admin.token))
        .await;
    assert_eq!(by_event.body.as_array().unwrap().len(), 1);

    let listed = f.ctx.get("/api/tickets", Some(&stranger.token)).await;
    assert_eq!(listed.body, json!([]));
    let listed = f.ctx.get("/api/tickets", Some(&f.admin.token)).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_releases_seats_and_unlinks() {
    let f = Fixture::new().await;
    let workshop = f.activity("Workshop", 2).await;
    let ticket = f.ticket(f.holder.id, &[workshop]).await.id();

    let forbidden = f
        .ctx
        .delete(&format!("/api/tickets/{}", ticket), Some(&f.holder.token))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let deleted = f
        .ctx
        .delete(&format!("/api/tickets/{}", ticket), Some(&f.admin.token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.message(), "Ticket removed");

    assert_eq!(f.taken_seats(workshop).await, 0);
    let gone = f.ctx.get(&format!("/api/tickets/{}", ticket), Some(&f.admin.token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let profile = f.ctx.get("/api/users/profile", Some(&f.holder.token)).await;
    assert_eq!(profile.body["tickets"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tickets_race_for_last_seat() {
    let f = std::sync::Arc::new(Fixture::new().await);
    let last_seat = f.activity("Last seat", 1).await;

    let mut buyers = Vec::new();
    for i in 0..8 {
        buyers.push(f.ctx.register(&format!("Buyer {}", i)).await);
    }

    let handles: Vec<_> = buyers
        .into_iter()
        .map(|buyer| {
            let f = f.clone();
            tokio::spawn(async move { f.ticket(buyer.id, &[last_seat]).await.status })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            status => assert_eq!(status, StatusCode::BAD_REQUEST),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(f.taken_seats(last_seat).await, 1);
}
