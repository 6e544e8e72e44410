//! PostgreSQL document store behavior
//!
//! Needs Docker or `TEST_DATABASE_URL`; run with `cargo test -- --ignored`.

mod helpers;

use helpers::*;
use serde_json::json;
use serial_test::serial;
use uuid::Uuid;

use EventHub::database::{collections, SeatReservation};
use EventHub::models::{ChangeType, HistoryRecord};

async fn activity(db: &TestDatabase, seats: u64, taken: u64) -> Uuid {
    let id = Uuid::new_v4();
    db.store
        .insert(
            collections::ACTIVITIES,
            id,
            json!({ "id": id, "title": "Session", "seats": seats, "takenSeats": taken, "isDeleted": false }),
        )
        .await
        .expect("insert activity");
    id
}

async fn taken_seats(db: &TestDatabase, id: Uuid) -> u64 {
    db.store
        .get(collections::ACTIVITIES, id)
        .await
        .expect("get activity")
        .expect("activity exists")["takenSeats"]
        .as_u64()
        .expect("counter")
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_reservation_is_all_or_nothing() {
    let db = TestDatabase::new().await.expect("test database");
    let open = activity(&db, 5, 0).await;
    let full = activity(&db, 1, 1).await;
    let unlimited = activity(&db, 0, 7).await;

    let outcome = db.store.reserve_seats(&[open, full]).await.unwrap();
    assert_eq!(outcome, SeatReservation::Blocked(full));
    assert_eq!(taken_seats(&db, open).await, 0);
    assert_eq!(taken_seats(&db, full).await, 1);

    let outcome = db.store.reserve_seats(&[open, unlimited, open]).await.unwrap();
    assert_eq!(outcome, SeatReservation::Reserved);
    assert_eq!(taken_seats(&db, open).await, 1);
    assert_eq!(taken_seats(&db, unlimited).await, 8);

    let missing = Uuid::new_v4();
    let outcome = db.store.reserve_seats(&[open, missing]).await.unwrap();
    assert_eq!(outcome, SeatReservation::Blocked(missing));
    assert_eq!(taken_seats(&db, open).await, 1);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_release_never_goes_negative() {
    let db = TestDatabase::new().await.expect("test database");
    let booked = activity(&db, 3, 1).await;
    let empty = activity(&db, 3, 0).await;

    let released = db.store.release_seats(&[booked, empty]).await.unwrap();
    assert_eq!(released, vec![booked]);
    assert_eq!(taken_seats(&db, booked).await, 0);
    assert_eq!(taken_seats(&db, empty).await, 0);
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_set_seats_never_undercuts_taken() {
    let db = TestDatabase::new().await.expect("test database");
    let booked = activity(&db, 5, 3).await;

    assert!(!db.store.set_seats(booked, 2).await.unwrap());
    assert!(db.store.set_seats(booked, 3).await.unwrap());
    assert_eq!(
        db.store.reserve_seats(&[booked]).await.unwrap(),
        SeatReservation::Blocked(booked)
    );

    assert!(db.store.set_seats(booked, 0).await.unwrap());
    let doc = db.store.get(collections::ACTIVITIES, booked).await.unwrap().unwrap();
    assert_eq!(doc["seats"], 0);
    assert_eq!(taken_seats(&db, booked).await, 3);

    assert!(!db.store.set_seats(Uuid::new_v4(), 1).await.unwrap());
}

#[tokio::test]
#[ignore]
#[serial]
async fn test_documents_and_history() {
    let db = TestDatabase::new().await.expect("test database");
    let id = Uuid::new_v4();
    let user = Uuid::new_v4();

    db.store
        .insert(
            collections::EVENTS,
            id,
            json!({ "id": id, "title": "Gala", "operators": [], "isDeleted": false }),
        )
        .await
        .unwrap();
    assert!(db
        .store
        .insert(collections::EVENTS, id, json!({ "id": id }))
        .await
        .is_err());

    let patched = db
        .store
        .patch(collections::EVENTS, id, json!({ "title": "Winter Gala" }))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(patched["title"], "Winter Gala");
    assert_eq!(patched["isDeleted"], false);

    let operator = json!({ "user": user, "role": "general", "activities": [] });
    assert!(db.store.add_to_set(collections::EVENTS, id, "operators", operator.clone()).await.unwrap());
    assert!(!db.store.add_to_set(collections::EVENTS, id, "operators", operator).await.unwrap());

    let found = db
        .store
        .find(collections::EVENTS, &json!({ "operators": [{ "user": user }] }))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    assert!(db
        .store
        .pull(collections::EVENTS, id, "operators", &json!({ "user": user }))
        .await
        .unwrap());

    for change in [ChangeType::Create, ChangeType::Update, ChangeType::custom("add-operator")] {
        db.store
            .append_history(id, &HistoryRecord::new(Some(user), change))
            .await
            .unwrap();
    }
    let history = db.store.history(id, None).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].change_type, ChangeType::Create);

    let recent = db.store.history(id, Some(2)).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[1].change_type, ChangeType::custom("add-operator"));

    assert!(db.store.remove(collections::EVENTS, id).await.unwrap());
    assert!(db.store.get(collections::EVENTS, id).await.unwrap().is_none());
    db.store.ping().await.unwrap();
}
