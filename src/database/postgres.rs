//! PostgreSQL document store
//!
//! Documents live in a single JSONB table keyed by `(collection, id)`.
//! Seat counters are updated with conditional `UPDATE ... RETURNING`
//! statements so concurrent reservations cannot oversell.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::time::Instant;
use uuid::Uuid;

use super::connection::DatabasePool;
use super::store::{collections, dedup_ids, Document, DocumentStore, SeatReservation};
use crate::models::{ChangeType, HistoryRecord};
use crate::utils::errors::{EventHubError, Result};
use crate::utils::logging::{log_seat_change, log_store_operation};

const RESERVE_SEATS_SQL: &str = r#"
    UPDATE documents
    SET body = jsonb_set(body, '{takenSeats}', to_jsonb(COALESCE((body->>'takenSeats')::bigint, 0) + 1)),
        updated_at = NOW()
    WHERE collection = $1
      AND id = ANY($2)
      AND COALESCE((body->>'isDeleted')::boolean, false) = false
      AND (COALESCE((body->>'seats')::bigint, 0) = 0
           OR COALESCE((body->>'takenSeats')::bigint, 0) < (body->>'seats')::bigint)
    RETURNING id
"#;

const RELEASE_SEATS_SQL: &str = r#"
    UPDATE documents
    SET body = jsonb_set(body, '{takenSeats}', to_jsonb((body->>'takenSeats')::bigint - 1)),
        updated_at = NOW()
    WHERE collection = $1
      AND id = ANY($2)
      AND COALESCE((body->>'takenSeats')::bigint, 0) > 0
    RETURNING id
"#;

const SET_SEATS_SQL: &str = r#"
    UPDATE documents
    SET body = jsonb_set(body, '{seats}', to_jsonb($3::bigint)),
        updated_at = NOW()
    WHERE collection = $1
      AND id = $2
      AND COALESCE((body->>'isDeleted')::boolean, false) = false
      AND ($3 = 0 OR COALESCE((body->>'takenSeats')::bigint, 0) <= $3)
    RETURNING id
"#;

#[derive(Clone)]
pub struct PostgresStore {
    pool: DatabasePool,
}

impl PostgresStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn insert(&self, collection: &str, id: Uuid, doc: Document) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(doc)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EventHubError::Duplicate(format!("{} {} already exists", collection, id)));
        }

        Ok(())
    }

    async fn get(&self, collection: &str, id: Uuid) -> Result<Option<Document>> {
        let body = sqlx::query_scalar::<_, Document>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(body)
    }

    async fn find(&self, collection: &str, filter: &Document) -> Result<Vec<Document>> {
        let started = Instant::now();
        let result = sqlx::query_scalar::<_, Document>(
            "SELECT body FROM documents WHERE collection = $1 AND body @> $2 ORDER BY seq",
        )
        .bind(collection)
        .bind(filter)
        .fetch_all(&self.pool)
        .await;

        log_store_operation("find", collection, started.elapsed().as_millis() as u64, result.is_ok());
        Ok(result?)
    }

    async fn patch(&self, collection: &str, id: Uuid, fields: Document) -> Result<Option<Document>> {
        if !fields.is_object() {
            return Err(EventHubError::Storage("patch must be a JSON object".to_string()));
        }

        let body = sqlx::query_scalar::<_, Document>(
            r#"
            UPDATE documents
            SET body = body || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            RETURNING body
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(fields)
        .fetch_optional(&self.pool)
        .await?;

        Ok(body)
    }

    async fn add_to_set(&self, collection: &str, id: Uuid, field: &str, value: Document) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = jsonb_set(body, ARRAY[$3], COALESCE(body->$3, '[]'::jsonb) || jsonb_build_array($4::jsonb)),
                updated_at = NOW()
            WHERE collection = $1 AND id = $2
              AND NOT (COALESCE(body->$3, '[]'::jsonb) @> jsonb_build_array($4::jsonb))
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn pull(&self, collection: &str, id: Uuid, field: &str, value: &Document) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = jsonb_set(
                    body,
                    ARRAY[$3],
                    COALESCE(
                        (SELECT jsonb_agg(e) FROM jsonb_array_elements(body->$3) AS e WHERE NOT (e @> $4::jsonb)),
                        '[]'::jsonb
                    )
                ),
                updated_at = NOW()
            WHERE collection = $1 AND id = $2
              AND jsonb_typeof(body->$3) = 'array'
              AND EXISTS (SELECT 1 FROM jsonb_array_elements(body->$3) AS e WHERE e @> $4::jsonb)
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, collection: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reserve_seats(&self, activity_ids: &[Uuid]) -> Result<SeatReservation> {
        let ids = dedup_ids(activity_ids);
        if ids.is_empty() {
            return Ok(SeatReservation::Reserved);
        }

        let mut tx = self.pool.begin().await?;
        let updated: Vec<Uuid> = sqlx::query_scalar(RESERVE_SEATS_SQL)
            .bind(collections::ACTIVITIES)
            .bind(&ids)
            .fetch_all(&mut *tx)
            .await?;

        if let Some(blocked) = ids.iter().find(|id| !updated.contains(id)) {
            tx.rollback().await?;
            log_seat_change(&ids, "reserve", false);
            return Ok(SeatReservation::Blocked(*blocked));
        }

        tx.commit().await?;
        log_seat_change(&ids, "reserve", true);
        Ok(SeatReservation::Reserved)
    }

    async fn release_seats(&self, activity_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let ids = dedup_ids(activity_ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let released: Vec<Uuid> = sqlx::query_scalar(RELEASE_SEATS_SQL)
            .bind(collections::ACTIVITIES)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        log_seat_change(&released, "release", true);
        Ok(released)
    }

    async fn set_seats(&self, activity_id: Uuid, seats: u64) -> Result<bool> {
        let seats = i64::try_from(seats)
            .map_err(|_| EventHubError::validation("Seats must be a non-negative number"))?;

        let updated: Option<Uuid> = sqlx::query_scalar(SET_SEATS_SQL)
            .bind(collections::ACTIVITIES)
            .bind(activity_id)
            .bind(seats)
            .fetch_optional(&self.pool)
            .await?;

        log_seat_change(&[activity_id], "resize", updated.is_some());
        Ok(updated.is_some())
    }

    async fn append_history(&self, entity_id: Uuid, record: &HistoryRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO change_history (entity_id, date, user_id, change_type)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entity_id)
        .bind(record.date)
        .bind(record.user)
        .bind(record.change_type.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn history(&self, entity_id: Uuid, limit: Option<usize>) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT date, user_id, change_type
            FROM change_history
            WHERE entity_id = $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(entity_id)
        .bind(limit.map(|n| n as i64))
        .fetch_all(&self.pool)
        .await?;

        let mut records = rows
            .into_iter()
            .map(|row| {
                Ok(HistoryRecord {
                    date: row.try_get::<DateTime<Utc>, _>("date")?,
                    user: row.try_get::<Option<Uuid>, _>("user_id")?,
                    change_type: ChangeType::from(row.try_get::<String, _>("change_type")?),
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

        records.reverse();
        Ok(records)
    }

    async fn ping(&self) -> Result<()> {
        super::connection::health_check(&self.pool).await
    }
}
