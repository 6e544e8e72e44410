//! Activity handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use super::extract::{JsonBody, PathParams};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::models::{
    Activity, AddWitnessRequest, CreateActivityRequest, SeatChangeResponse, UpdateActivityRequest, WithHistory,
};
use crate::state::AppState;
use crate::utils::errors::Result;

/// GET /events/:id/activities
pub async fn handle_list_for_event(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    PathParams(event_id): PathParams<Uuid>,
) -> Result<Json<Vec<Activity>>> {
    Ok(Json(
        state
            .services
            .activity_service
            .list_for_event(caller.actor(), event_id)
            .await?,
    ))
}

/// POST /events/:id/activities
pub async fn handle_create(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(event_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<CreateActivityRequest>,
) -> Result<(StatusCode, Json<WithHistory<Activity>>)> {
    let activity = state
        .services
        .activity_service
        .create(&auth.actor, event_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// GET /activities/:id
pub async fn handle_get(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    PathParams(activity_id): PathParams<Uuid>,
) -> Result<Json<WithHistory<Activity>>> {
    Ok(Json(state.services.activity_service.get(caller.actor(), activity_id).await?))
}

/// PUT /activities/:id
pub async fn handle_update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(activity_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<UpdateActivityRequest>,
) -> Result<Json<WithHistory<Activity>>> {
    Ok(Json(
        state
            .services
            .activity_service
            .update(&auth.actor, activity_id, request)
            .await?,
    ))
}

/// DELETE /activities/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(activity_id): PathParams<Uuid>,
) -> Result<Json<Value>> {
    state.services.activity_service.delete(&auth.actor, activity_id).await?;
    Ok(Json(json!({ "message": "Activity removed" })))
}

/// POST /activities/:id/witnesses
pub async fn handle_add_witness(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(activity_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<AddWitnessRequest>,
) -> Result<Json<Value>> {
    let witnesses = state
        .services
        .activity_service
        .add_witness(&auth.actor, activity_id, request.user_id)
        .await?;
    Ok(Json(json!({ "message": "Witness added successfully", "witnesses": witnesses })))
}

/// DELETE /activities/:id/witnesses/:userId
pub async fn handle_remove_witness(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams((activity_id, user_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Json<Value>> {
    let witnesses = state
        .services
        .activity_service
        .remove_witness(&auth.actor, activity_id, user_id)
        .await?;
    Ok(Json(json!({ "message": "Witness removed successfully", "witnesses": witnesses })))
}

/// PUT /activities/:id/seats/increment
pub async fn handle_increment_seats(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(activity_id): PathParams<Uuid>,
) -> Result<Json<SeatChangeResponse>> {
    Ok(Json(
        state
            .services
            .activity_service
            .increment_seats(&auth.actor, activity_id)
            .await?,
    ))
}

/// PUT /activities/:id/seats/decrement
pub async fn handle_decrement_seats(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(activity_id): PathParams<Uuid>,
) -> Result<Json<SeatChangeResponse>> {
    Ok(Json(
        state
            .services
            .activity_service
            .decrement_seats(&auth.actor, activity_id)
            .await?,
    ))
}
