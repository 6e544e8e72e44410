//! Ticket handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use super::extract::{JsonBody, PathParams};
use crate::middleware::AuthUser;
use crate::models::{CreateTicketRequest, TicketView, UpdateTicketRequest};
use crate::state::AppState;
use crate::utils::errors::Result;

/// POST /tickets
pub async fn handle_create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketView>)> {
    let ticket = state.services.ticket_service.create(&auth.actor, request).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /tickets
pub async fn handle_list(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<TicketView>>> {
    Ok(Json(state.services.ticket_service.list(&auth.actor).await?))
}

/// GET /tickets/user/:userId
pub async fn handle_by_user(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(user_id): PathParams<Uuid>,
) -> Result<Json<Vec<TicketView>>> {
    Ok(Json(state.services.ticket_service.by_user(&auth.actor, user_id).await?))
}

/// GET /tickets/event/:eventId
pub async fn handle_by_event(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(event_id): PathParams<Uuid>,
) -> Result<Json<Vec<TicketView>>> {
    Ok(Json(state.services.ticket_service.by_event(&auth.actor, event_id).await?))
}

/// GET /tickets/:id
pub async fn handle_get(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(ticket_id): PathParams<Uuid>,
) -> Result<Json<TicketView>> {
    Ok(Json(state.services.ticket_service.get(&auth.actor, ticket_id).await?))
}

/// PUT /tickets/:id
pub async fn handle_update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(ticket_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<UpdateTicketRequest>,
) -> Result<Json<TicketView>> {
    Ok(Json(
        state
            .services
            .ticket_service
            .update(&auth.actor, ticket_id, request)
            .await?,
    ))
}

/// DELETE /tickets/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(ticket_id): PathParams<Uuid>,
) -> Result<Json<Value>> {
    state.services.ticket_service.delete(&auth.actor, ticket_id).await?;
    Ok(Json(json!({ "message": "Ticket removed" })))
}
