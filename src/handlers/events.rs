//! Event handlers
//!
//! Event CRUD, image uploads, and the operator and assistant lists.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use super::extract::{JsonBody, PathParams, UploadForm};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::models::{
    AddAssistantRequest, AddOperatorRequest, CreateEventRequest, Event, EventDetail, EventListItem,
    UpdateEventRequest, WithHistory,
};
use crate::state::AppState;
use crate::utils::errors::Result;

/// GET /events
pub async fn handle_list(State(state): State<AppState>, caller: MaybeAuthUser) -> Result<Json<Vec<EventListItem>>> {
    Ok(Json(state.services.event_service.list(caller.actor()).await?))
}

/// POST /events
pub async fn handle_create(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<CreateEventRequest>,
) -> Result<(StatusCode, Json<WithHistory<Event>>)> {
    let event = state.services.event_service.create(&auth.actor, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events/:id
pub async fn handle_detail(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    PathParams(event_id): PathParams<Uuid>,
) -> Result<Json<EventDetail>> {
    Ok(Json(state.services.event_service.detail(caller.actor(), event_id).await?))
}

/// PUT /events/:id
pub async fn handle_update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(event_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<UpdateEventRequest>,
) -> Result<Json<WithHistory<Event>>> {
    Ok(Json(
        state
            .services
            .event_service
            .update(&auth.actor, event_id, request)
            .await?,
    ))
}

/// DELETE /events/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(event_id): PathParams<Uuid>,
) -> Result<Json<Value>> {
    state.services.event_service.delete(&auth.actor, event_id).await?;
    Ok(Json(json!({ "message": "Event removed" })))
}

/// POST /events/:id/logo, multipart field `logo`
pub async fn handle_upload_logo(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(event_id): PathParams<Uuid>,
    mut form: UploadForm,
) -> Result<Json<Value>> {
    let file = form.take_file("logo")?;
    let url = state
        .services
        .event_service
        .upload_logo(&auth.actor, event_id, file)
        .await?;
    Ok(Json(json!({ "message": "Logo uploaded successfully", "logoUrl": url })))
}

/// POST /events/:id/mainImage, multipart field `photo`
pub async fn handle_upload_main_image(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(event_id): PathParams<Uuid>,
    mut form: UploadForm,
) -> Result<Json<Value>> {
    let file = form.take_file("photo")?;
    let url = state
        .services
        .event_service
        .upload_main_image(&auth.actor, event_id, file)
        .await?;
    Ok(Json(json!({ "message": "Main image uploaded successfully", "mainImageUrl": url })))
}

/// POST /events/:id/photos, multipart field `photos` (repeated)
pub async fn handle_upload_photos(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(event_id): PathParams<Uuid>,
    mut form: UploadForm,
) -> Result<Json<Value>> {
    let files = form.take_files("photos");
    let urls = state
        .services
        .event_service
        .upload_photos(&auth.actor, event_id, files)
        .await?;
    Ok(Json(json!({ "message": "Photos uploaded successfully", "photos": urls })))
}

/// POST /events/:id/operators
pub async fn handle_add_operator(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(event_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<AddOperatorRequest>,
) -> Result<Json<Value>> {
    let operators = state
        .services
        .event_service
        .add_operator(&auth.actor, event_id, request)
        .await?;
    Ok(Json(json!({ "message": "Operator added successfully", "operators": operators })))
}

/// DELETE /events/:id/operators/:userId
pub async fn handle_remove_operator(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams((event_id, user_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Json<Value>> {
    let operators = state
        .services
        .event_service
        .remove_operator(&auth.actor, event_id, user_id)
        .await?;
    Ok(Json(json!({ "message": "Operator removed successfully", "operators": operators })))
}

/// POST /events/:id/assistants
pub async fn handle_add_assistant(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(event_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<AddAssistantRequest>,
) -> Result<Json<Value>> {
    let assistants = state
        .services
        .event_service
        .add_assistant(&auth.actor, event_id, request)
        .await?;
    Ok(Json(json!({ "message": "Assistant added successfully", "assistants": assistants })))
}

/// DELETE /events/:id/assistants/:userId
pub async fn handle_remove_assistant(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams((event_id, user_id)): PathParams<(Uuid, Uuid)>,
) -> Result<Json<Value>> {
    let assistants = state
        .services
        .event_service
        .remove_assistant(&auth.actor, event_id, user_id)
        .await?;
    Ok(Json(json!({ "message": "Assistant removed successfully", "assistants": assistants })))
}
