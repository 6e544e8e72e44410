//! User handlers
//!
//! Registration, login, the caller's own profile, and user administration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use super::extract::{JsonBody, PathParams};
use crate::middleware::{AuthUser, MaybeAuthUser};
use crate::models::user::{AdminUpdateUserRequest, AuthResponse, LoginRequest, RegisterUserRequest, UpdateProfileRequest};
use crate::models::{UserView, WithHistory};
use crate::state::AppState;
use crate::utils::errors::Result;

/// POST /users
pub async fn handle_register(
    State(state): State<AppState>,
    caller: MaybeAuthUser,
    JsonBody(request): JsonBody<RegisterUserRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = state.services.user_service.register(caller.actor(), request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /users/login
pub async fn handle_login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let response = state.services.user_service.login(request).await?;
    Ok(Json(response))
}

/// GET /users/profile
pub async fn handle_profile(State(state): State<AppState>, auth: AuthUser) -> Result<Json<WithHistory<UserView>>> {
    debug!(user_id = %auth.actor.id, "Loading profile");
    Ok(Json(state.services.user_service.profile(&auth.actor).await?))
}

/// PUT /users/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>> {
    Ok(Json(state.services.user_service.update_profile(&auth.actor, request).await?))
}

/// GET /users
pub async fn handle_list(State(state): State<AppState>, auth: AuthUser) -> Result<Json<Vec<UserView>>> {
    Ok(Json(state.services.user_service.list(&auth.actor).await?))
}

/// GET /users/:id
pub async fn handle_get(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(user_id): PathParams<Uuid>,
) -> Result<Json<WithHistory<UserView>>> {
    Ok(Json(state.services.user_service.get(&auth.actor, user_id).await?))
}

/// PUT /users/:id
pub async fn handle_admin_update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(user_id): PathParams<Uuid>,
    JsonBody(request): JsonBody<AdminUpdateUserRequest>,
) -> Result<Json<WithHistory<UserView>>> {
    Ok(Json(
        state
            .services
            .user_service
            .admin_update(&auth.actor, user_id, request)
            .await?,
    ))
}

/// DELETE /users/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParams(user_id): PathParams<Uuid>,
) -> Result<Json<Value>> {
    state.services.user_service.delete(&auth.actor, user_id).await?;
    Ok(Json(json!({ "message": "User removed" })))
}
