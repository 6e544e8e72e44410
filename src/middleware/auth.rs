//! Authentication middleware
//!
//! Axum extractors turning an `Authorization: Bearer <token>` header into the
//! calling user.
//!
//! ```rust,ignore
//! async fn handle_profile(AuthUser { actor, .. }: AuthUser) -> Result<Json<UserView>> { ... }
//! async fn handle_list(MaybeAuthUser(caller): MaybeAuthUser) -> Result<Json<Vec<Event>>> { ... }
//! ```

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{debug, warn};

use crate::models::User;
use crate::services::Actor;
use crate::state::AppState;
use crate::utils::errors::{EventHubError, Result};

const NO_TOKEN: &str = "Not authorized, no token";
const BAD_TOKEN: &str = "Not authorized, invalid token";

/// Token from the Authorization header. `Ok(None)` when the header is absent.
fn bearer_token(parts: &Parts) -> Result<Option<&str>> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| EventHubError::Unauthorized(BAD_TOKEN.to_string()))?;
    Ok(Some(token))
}

/// Verify `token` and load its user, who must not be deleted
async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser> {
    let user_id = state
        .services
        .auth_service
        .verify_session_token(token)
        .map_err(|e| {
            debug!(error = %e, "Bearer token rejected");
            EventHubError::Unauthorized(BAD_TOKEN.to_string())
        })?;

    let user = state.db.users.find_active(user_id).await?.ok_or_else(|| {
        warn!(user_id = %user_id, "Token for a missing or deleted user");
        EventHubError::Unauthorized(BAD_TOKEN.to_string())
    })?;

    Ok(AuthUser {
        actor: Actor::from(&user),
        user,
    })
}

/// Authenticated caller; rejects the request with 401 otherwise
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub actor: Actor,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts)?.ok_or_else(|| EventHubError::Unauthorized(NO_TOKEN.to_string()))?;
        authenticate(state, token).await
    }
}

/// Caller of a public endpoint. Anonymous requests yield `None`; a token
/// that is present but invalid is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn actor(&self) -> Option<&Actor> {
        self.0.as_ref().map(|auth| &auth.actor)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = EventHubError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match bearer_token(parts)? {
            Some(token) => Ok(Self(Some(authenticate(state, token).await?))),
            None => Ok(Self(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users/profile");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(None)).unwrap(), None);
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def"))).unwrap(), Some("abc.def"));
        assert!(bearer_token(&parts(Some("Basic dXNlcg=="))).is_err());
        assert!(bearer_token(&parts(Some("Bearer "))).is_err());
    }
}
