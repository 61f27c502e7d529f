use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::auth::session::{Session, SessionState};
use crate::errors::AppError;
use crate::models::profile::Role;
use crate::state::AppState;

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The session state of the caller, whatever it is.
pub struct MaybeSession(pub SessionState);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts);
        Ok(MaybeSession(state.sessions.resolve(token).await?))
    }
}

/// A signed-in caller. Rejects with 401 when signed out and 503 while the
/// session store is still loading.
pub struct CurrentUser(pub Session);

impl CurrentUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.0.role()) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let MaybeSession(session_state) = MaybeSession::from_request_parts(parts, state).await?;
        match session_state {
            SessionState::SignedIn(session) => Ok(CurrentUser(*session)),
            SessionState::SignedOut => Err(AppError::Unauthorized),
            SessionState::Loading => Err(AppError::SessionLoading),
        }
    }
}
