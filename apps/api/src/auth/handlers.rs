use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::extract::{CurrentUser, MaybeSession};
use crate::auth::guard::{self, GuardDecision, PageAccess};
use crate::auth::session::SessionState;
use crate::errors::AppError;
use crate::models::profile::UserProfile;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub profile: UserProfile,
    pub landing_page: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionResponse {
    Loading,
    SignedOut,
    SignedIn {
        email: String,
        profile: UserProfile,
    },
}

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub path: String,
    #[serde(flatten)]
    pub decision: GuardDecision,
}

/// POST /api/auth/sign-in
pub async fn handle_sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("email and password are required".into()));
    }
    let session = state.sessions.sign_in(req.email.trim(), &req.password).await?;
    Ok(Json(SignInResponse {
        landing_page: guard::landing_page(session.role()),
        access_token: session.access_token,
        profile: session.profile,
    }))
}

/// POST /api/auth/sign-out
pub async fn handle_sign_out(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<StatusCode, AppError> {
    state.sessions.sign_out(&session.access_token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/session
pub async fn handle_get_session(MaybeSession(session_state): MaybeSession) -> Json<SessionResponse> {
    Json(match session_state {
        SessionState::Loading => SessionResponse::Loading,
        SessionState::SignedOut => SessionResponse::SignedOut,
        SessionState::SignedIn(session) => SessionResponse::SignedIn {
            email: session.user.email,
            profile: session.profile,
        },
    })
}

/// GET /api/navigate?path=/admin
pub async fn handle_navigate(
    Query(query): Query<NavigateQuery>,
    MaybeSession(session_state): MaybeSession,
) -> Result<Json<NavigateResponse>, AppError> {
    let decision = match guard::page_access(&query.path) {
        Some(PageAccess::Public) => GuardDecision::Render,
        Some(PageAccess::Protected(roles)) => guard::evaluate(roles, &session_state),
        None => return Err(AppError::NotFound(format!("No page at {}", query.path))),
    };
    Ok(Json(NavigateResponse {
        path: query.path,
        decision,
    }))
}
