use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use crate::auth::extract::CurrentUser;
use crate::errors::AppError;
use crate::models::profile::{ProfileUpdate, UserProfile};
use crate::state::AppState;

/// GET /api/profile
pub async fn handle_get_profile(CurrentUser(session): CurrentUser) -> Json<UserProfile> {
    Json(session.profile)
}

/// PATCH /api/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>, AppError> {
    update.validate().map_err(AppError::Validation)?;

    let mut profile = state
        .store
        .get_profile(session.profile.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;
    update.apply(&mut profile);

    if !state.store.update_profile(&profile).await? {
        return Err(AppError::NotFound("Profile not found".into()));
    }
    state.sessions.refresh_profile(&profile).await;
    Ok(Json(profile))
}

/// DELETE /api/profile
/// Deletes the account's profile and everything it owns, then signs out.
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<StatusCode, AppError> {
    let id = session.profile.id;
    if !state.store.delete_profile(id).await? {
        return Err(AppError::NotFound("Profile not found".into()));
    }
    state.dialogues.reset(id).await;
    state.sessions.forget_user(id).await;
    // the account is already deleted at this point
    if let Err(e) = state.sessions.sign_out(&session.access_token).await {
        warn!("Sign-out after deleting account {id} failed: {e}");
    }
    info!("Account {id} deleted");
    Ok(StatusCode::NO_CONTENT)
}
