//! Admin-only views over users, mentors and projects.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::CurrentUser;
use crate::auth::guard::ADMIN_ONLY;
use crate::errors::AppError;
use crate::models::profile::{Role, UserProfile};
use crate::models::project::Project;
use crate::state::AppState;
use crate::store::ProjectFilter;

#[derive(Debug, Deserialize)]
pub struct MentorApproval {
    pub approved: bool,
}

/// GET /api/admin/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    user.require_role(ADMIN_ONLY)?;
    Ok(Json(state.store.list_profiles(None).await?))
}

/// GET /api/admin/mentors
pub async fn handle_list_mentors(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    user.require_role(ADMIN_ONLY)?;
    Ok(Json(state.store.list_profiles(Some(Role::Mentor)).await?))
}

/// GET /api/admin/projects
pub async fn handle_list_projects(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Project>>, AppError> {
    user.require_role(ADMIN_ONLY)?;
    Ok(Json(state.store.list_projects(ProjectFilter::default()).await?))
}

/// PATCH /api/admin/mentors/:id/approval
pub async fn handle_set_mentor_approval(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<MentorApproval>,
) -> Result<Json<UserProfile>, AppError> {
    user.require_role(ADMIN_ONLY)?;

    let target = state
        .store
        .get_profile(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    if target.role != Role::Mentor {
        return Err(AppError::Validation(format!("User {id} is not a mentor")));
    }

    let profile = state
        .store
        .set_mentor_approval(id, req.approved)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;
    state.sessions.refresh_profile(&profile).await;
    info!(
        "Mentor {id} {}",
        if req.approved { "approved" } else { "unapproved" }
    );
    Ok(Json(profile))
}
