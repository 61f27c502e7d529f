use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::CurrentUser;
use crate::auth::session::Session;
use crate::errors::AppError;
use crate::models::profile::Role;
use crate::models::project::{Project, ProjectInput, ProjectStatus};
use crate::state::AppState;
use crate::store::ProjectFilter;

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    /// `all` or absent lists every status.
    pub status: Option<String>,
}

fn parse_status_filter(raw: Option<&str>) -> Result<Option<ProjectStatus>, AppError> {
    match raw {
        None | Some("all") | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(AppError::Validation),
    }
}

/// Owners manage their projects; admins manage all of them.
fn ensure_can_modify(session: &Session, project: &Project) -> Result<(), AppError> {
    match session.role() {
        Role::Admin => Ok(()),
        Role::Student | Role::Mentor if project.owner_id == session.profile.id => Ok(()),
        Role::Student | Role::Mentor => Err(AppError::Forbidden),
    }
}

/// GET /api/projects?status=ongoing
pub async fn handle_list_projects(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<Vec<Project>>, AppError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let projects = state
        .store
        .list_projects(ProjectFilter {
            owner_id: Some(session.profile.id),
            status,
        })
        .await?;
    Ok(Json(projects))
}

/// POST /api/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(input): Json<ProjectInput>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    input.validate().map_err(AppError::Validation)?;
    let project = input.into_project(Uuid::new_v4(), session.profile.id, Utc::now());
    state.store.insert_project(&project).await?;
    info!("Created project {} for {}", project.id, project.owner_id);
    Ok((StatusCode::CREATED, Json(project)))
}

/// PUT /api/projects/:id
pub async fn handle_update_project(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
    Json(input): Json<ProjectInput>,
) -> Result<Json<Project>, AppError> {
    input.validate().map_err(AppError::Validation)?;
    let existing = state
        .store
        .get_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;
    ensure_can_modify(&session, &existing)?;

    let project = input.into_project(existing.id, existing.owner_id, existing.created_at);
    if !state.store.update_project(&project).await? {
        return Err(AppError::NotFound(format!("Project {id} not found")));
    }
    Ok(Json(project))
}

/// DELETE /api/projects/:id
pub async fn handle_delete_project(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let existing = state
        .store
        .get_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;
    ensure_can_modify(&session, &existing)?;
    state.store.delete_project(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
