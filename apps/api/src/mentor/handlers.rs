//! Mentor directory and mentor feedback.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extract::CurrentUser;
use crate::auth::guard::MENTOR_ONLY;
use crate::errors::AppError;
use crate::models::feedback::{FeedbackItem, FeedbackStatus};
use crate::models::profile::{Role, UserProfile};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MentorCard {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub expertise: Vec<String>,
    pub available: bool,
}

impl From<UserProfile> for MentorCard {
    fn from(p: UserProfile) -> Self {
        Self {
            name: p.display_name().to_string(),
            id: p.id,
            avatar_url: p.avatar_url,
            expertise: p.expertise.unwrap_or_default(),
            available: p.available.unwrap_or(false),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedbackView {
    #[serde(flatten)]
    pub item: FeedbackItem,
    pub mentor_initials: String,
}

impl From<FeedbackItem> for FeedbackView {
    fn from(item: FeedbackItem) -> Self {
        Self {
            mentor_initials: item.mentor_initials(),
            item,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateFeedbackRequest {
    pub student_id: Uuid,
    pub message: String,
}

/// GET /api/mentors
/// Approved mentors only.
pub async fn handle_list_mentors(
    State(state): State<AppState>,
    CurrentUser(_session): CurrentUser,
) -> Result<Json<Vec<MentorCard>>, AppError> {
    let mentors = state
        .store
        .list_profiles(Some(Role::Mentor))
        .await?
        .into_iter()
        .filter(|p| p.mentor_approved == Some(true))
        .map(MentorCard::from)
        .collect();
    Ok(Json(mentors))
}

/// GET /api/feedback
/// The caller's received feedback, newest first.
pub async fn handle_list_feedback(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<Vec<FeedbackView>>, AppError> {
    let items = state
        .store
        .list_feedback_for_student(session.profile.id)
        .await?;
    Ok(Json(items.into_iter().map(FeedbackView::from).collect()))
}

/// POST /api/feedback
/// Approved mentors leave feedback for a student.
pub async fn handle_create_feedback(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackView>), AppError> {
    user.require_role(MENTOR_ONLY)?;
    let CurrentUser(session) = user;
    if session.profile.mentor_approved != Some(true) {
        return Err(AppError::Forbidden);
    }
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message is required".into()));
    }

    let student = state
        .store
        .get_profile(req.student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student {} not found", req.student_id)))?;
    if student.role != Role::Student {
        return Err(AppError::Validation("feedback can only be sent to students".into()));
    }

    let item = FeedbackItem {
        id: Uuid::new_v4(),
        mentor_id: session.profile.id,
        mentor_name: session.profile.display_name().to_string(),
        student_id: student.id,
        message: message.to_string(),
        created_at: Utc::now(),
        status: FeedbackStatus::Pending,
    };
    state.store.insert_feedback(&item).await?;
    info!("Mentor {} left feedback {} for {}", item.mentor_id, item.id, item.student_id);
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// PATCH /api/feedback/:id/resolve
/// The recipient or the author marks feedback as resolved.
pub async fn handle_resolve_feedback(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FeedbackView>, AppError> {
    let item = state
        .store
        .get_feedback(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Feedback {id} not found")))?;
    let me = session.profile.id;
    if item.student_id != me && item.mentor_id != me {
        return Err(AppError::Forbidden);
    }
    let item = state
        .store
        .set_feedback_status(id, FeedbackStatus::Resolved)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Feedback {id} not found")))?;
    Ok(Json(item.into()))
}
