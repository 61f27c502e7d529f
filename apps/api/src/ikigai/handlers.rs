//! Axum route handlers for Ikigai entries, the diagram and the dialogue.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::extract::CurrentUser;
use crate::auth::session::Session;
use crate::errors::AppError;
use crate::ikigai::chart::render_svg;
use crate::ikigai::dialogue::{AnswerOutcome, DialogueView};
use crate::models::ikigai::{IkigaiCategory, IkigaiData};
use crate::models::profile::Role;
use crate::state::AppState;
use crate::store::{Store, UpsertOutcome};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SaveIkigaiRequest {
    pub email: String,
    #[serde(flatten)]
    pub data: IkigaiData,
}

#[derive(Debug, Serialize)]
pub struct SaveIkigaiResponse {
    pub email: String,
    #[serde(flatten)]
    pub data: IkigaiData,
    pub outcome: UpsertOutcome,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSectionRequest {
    pub email: String,
    pub section: IkigaiCategory,
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub active: Option<IkigaiCategory>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub outcome: AnswerOutcome,
    pub dialogue: DialogueView,
}

// ────────────────────────────────────────────────────────────────────────────
// Access rules
// ────────────────────────────────────────────────────────────────────────────

fn is_owner(session: &Session, email: &str) -> bool {
    session.user.email.eq_ignore_ascii_case(email)
}

/// Owners read their own entry; mentors and admins may read anyone's.
fn ensure_can_read(session: &Session, email: &str) -> Result<(), AppError> {
    match session.role() {
        Role::Mentor | Role::Admin => Ok(()),
        Role::Student if is_owner(session, email) => Ok(()),
        Role::Student => Err(AppError::Forbidden),
    }
}

/// Only the owner (or an admin) changes an entry.
fn ensure_can_write(session: &Session, email: &str) -> Result<(), AppError> {
    match session.role() {
        Role::Admin => Ok(()),
        Role::Student | Role::Mentor if is_owner(session, email) => Ok(()),
        Role::Student | Role::Mentor => Err(AppError::Forbidden),
    }
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }
    Ok(email.to_lowercase())
}

fn save_status(outcome: UpsertOutcome) -> StatusCode {
    match outcome {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Updated => StatusCode::OK,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Entry handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/ikigai/:email
/// A missing entry is returned as an empty one rather than a 404.
pub async fn handle_get_ikigai(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(email): Path<String>,
) -> Result<Json<IkigaiData>, AppError> {
    let email = normalize_email(&email)?;
    ensure_can_read(&session, &email)?;
    let data = state.store.get_ikigai(&email).await?.unwrap_or_default();
    Ok(Json(data))
}

/// POST /api/ikigai
/// Upserts the whole entry keyed by email.
pub async fn handle_save_ikigai(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<SaveIkigaiRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&req.email)?;
    ensure_can_write(&session, &email)?;
    let (data, outcome) = state.store.upsert_ikigai(&email, &req.data).await?;
    Ok((
        save_status(outcome),
        Json(SaveIkigaiResponse {
            email,
            data,
            outcome,
        }),
    ))
}

/// PATCH /api/ikigai/section
/// Replaces one category's list, creating the entry if needed.
pub async fn handle_update_section(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<UpdateSectionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&req.email)?;
    ensure_can_write(&session, &email)?;

    let mut data = state.store.get_ikigai(&email).await?.unwrap_or_default();
    *data.items_mut(req.section) = req
        .items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();

    let (data, outcome) = state.store.upsert_ikigai(&email, &data).await?;
    Ok((
        save_status(outcome),
        Json(SaveIkigaiResponse {
            email,
            data,
            outcome,
        }),
    ))
}

/// DELETE /api/ikigai/:email
pub async fn handle_delete_ikigai(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(email): Path<String>,
) -> Result<StatusCode, AppError> {
    let email = normalize_email(&email)?;
    ensure_can_write(&session, &email)?;
    if !state.store.delete_ikigai(&email).await? {
        return Err(AppError::NotFound(format!("No Ikigai entry for {email}")));
    }
    info!("Deleted ikigai entry for {email}");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/ikigai/:email/chart.svg
pub async fn handle_chart(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(email): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<impl IntoResponse, AppError> {
    let email = normalize_email(&email)?;
    ensure_can_read(&session, &email)?;
    let data = state.store.get_ikigai(&email).await?.unwrap_or_default();
    Ok((
        [(header::CONTENT_TYPE, "image/svg+xml")],
        render_svg(&data, query.active),
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Dialogue handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/ikigai/dialogue
pub async fn handle_start_dialogue(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Json<DialogueView> {
    Json(state.dialogues.start_or_resume(session.profile.id).await)
}

/// GET /api/ikigai/dialogue
pub async fn handle_get_dialogue(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<DialogueView>, AppError> {
    state
        .dialogues
        .get(session.profile.id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No Ikigai dialogue in progress".into()))
}

/// Writes the one category an answer changed, plus the summary once the
/// dialogue completes. Other categories of the stored entry are kept.
async fn persist_answer(
    store: &dyn Store,
    email: &str,
    outcome: &AnswerOutcome,
) -> Result<(), AppError> {
    let Some(update) = outcome.update() else {
        return Ok(());
    };
    let mut data = store.get_ikigai(email).await?.unwrap_or_default();
    *data.items_mut(update.category) = update.items.clone();
    if let AnswerOutcome::Completed { summary, .. } = outcome {
        data.summary = Some(summary.clone());
    }
    store.upsert_ikigai(email, &data).await?;
    Ok(())
}

/// POST /api/ikigai/dialogue/answer
/// Each accepted answer is persisted before the dialogue moves on.
pub async fn handle_answer(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let store = state.store.clone();
    let email = session.user.email.to_lowercase();
    let (outcome, dialogue) = state
        .dialogues
        .answer(session.profile.id, &req.answer, move |outcome| async move {
            persist_answer(store.as_ref(), &email, &outcome).await
        })
        .await
        .ok_or_else(|| AppError::NotFound("No Ikigai dialogue in progress".into()))??;

    match &outcome {
        AnswerOutcome::AlreadyComplete => {
            return Err(AppError::Conflict(
                "The Ikigai dialogue is already complete".into(),
            ))
        }
        AnswerOutcome::Completed { .. } => {
            info!("User {} completed the Ikigai dialogue", session.profile.id);
        }
        AnswerOutcome::Ignored
        | AnswerOutcome::NextQuestion { .. }
        | AnswerOutcome::NextPhase { .. } => {}
    }
    Ok(Json(AnswerResponse { outcome, dialogue }))
}

/// DELETE /api/ikigai/dialogue
pub async fn handle_reset_dialogue(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> StatusCode {
    state.dialogues.reset(session.profile.id).await;
    StatusCode::NO_CONTENT
}
