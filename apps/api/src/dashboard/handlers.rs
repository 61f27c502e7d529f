use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::extract::CurrentUser;
use crate::dashboard::progress::{overall_progress, phase_progress, PhaseProgress};
use crate::errors::AppError;
use crate::mentor::handlers::FeedbackView;
use crate::models::feedback::FeedbackStatus;
use crate::models::profile::UserProfile;
use crate::models::project::{Project, ProjectStatus};
use crate::state::AppState;
use crate::store::ProjectFilter;

const RECENT_LIMIT: usize = 3;

#[derive(Debug, Serialize, Default)]
pub struct ProjectCounts {
    pub planned: usize,
    pub ongoing: usize,
    pub completed: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub profile: UserProfile,
    pub phases: Vec<PhaseProgress>,
    pub overall_progress: u32,
    pub project_counts: ProjectCounts,
    pub recent_projects: Vec<Project>,
    pub pending_feedback: usize,
    pub recent_feedback: Vec<FeedbackView>,
}

/// GET /api/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let profile = session.profile;
    let projects = state
        .store
        .list_projects(ProjectFilter {
            owner_id: Some(profile.id),
            status: None,
        })
        .await?;
    let ikigai = state
        .store
        .get_ikigai(&session.user.email.to_lowercase())
        .await?
        .unwrap_or_default();
    let feedback = state.store.list_feedback_for_student(profile.id).await?;

    let mut project_counts = ProjectCounts::default();
    for p in &projects {
        match p.status {
            ProjectStatus::Planned => project_counts.planned += 1,
            ProjectStatus::Ongoing => project_counts.ongoing += 1,
            ProjectStatus::Completed => project_counts.completed += 1,
        }
    }

    let phases = phase_progress(profile.phase, &ikigai, &projects);
    let pending_feedback = feedback
        .iter()
        .filter(|f| f.status == FeedbackStatus::Pending)
        .count();

    Ok(Json(DashboardResponse {
        overall_progress: overall_progress(&phases),
        phases,
        project_counts,
        recent_projects: projects.into_iter().take(RECENT_LIMIT).collect(),
        pending_feedback,
        recent_feedback: feedback
            .into_iter()
            .take(RECENT_LIMIT)
            .map(FeedbackView::from)
            .collect(),
        profile,
    }))
}
