//! Persistence for profiles, projects, mentor feedback and Ikigai entries.
//!
//! Handlers only ever see `Arc<dyn Store>`. `PgStore` backs production;
//! `MemoryStore` backs tests and database-less local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::feedback::{FeedbackItem, FeedbackStatus};
use crate::models::ikigai::IkigaiData;
use crate::models::profile::{Role, UserProfile};
use crate::models::project::{Project, ProjectStatus};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Whether an Ikigai save created a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectFilter {
    pub owner_id: Option<Uuid>,
    pub status: Option<ProjectStatus>,
}

#[async_trait]
pub trait Store: Send + Sync {
    // profiles
    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError>;
    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;
    /// Returns `false` when no profile with that id exists.
    async fn update_profile(&self, profile: &UserProfile) -> Result<bool, StoreError>;
    /// Deletes the profile and everything owned by it (projects, feedback, Ikigai entry).
    async fn delete_profile(&self, id: Uuid) -> Result<bool, StoreError>;
    /// Newest first.
    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<UserProfile>, StoreError>;
    async fn set_mentor_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<Option<UserProfile>, StoreError>;

    // projects
    /// Newest first.
    async fn list_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError>;
    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError>;
    async fn insert_project(&self, project: &Project) -> Result<(), StoreError>;
    async fn update_project(&self, project: &Project) -> Result<bool, StoreError>;
    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError>;

    // mentor feedback
    /// Newest first.
    async fn list_feedback_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<FeedbackItem>, StoreError>;
    async fn get_feedback(&self, id: Uuid) -> Result<Option<FeedbackItem>, StoreError>;
    async fn insert_feedback(&self, item: &FeedbackItem) -> Result<(), StoreError>;
    async fn set_feedback_status(
        &self,
        id: Uuid,
        status: FeedbackStatus,
    ) -> Result<Option<FeedbackItem>, StoreError>;

    // ikigai entries, keyed by email
    async fn get_ikigai(&self, email: &str) -> Result<Option<IkigaiData>, StoreError>;
    /// Creates the entry when none exists for `email`, otherwise replaces it in place.
    async fn upsert_ikigai(
        &self,
        email: &str,
        data: &IkigaiData,
    ) -> Result<(IkigaiData, UpsertOutcome), StoreError>;
    async fn delete_ikigai(&self, email: &str) -> Result<bool, StoreError>;
}
