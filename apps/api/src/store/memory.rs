use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ProjectFilter, Store, StoreError, UpsertOutcome};
use crate::models::feedback::{FeedbackItem, FeedbackStatus};
use crate::models::ikigai::IkigaiData;
use crate::models::profile::{Role, UserProfile};
use crate::models::project::Project;

#[derive(Default)]
struct Tables {
    profiles: HashMap<Uuid, UserProfile>,
    projects: HashMap<Uuid, Project>,
    feedback: HashMap<Uuid, FeedbackItem>,
    ikigai: HashMap<String, IkigaiData>,
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ikigai_count(&self) -> usize {
        self.tables.read().await.ikigai.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .profiles
            .values()
            .any(|p| p.id == profile.id || p.email.eq_ignore_ascii_case(&profile.email))
        {
            return Err(StoreError::Conflict(format!(
                "profile for {} already exists",
                profile.email
            )));
        }
        tables.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.profiles.get_mut(&profile.id) {
            Some(existing) => {
                *existing = profile.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(profile) = tables.profiles.remove(&id) else {
            return Ok(false);
        };
        tables.projects.retain(|_, p| p.owner_id != id);
        tables
            .feedback
            .retain(|_, f| f.student_id != id && f.mentor_id != id);
        tables.ikigai.remove(&profile.email.to_lowercase());
        Ok(true)
    }

    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<UserProfile>, StoreError> {
        let tables = self.tables.read().await;
        let mut profiles: Vec<_> = tables
            .profiles
            .values()
            .filter(|p| role.map_or(true, |r| p.role == r))
            .cloned()
            .collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }

    async fn set_mentor_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<Option<UserProfile>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.profiles.get_mut(&id).map(|p| {
            p.mentor_approved = Some(approved);
            p.clone()
        }))
    }

    async fn list_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let tables = self.tables.read().await;
        let mut projects: Vec<_> = tables
            .projects
            .values()
            .filter(|p| filter.owner_id.map_or(true, |o| p.owner_id == o))
            .filter(|p| filter.status.map_or(true, |s| p.status == s))
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        Ok(self.tables.read().await.projects.get(&id).cloned())
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.projects.get_mut(&project.id) {
            Some(existing) => {
                *existing = project.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.projects.remove(&id).is_some())
    }

    async fn list_feedback_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<FeedbackItem>, StoreError> {
        let tables = self.tables.read().await;
        let mut items: Vec<_> = tables
            .feedback
            .values()
            .filter(|f| f.student_id == student_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn get_feedback(&self, id: Uuid) -> Result<Option<FeedbackItem>, StoreError> {
        Ok(self.tables.read().await.feedback.get(&id).cloned())
    }

    async fn insert_feedback(&self, item: &FeedbackItem) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .feedback
            .insert(item.id, item.clone());
        Ok(())
    }

    async fn set_feedback_status(
        &self,
        id: Uuid,
        status: FeedbackStatus,
    ) -> Result<Option<FeedbackItem>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.feedback.get_mut(&id).map(|f| {
            f.status = status;
            f.clone()
        }))
    }

    async fn get_ikigai(&self, email: &str) -> Result<Option<IkigaiData>, StoreError> {
        Ok(self.tables.read().await.ikigai.get(email).cloned())
    }

    async fn upsert_ikigai(
        &self,
        email: &str,
        data: &IkigaiData,
    ) -> Result<(IkigaiData, UpsertOutcome), StoreError> {
        let mut tables = self.tables.write().await;
        let outcome = match tables.ikigai.insert(email.to_string(), data.clone()) {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Created,
        };
        Ok((data.clone(), outcome))
    }

    async fn delete_ikigai(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.ikigai.remove(email).is_some())
    }
}
