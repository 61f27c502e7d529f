use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planned,
    Ongoing,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::Ongoing => "ongoing",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(ProjectStatus::Planned),
            "ongoing" => Ok(ProjectStatus::Ongoing),
            "completed" => Ok(ProjectStatus::Completed),
            other => Err(format!("unknown project status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub skills: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Completion percentage, 0..=100.
    pub progress: i32,
    pub created_at: DateTime<Utc>,
}

/// Body of project create and update requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub skills: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub progress: i32,
}

impl ProjectInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if !(0..=100).contains(&self.progress) {
            return Err(format!("progress must be within 0..=100, got {}", self.progress));
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err("end_date must not precede start_date".to_string());
            }
        }
        Ok(())
    }

    pub fn into_project(self, id: Uuid, owner_id: Uuid, created_at: DateTime<Utc>) -> Project {
        Project {
            id,
            owner_id,
            title: self.title.trim().to_string(),
            description: self.description,
            status: self.status,
            skills: self.skills,
            start_date: self.start_date,
            end_date: self.end_date,
            progress: self.progress,
            created_at,
        }
    }
}
