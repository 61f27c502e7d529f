use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three account roles. Every role-dependent branch in the crate matches
/// on this exhaustively.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Mentor,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Mentor, Role::Admin];

    /// Parses the role stored in auth metadata. Unknown or missing values
    /// fall back to `Student`.
    pub fn from_metadata(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("mentor") => Role::Mentor,
            Some(v) if v.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::Student,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Mentor => "mentor",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "mentor" => Ok(Role::Mentor),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_MENTOR_EXPERTISE: [&str; 2] = ["Career Guidance", "Technical Mentoring"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    /// Onboarding phase, 1 through 4.
    pub phase: i32,
    pub mentor_approved: Option<bool>,
    pub avatar_url: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub available: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Builds the profile created on a user's first authentication.
    pub fn first_login(
        id: Uuid,
        email: &str,
        full_name: Option<&str>,
        role: Role,
        avatar_url: Option<&str>,
    ) -> Self {
        let mentor = role == Role::Mentor;
        Self {
            id,
            email: email.to_string(),
            full_name: Some(full_name.unwrap_or("User").to_string()),
            role,
            phase: 1,
            mentor_approved: mentor.then_some(true),
            avatar_url: avatar_url.map(str::to_string),
            expertise: mentor.then(|| {
                DEFAULT_MENTOR_EXPERTISE
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            available: mentor.then_some(true),
            created_at: Utc::now(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or("User")
    }
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phase: Option<i32>,
    pub avatar_url: Option<String>,
    pub expertise: Option<Vec<String>>,
    pub available: Option<bool>,
}

pub const PHASE_RANGE: std::ops::RangeInclusive<i32> = 1..=4;

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.full_name {
            if name.trim().is_empty() {
                return Err("full_name must not be blank".to_string());
            }
        }
        if let Some(phase) = self.phase {
            if !PHASE_RANGE.contains(&phase) {
                return Err(format!("phase must be within 1..=4, got {phase}"));
            }
        }
        Ok(())
    }

    /// Applies the update. Mentor-only fields are ignored for other roles.
    pub fn apply(self, profile: &mut UserProfile) {
        if let Some(name) = self.full_name {
            profile.full_name = Some(name.trim().to_string());
        }
        if let Some(phase) = self.phase {
            profile.phase = phase;
        }
        if let Some(url) = self.avatar_url {
            profile.avatar_url = Some(url);
        }
        match profile.role {
            Role::Mentor => {
                if let Some(expertise) = self.expertise {
                    profile.expertise = Some(expertise);
                }
                if let Some(available) = self.available {
                    profile.available = Some(available);
                }
            }
            Role::Student | Role::Admin => {}
        }
    }
}
