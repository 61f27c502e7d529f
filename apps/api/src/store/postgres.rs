use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{ProjectFilter, Store, StoreError, UpsertOutcome};
use crate::models::feedback::{FeedbackItem, FeedbackStatus};
use crate::models::ikigai::IkigaiData;
use crate::models::profile::{Role, UserProfile};
use crate::models::project::Project;

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    full_name: Option<String>,
    role: String,
    phase: i32,
    mentor_approved: Option<bool>,
    avatar_url: Option<String>,
    expertise: Option<Vec<String>>,
    available: Option<bool>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            role: row.role.parse().map_err(StoreError::Corrupt)?,
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            phase: row.phase,
            mentor_approved: row.mentor_approved,
            avatar_url: row.avatar_url,
            expertise: row.expertise,
            available: row.available,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: Uuid,
    owner_id: Uuid,
    title: String,
    description: String,
    status: String,
    skills: Vec<String>,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    progress: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            description: row.description,
            skills: row.skills,
            start_date: row.start_date,
            end_date: row.end_date,
            progress: row.progress,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct FeedbackRow {
    id: Uuid,
    mentor_id: Uuid,
    mentor_name: String,
    student_id: Uuid,
    message: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<FeedbackRow> for FeedbackItem {
    type Error = StoreError;

    fn try_from(row: FeedbackRow) -> Result<Self, Self::Error> {
        Ok(FeedbackItem {
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            id: row.id,
            mentor_id: row.mentor_id,
            mentor_name: row.mentor_name,
            student_id: row.student_id,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct IkigaiRow {
    what_i_love: Vec<String>,
    what_im_good_at: Vec<String>,
    what_the_world_needs: Vec<String>,
    what_i_can_be_paid_for: Vec<String>,
    summary: Option<String>,
}

impl From<IkigaiRow> for IkigaiData {
    fn from(row: IkigaiRow) -> Self {
        IkigaiData {
            what_i_love: row.what_i_love,
            what_im_good_at: row.what_im_good_at,
            what_the_world_needs: row.what_the_world_needs,
            what_i_can_be_paid_for: row.what_i_can_be_paid_for,
            summary: row.summary,
        }
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[derive(Debug, FromRow)]
struct UpsertedIkigaiRow {
    #[sqlx(flatten)]
    entry: IkigaiRow,
    inserted: bool,
}

const IKIGAI_COLUMNS: &str =
    "what_i_love, what_im_good_at, what_the_world_needs, what_i_can_be_paid_for, summary";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_profile(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(UserProfile::try_from).transpose()
    }

    async fn insert_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles
                (id, email, full_name, role, phase, mentor_approved, avatar_url,
                 expertise, available, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(profile.id)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(profile.phase)
        .bind(profile.mentor_approved)
        .bind(&profile.avatar_url)
        .bind(&profile.expertise)
        .bind(profile.available)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "profile for {} already exists",
                profile.email
            )));
        }
        info!("Created profile {} ({})", profile.id, profile.role);
        Ok(())
    }

    async fn update_profile(&self, profile: &UserProfile) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET full_name = $2, role = $3, phase = $4, mentor_approved = $5,
                avatar_url = $6, expertise = $7, available = $8
            WHERE id = $1
            "#,
        )
        .bind(profile.id)
        .bind(&profile.full_name)
        .bind(profile.role.as_str())
        .bind(profile.phase)
        .bind(profile.mentor_approved)
        .bind(&profile.avatar_url)
        .bind(&profile.expertise)
        .bind(profile.available)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        let email: Option<String> =
            sqlx::query_scalar("DELETE FROM profiles WHERE id = $1 RETURNING email")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(email) = email else {
            return Ok(false);
        };
        // projects and feedback cascade through their foreign keys;
        // ikigai entries are keyed by the lowercased email
        sqlx::query("DELETE FROM ikigai_entries WHERE email = $1")
            .bind(email.to_lowercase())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        info!("Deleted profile {id}");
        Ok(true)
    }

    async fn list_profiles(&self, role: Option<Role>) -> Result<Vec<UserProfile>, StoreError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT * FROM profiles
            WHERE ($1::text IS NULL OR role = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(role.map(|r| r.as_str()))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn set_mentor_approval(
        &self,
        id: Uuid,
        approved: bool,
    ) -> Result<Option<UserProfile>, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "UPDATE profiles SET mentor_approved = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(approved)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserProfile::try_from).transpose()
    }

    async fn list_projects(&self, filter: ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            r#"
            SELECT * FROM projects
            WHERE ($1::uuid IS NULL OR owner_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.owner_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        let row: Option<ProjectRow> = sqlx::query_as("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Project::try_from).transpose()
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO projects
                (id, owner_id, title, description, status, skills,
                 start_date, end_date, progress, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(project.id)
        .bind(project.owner_id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(&project.skills)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.progress)
        .bind(project.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET title = $2, description = $3, status = $4, skills = $5,
                start_date = $6, end_date = $7, progress = $8
            WHERE id = $1
            "#,
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.status.as_str())
        .bind(&project.skills)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.progress)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_feedback_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<FeedbackItem>, StoreError> {
        let rows: Vec<FeedbackRow> = sqlx::query_as(
            "SELECT * FROM mentor_feedback WHERE student_id = $1 ORDER BY created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn get_feedback(&self, id: Uuid) -> Result<Option<FeedbackItem>, StoreError> {
        let row: Option<FeedbackRow> =
            sqlx::query_as("SELECT * FROM mentor_feedback WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(FeedbackItem::try_from).transpose()
    }

    async fn insert_feedback(&self, item: &FeedbackItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO mentor_feedback
                (id, mentor_id, mentor_name, student_id, message, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.id)
        .bind(item.mentor_id)
        .bind(&item.mentor_name)
        .bind(item.student_id)
        .bind(&item.message)
        .bind(item.status.as_str())
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_feedback_status(
        &self,
        id: Uuid,
        status: FeedbackStatus,
    ) -> Result<Option<FeedbackItem>, StoreError> {
        let row: Option<FeedbackRow> = sqlx::query_as(
            "UPDATE mentor_feedback SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(FeedbackItem::try_from).transpose()
    }

    async fn get_ikigai(&self, email: &str) -> Result<Option<IkigaiData>, StoreError> {
        let row: Option<IkigaiRow> = sqlx::query_as(&format!(
            "SELECT {IKIGAI_COLUMNS} FROM ikigai_entries WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(IkigaiData::from))
    }

    async fn upsert_ikigai(
        &self,
        email: &str,
        data: &IkigaiData,
    ) -> Result<(IkigaiData, UpsertOutcome), StoreError> {
        // xmax is 0 only for a freshly inserted tuple
        let row: UpsertedIkigaiRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO ikigai_entries (email, {IKIGAI_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO UPDATE
            SET what_i_love = EXCLUDED.what_i_love,
                what_im_good_at = EXCLUDED.what_im_good_at,
                what_the_world_needs = EXCLUDED.what_the_world_needs,
                what_i_can_be_paid_for = EXCLUDED.what_i_can_be_paid_for,
                summary = EXCLUDED.summary,
                updated_at = NOW()
            RETURNING {IKIGAI_COLUMNS}, (xmax = 0) AS inserted
            "#
        ))
        .bind(email)
        .bind(&data.what_i_love)
        .bind(&data.what_im_good_at)
        .bind(&data.what_the_world_needs)
        .bind(&data.what_i_can_be_paid_for)
        .bind(&data.summary)
        .fetch_one(&self.pool)
        .await?;

        let outcome = if row.inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };
        info!("Saved ikigai entry for {email} ({outcome:?})");
        Ok((row.entry.into(), outcome))
    }

    async fn delete_ikigai(&self, email: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM ikigai_entries WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
