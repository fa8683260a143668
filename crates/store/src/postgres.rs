//! PostgreSQL backends for profiles and session logs.
//!
//! `PgProfileStore` reads the application-owned profile schema (`users`,
//! `projects`, `educations`, `experiences`, `skills`); each root fetch
//! eagerly loads all four sub-record collections. `PgSessionStore` owns the
//! `chat_messages` append-only log and migrates it on construction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use talentscout_core::action::StructuredFilters;
use talentscout_core::capabilities::{ProfileStore, SessionStore, StructuredFilterStore};
use talentscout_core::error::StoreError;
use talentscout_core::message::{Message, Role, SessionId};
use talentscout_core::profile::{Education, Experience, Profile, Project, Skill};
use tracing::{debug, info};

/// Connect a pool with the given size. Shared by both stores.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await
        .map_err(|e| StoreError::Connection(format!("Failed to connect to Postgres: {e}")))
}

/// Profile lookup and structured filtering over the relational schema.
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn query_err(e: sqlx::Error) -> StoreError {
        StoreError::QueryFailed(e.to_string())
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_by_id(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        debug!(%user_id, "Fetching profile");

        let root = sqlx::query(
            "SELECT user_id, first_name, last_name, email, pfp_url FROM users WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::query_err)?;

        let Some(root) = root else {
            debug!(%user_id, "Profile not found");
            return Ok(None);
        };

        let projects = sqlx::query(
            r#"
            SELECT project_id, user_id, project_name, project_description,
                   github_url, project_url, project_start_date, project_end_date
            FROM projects WHERE user_id = $1 ORDER BY project_start_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::query_err)?
        .into_iter()
        .map(|row| Project {
            project_id: row.get("project_id"),
            user_id: row.get("user_id"),
            project_name: row.get("project_name"),
            project_description: row
                .try_get::<Option<String>, _>("project_description")
                .ok()
                .flatten()
                .unwrap_or_default(),
            github_url: row.try_get("github_url").ok().flatten(),
            project_url: row.try_get("project_url").ok().flatten(),
            start_date: row.try_get::<Option<NaiveDate>, _>("project_start_date").ok().flatten(),
            end_date: row.try_get::<Option<NaiveDate>, _>("project_end_date").ok().flatten(),
        })
        .collect();

        let educations = sqlx::query(
            r#"
            SELECT education_id, user_id, institution_name, degree_type, degree_name,
                   enrollment_date, graduation_date
            FROM educations WHERE user_id = $1 ORDER BY enrollment_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::query_err)?
        .into_iter()
        .map(|row| Education {
            education_id: row.get("education_id"),
            user_id: row.get("user_id"),
            institution_name: row.get("institution_name"),
            degree_type: row.get("degree_type"),
            degree_name: row.get("degree_name"),
            enrollment_date: row.try_get::<Option<NaiveDate>, _>("enrollment_date").ok().flatten(),
            graduation_date: row.try_get::<Option<NaiveDate>, _>("graduation_date").ok().flatten(),
        })
        .collect();

        let experiences = sqlx::query(
            r#"
            SELECT experience_id, user_id, company_name, job_title, location,
                   experience_description, start_date, end_date
            FROM experiences WHERE user_id = $1 ORDER BY start_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::query_err)?
        .into_iter()
        .map(|row| Experience {
            experience_id: row.get("experience_id"),
            user_id: row.get("user_id"),
            company_name: row.get("company_name"),
            job_title: row.get("job_title"),
            location: row
                .try_get::<Option<String>, _>("location")
                .ok()
                .flatten()
                .unwrap_or_default(),
            experience_description: row
                .try_get::<Option<String>, _>("experience_description")
                .ok()
                .flatten()
                .unwrap_or_default(),
            start_date: row.try_get::<Option<NaiveDate>, _>("start_date").ok().flatten(),
            end_date: row.try_get::<Option<NaiveDate>, _>("end_date").ok().flatten(),
        })
        .collect();

        let skills = sqlx::query(
            "SELECT skill_id, user_id, skill_name FROM skills WHERE user_id = $1 ORDER BY skill_name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::query_err)?
        .into_iter()
        .map(|row| Skill {
            skill_id: row.get("skill_id"),
            user_id: row.get("user_id"),
            skill_name: row.get("skill_name"),
        })
        .collect();

        Ok(Some(Profile {
            user_id: root.get("user_id"),
            first_name: root.get("first_name"),
            last_name: root.get("last_name"),
            email: root.get("email"),
            pfp_url: root.try_get("pfp_url").ok().flatten(),
            projects,
            educations,
            experiences,
            skills,
        }))
    }
}

#[async_trait]
impl StructuredFilterStore for PgProfileStore {
    async fn filter_ids(
        &self,
        filters: &StructuredFilters,
        id_scope: &[String],
    ) -> Result<Vec<String>, StoreError> {
        if id_scope.is_empty() {
            return Ok(vec![]);
        }

        // One EXISTS sub-query per present filter, AND-conjoined and
        // restricted to the supplied id set. $1 is always the id scope, so
        // each new bind takes parameter number binds.len() + 2.
        let mut conditions: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if let Some(location) = &filters.location {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM experiences e WHERE e.user_id = u.user_id AND e.location ILIKE ${})",
                binds.len() + 2
            ));
            binds.push(format!("%{location}%"));
        }

        if let Some(company) = &filters.company_name {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM experiences e WHERE e.user_id = u.user_id AND e.company_name ILIKE ${})",
                binds.len() + 2
            ));
            binds.push(format!("%{company}%"));
        }

        if let Some(title) = &filters.job_title {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM experiences e WHERE e.user_id = u.user_id AND e.job_title ILIKE ${})",
                binds.len() + 2
            ));
            binds.push(format!("%{title}%"));
        }

        if let Some(skill) = &filters.skill {
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM skills s WHERE s.user_id = u.user_id AND lower(s.skill_name) = lower(${}))",
                binds.len() + 2
            ));
            binds.push(skill.clone());
        }

        let mut sql =
            String::from("SELECT DISTINCT u.user_id FROM users u WHERE u.user_id = ANY($1)");
        for condition in &conditions {
            sql.push_str(" AND ");
            sql.push_str(condition);
        }

        debug!(
            conditions = conditions.len(),
            scope = id_scope.len(),
            "Running structured filter query"
        );

        let mut query = sqlx::query_scalar::<_, String>(&sql).bind(id_scope);
        for value in binds {
            query = query.bind(value);
        }

        query.fetch_all(&self.pool).await.map_err(Self::query_err)
    }
}

/// Append-only session log over Postgres.
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create the store and run the session-log migration.
    pub async fn new(pool: PgPool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        info!("Postgres session store initialized");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chat_messages (
                id         TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::WriteFailed(format!("chat_messages table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(session_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::WriteFailed(format!("session index: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load_history(&self, session_id: &SessionId) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, role, content, created_at
            FROM chat_messages
            WHERE session_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(&session_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let role: String = row.get("role");
                let role: Role = role
                    .parse()
                    .map_err(|e: String| StoreError::QueryFailed(e))?;
                Ok(Message {
                    id: row.get("id"),
                    role,
                    content: row.get("content"),
                    created_at: row.get::<DateTime<Utc>, _>("created_at"),
                })
            })
            .collect()
    }

    async fn append_message(
        &self,
        session_id: &SessionId,
        message: &Message,
    ) -> Result<(), StoreError> {
        // Single statement — atomic by itself, no partial write possible.
        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, session_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&message.id)
        .bind(&session_id.0)
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        debug!(session = %session_id, role = message.role.as_str(), "Appended message");
        Ok(())
    }
}
