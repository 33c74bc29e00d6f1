//! SQLite store.
//!
//! One database file with five tables:
//! - `users`, `stories` — flat records
//! - `assessments` — one row per session, unique `session_id`
//! - `questions` — the frozen question set, keyed by `(assessment_id, position)`
//! - `answers` — append-only submissions
//!
//! An assessment and its questions are written in a single transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inkwell_core::command::NewStory;
use inkwell_core::error::StoreError;
use inkwell_core::model::{Answer, Assessment, AssessmentId, Question, Story, User};
use inkwell_core::session::SessionToken;
use inkwell_core::store::{
    AssessmentStore, NewAnswer, NewAssessment, NewUser, StoryStore, UserStore,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// A durable SQLite record store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `url` and run migrations.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database. In-memory
    /// databases are private to one connection, so the pool is pinned to a
    /// single connection that is never recycled.
    pub async fn new(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite url: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {url}");
        Ok(store)
    }

    /// Create tables and indexes. Idempotent.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        let statements: [(&str, &str); 7] = [
            (
                "users table",
                r#"
                CREATE TABLE IF NOT EXISTS users (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    username    TEXT NOT NULL UNIQUE,
                    email       TEXT NOT NULL UNIQUE,
                    auth_hash   TEXT NOT NULL,
                    created_at  TEXT NOT NULL
                )
                "#,
            ),
            (
                "stories table",
                r#"
                CREATE TABLE IF NOT EXISTS stories (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    title       TEXT NOT NULL,
                    author      TEXT NOT NULL DEFAULT '',
                    content     TEXT NOT NULL,
                    created_at  TEXT NOT NULL
                )
                "#,
            ),
            (
                "assessments table",
                r#"
                CREATE TABLE IF NOT EXISTS assessments (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id     INTEGER NOT NULL,
                    title       TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    session_id  TEXT NOT NULL UNIQUE,
                    created_at  TEXT NOT NULL
                )
                "#,
            ),
            (
                "questions table",
                r#"
                CREATE TABLE IF NOT EXISTS questions (
                    assessment_id  INTEGER NOT NULL REFERENCES assessments(id),
                    position       INTEGER NOT NULL,
                    question_id    INTEGER NOT NULL,
                    prompt         TEXT NOT NULL,
                    correct_answer TEXT NOT NULL,
                    metadata       TEXT NOT NULL DEFAULT '{}',
                    PRIMARY KEY (assessment_id, position)
                )
                "#,
            ),
            (
                "answers table",
                r#"
                CREATE TABLE IF NOT EXISTS answers (
                    id            INTEGER PRIMARY KEY AUTOINCREMENT,
                    assessment_id INTEGER NOT NULL REFERENCES assessments(id),
                    question_id   INTEGER NOT NULL,
                    user_id       INTEGER NOT NULL,
                    answer        TEXT NOT NULL,
                    is_correct    INTEGER NOT NULL,
                    feedback      TEXT NOT NULL,
                    created_at    TEXT NOT NULL
                )
                "#,
            ),
            (
                "answers index",
                "CREATE INDEX IF NOT EXISTS idx_answers_assessment ON answers(assessment_id)",
            ),
            (
                "assessments user index",
                "CREATE INDEX IF NOT EXISTS idx_assessments_user ON assessments(user_id)",
            ),
        ];

        for (label, sql) in statements {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::MigrationFailed(format!("{label}: {e}")))?;
        }

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Map an INSERT failure, surfacing unique violations as conflicts.
    fn insert_error(table: &str, e: sqlx::Error) -> StoreError {
        if let Some(db_err) = e.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Storage(format!("{table} INSERT failed: {e}"))
    }

    fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, StoreError> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::QueryFailed(format!("bad timestamp {value:?}: {e}")))
    }

    fn column<'r, T>(row: &'r sqlx::sqlite::SqliteRow, name: &str) -> Result<T, StoreError>
    where
        T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
    {
        row.try_get(name)
            .map_err(|e| StoreError::QueryFailed(format!("{name} column: {e}")))
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, StoreError> {
        let created_at: String = Self::column(row, "created_at")?;
        Ok(User {
            id: Self::column(row, "id")?,
            username: Self::column(row, "username")?,
            email: Self::column(row, "email")?,
            auth_hash: Self::column(row, "auth_hash")?,
            created_at: Self::parse_timestamp(&created_at)?,
        })
    }

    fn row_to_story(row: &sqlx::sqlite::SqliteRow) -> Result<Story, StoreError> {
        let created_at: String = Self::column(row, "created_at")?;
        Ok(Story {
            id: Self::column(row, "id")?,
            title: Self::column(row, "title")?,
            author: Self::column(row, "author")?,
            content: Self::column(row, "content")?,
            created_at: Self::parse_timestamp(&created_at)?,
        })
    }

    fn row_to_question(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StoreError> {
        let id: i64 = Self::column(row, "question_id")?;
        let metadata: String = Self::column(row, "metadata")?;
        Ok(Question {
            id: u32::try_from(id)
                .map_err(|_| StoreError::QueryFailed(format!("question_id out of range: {id}")))?,
            prompt: Self::column(row, "prompt")?,
            correct_answer: Self::column(row, "correct_answer")?,
            metadata: serde_json::from_str(&metadata)
                .map_err(|e| StoreError::QueryFailed(format!("metadata column: {e}")))?,
        })
    }

    fn row_to_answer(row: &sqlx::sqlite::SqliteRow) -> Result<Answer, StoreError> {
        let question_id: i64 = Self::column(row, "question_id")?;
        let feedback: String = Self::column(row, "feedback")?;
        let created_at: String = Self::column(row, "created_at")?;
        Ok(Answer {
            id: Self::column(row, "id")?,
            assessment_id: Self::column(row, "assessment_id")?,
            question_id: u32::try_from(question_id).map_err(|_| {
                StoreError::QueryFailed(format!("question_id out of range: {question_id}"))
            })?,
            user_id: Self::column(row, "user_id")?,
            answer: Self::column(row, "answer")?,
            is_correct: Self::column(row, "is_correct")?,
            feedback: feedback.parse().map_err(StoreError::QueryFailed)?,
            created_at: Self::parse_timestamp(&created_at)?,
        })
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, email, auth_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.auth_hash)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::insert_error("users", e))?;

        let id = result.last_insert_rowid();
        debug!(user_id = id, "Stored user");
        Ok(User {
            id,
            username: user.username,
            email: user.email,
            auth_hash: user.auth_hash,
            created_at,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("user lookup: {e}")))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("list users: {e}")))?;

        rows.iter().map(Self::row_to_user).collect()
    }
}

#[async_trait]
impl AssessmentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn create_assessment(
        &self,
        assessment: NewAssessment,
    ) -> Result<Assessment, StoreError> {
        let created_at = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Storage(format!("BEGIN failed: {e}")))?;

        let result = sqlx::query(
            r#"
            INSERT INTO assessments (user_id, title, description, session_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(assessment.user_id)
        .bind(&assessment.title)
        .bind(&assessment.description)
        .bind(assessment.session_id.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::insert_error("assessments", e))?;

        let id = result.last_insert_rowid();

        for (position, question) in assessment.questions.iter().enumerate() {
            let metadata = serde_json::to_string(&question.metadata)
                .map_err(|e| StoreError::Storage(format!("metadata serialization: {e}")))?;

            sqlx::query(
                r#"
                INSERT INTO questions
                    (assessment_id, position, question_id, prompt, correct_answer, metadata)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(id)
            .bind(position as i64)
            .bind(i64::from(question.id))
            .bind(&question.prompt)
            .bind(&question.correct_answer)
            .bind(metadata)
            .execute(&mut *tx)
            .await
            .map_err(|e| Self::insert_error("questions", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Storage(format!("COMMIT failed: {e}")))?;

        debug!(
            assessment_id = id,
            questions = assessment.questions.len(),
            "Stored assessment"
        );

        Ok(Assessment {
            id,
            user_id: assessment.user_id,
            title: assessment.title,
            description: assessment.description,
            session_id: assessment.session_id,
            questions: assessment.questions,
            created_at,
        })
    }

    async fn find_assessment_by_session(
        &self,
        session_id: &SessionToken,
    ) -> Result<Option<Assessment>, StoreError> {
        let Some(row) = sqlx::query("SELECT * FROM assessments WHERE session_id = ?1")
            .bind(session_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("session lookup: {e}")))?
        else {
            return Ok(None);
        };

        let id: AssessmentId = Self::column(&row, "id")?;
        let question_rows =
            sqlx::query("SELECT * FROM questions WHERE assessment_id = ?1 ORDER BY position")
                .bind(id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StoreError::QueryFailed(format!("question load: {e}")))?;

        let questions = question_rows
            .iter()
            .map(Self::row_to_question)
            .collect::<Result<Vec<_>, _>>()?;

        let created_at: String = Self::column(&row, "created_at")?;
        let stored_token: String = Self::column(&row, "session_id")?;

        Ok(Some(Assessment {
            id,
            user_id: Self::column(&row, "user_id")?,
            title: Self::column(&row, "title")?,
            description: Self::column(&row, "description")?,
            session_id: SessionToken::from(stored_token),
            questions,
            created_at: Self::parse_timestamp(&created_at)?,
        }))
    }

    async fn create_answer(&self, answer: NewAnswer) -> Result<Answer, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO answers
                (assessment_id, question_id, user_id, answer, is_correct, feedback, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(answer.assessment_id)
        .bind(i64::from(answer.question_id))
        .bind(answer.user_id)
        .bind(&answer.answer)
        .bind(answer.is_correct)
        .bind(answer.feedback.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::insert_error("answers", e))?;

        let id = result.last_insert_rowid();
        debug!(answer_id = id, assessment_id = answer.assessment_id, "Stored answer");

        Ok(Answer {
            id,
            assessment_id: answer.assessment_id,
            question_id: answer.question_id,
            user_id: answer.user_id,
            answer: answer.answer,
            is_correct: answer.is_correct,
            feedback: answer.feedback,
            created_at,
        })
    }

    async fn list_answers(&self, assessment_id: AssessmentId) -> Result<Vec<Answer>, StoreError> {
        let rows = sqlx::query("SELECT * FROM answers WHERE assessment_id = ?1 ORDER BY id")
            .bind(assessment_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("list answers: {e}")))?;

        rows.iter().map(Self::row_to_answer).collect()
    }
}

#[async_trait]
impl StoryStore for SqliteStore {
    async fn create_story(&self, story: NewStory) -> Result<Story, StoreError> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO stories (title, author, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&story.title)
        .bind(&story.author)
        .bind(&story.content)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Self::insert_error("stories", e))?;

        Ok(Story {
            id: result.last_insert_rowid(),
            title: story.title,
            author: story.author,
            content: story.content,
            created_at,
        })
    }

    async fn list_stories(&self) -> Result<Vec<Story>, StoreError> {
        let rows = sqlx::query("SELECT * FROM stories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("list stories: {e}")))?;

        rows.iter().map(Self::row_to_story).collect()
    }
}
