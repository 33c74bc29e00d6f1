//! Record Store traits — durable keyed storage for users, stories,
//! assessments, and answers.
//!
//! Every call is atomic and independent. Callers never get multi-record
//! transactions; the services layer its own invariants on top.
//!
//! Implementations: SQLite (durable), in-memory (tests, ephemeral runs).

use async_trait::async_trait;

use crate::command::NewStory;
use crate::error::StoreError;
use crate::model::{
    Answer, Assessment, AssessmentId, Feedback, Question, QuestionId, Story, User, UserId,
};
use crate::session::SessionToken;

/// A user record before the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub auth_hash: String,
}

/// An assessment record before the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub session_id: SessionToken,
    pub questions: Vec<Question>,
}

/// An answer record before the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub assessment_id: AssessmentId,
    pub question_id: QuestionId,
    pub user_id: UserId,
    pub answer: String,
    pub is_correct: bool,
    pub feedback: Feedback,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a user. Fails with [`StoreError::Conflict`] when the email or
    /// username is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// All users, ascending by id.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Persist an assessment together with its questions. Either everything
    /// is stored or nothing is.
    async fn create_assessment(&self, assessment: NewAssessment)
    -> Result<Assessment, StoreError>;

    /// Exact-match lookup by session token. Questions come back in the
    /// order they were stored.
    async fn find_assessment_by_session(
        &self,
        session_id: &SessionToken,
    ) -> Result<Option<Assessment>, StoreError>;

    /// Append an answer. Never updates an existing record.
    async fn create_answer(&self, answer: NewAnswer) -> Result<Answer, StoreError>;

    /// All answers for an assessment, ascending by id.
    async fn list_answers(&self, assessment_id: AssessmentId) -> Result<Vec<Answer>, StoreError>;
}

#[async_trait]
pub trait StoryStore: Send + Sync {
    async fn create_story(&self, story: NewStory) -> Result<Story, StoreError>;

    /// All stories, ascending by id.
    async fn list_stories(&self) -> Result<Vec<Story>, StoreError>;
}
