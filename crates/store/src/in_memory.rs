//! In-memory store — useful for testing and ephemeral runs.

use async_trait::async_trait;
use chrono::Utc;
use inkwell_core::command::NewStory;
use inkwell_core::error::StoreError;
use inkwell_core::model::{Answer, Assessment, AssessmentId, Story, User};
use inkwell_core::session::SessionToken;
use inkwell_core::store::{
    AssessmentStore, NewAnswer, NewAssessment, NewUser, StoryStore, UserStore,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps every record family in a `Vec`.
///
/// Ids are assigned as `len + 1` under the table's write lock, so they are
/// unique and increasing.
pub struct InMemoryStore {
    users: Arc<RwLock<Vec<User>>>,
    stories: Arc<RwLock<Vec<Story>>>,
    assessments: Arc<RwLock<Vec<Assessment>>>,
    answers: Arc<RwLock<Vec<Answer>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(Vec::new())),
            stories: Arc::new(RwLock::new(Vec::new())),
            assessments: Arc::new(RwLock::new(Vec::new())),
            answers: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users.email".into()));
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("users.username".into()));
        }

        let record = User {
            id: next_id(users.len()),
            username: user.username,
            email: user.email,
            auth_hash: user.auth_hash,
            created_at: Utc::now(),
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }
}

#[async_trait]
impl AssessmentStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn create_assessment(
        &self,
        assessment: NewAssessment,
    ) -> Result<Assessment, StoreError> {
        let mut assessments = self.assessments.write().await;

        if assessments
            .iter()
            .any(|a| a.session_id == assessment.session_id)
        {
            return Err(StoreError::Conflict("assessments.session_id".into()));
        }

        let record = Assessment {
            id: next_id(assessments.len()),
            user_id: assessment.user_id,
            title: assessment.title,
            description: assessment.description,
            session_id: assessment.session_id,
            questions: assessment.questions,
            created_at: Utc::now(),
        };
        assessments.push(record.clone());
        Ok(record)
    }

    async fn find_assessment_by_session(
        &self,
        session_id: &SessionToken,
    ) -> Result<Option<Assessment>, StoreError> {
        let assessments = self.assessments.read().await;
        Ok(assessments
            .iter()
            .find(|a| &a.session_id == session_id)
            .cloned())
    }

    async fn create_answer(&self, answer: NewAnswer) -> Result<Answer, StoreError> {
        let mut answers = self.answers.write().await;
        let record = Answer {
            id: next_id(answers.len()),
            assessment_id: answer.assessment_id,
            question_id: answer.question_id,
            user_id: answer.user_id,
            answer: answer.answer,
            is_correct: answer.is_correct,
            feedback: answer.feedback,
            created_at: Utc::now(),
        };
        answers.push(record.clone());
        Ok(record)
    }

    async fn list_answers(&self, assessment_id: AssessmentId) -> Result<Vec<Answer>, StoreError> {
        let answers = self.answers.read().await;
        Ok(answers
            .iter()
            .filter(|a| a.assessment_id == assessment_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StoryStore for InMemoryStore {
    async fn create_story(&self, story: NewStory) -> Result<Story, StoreError> {
        let mut stories = self.stories.write().await;
        let record = Story {
            id: next_id(stories.len()),
            title: story.title,
            author: story.author,
            content: story.content,
            created_at: Utc::now(),
        };
        stories.push(record.clone());
        Ok(record)
    }

    async fn list_stories(&self) -> Result<Vec<Story>, StoreError> {
        Ok(self.stories.read().await.clone())
    }
}
