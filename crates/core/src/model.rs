//! Records persisted by the Record Store.
//!
//! Assessments embed their questions, which are frozen at creation. Answers
//! are append-only and reference both the assessment and one of its
//! questions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::session::SessionToken;

pub type UserId = i64;
pub type AssessmentId = i64;
pub type AnswerId = i64;
pub type StoryId = i64;

/// Question identifier, unique within one assessment. Assigned ids are
/// always `>= 1`.
pub type QuestionId = u32;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,

    /// Digest of the user's credential. Never leaves the server.
    #[serde(skip)]
    pub auth_hash: String,

    pub created_at: DateTime<Utc>,
}

/// A story served to readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One question of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub correct_answer: String,

    /// Free-form attributes supplied by the client (options, difficulty, ...).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// An assessment session and its frozen question set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub id: AssessmentId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub session_id: SessionToken,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

impl Assessment {
    /// Find a question by id.
    ///
    /// If the set holds duplicate ids the first one in stored order wins.
    pub fn find_question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// The fixed feedback label attached to a graded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    Correct,
    Incorrect,
}

impl Feedback {
    pub fn from_correctness(is_correct: bool) -> Self {
        if is_correct {
            Feedback::Correct
        } else {
            Feedback::Incorrect
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Feedback::Correct => "Correct",
            Feedback::Incorrect => "Incorrect",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feedback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Correct" => Ok(Feedback::Correct),
            "Incorrect" => Ok(Feedback::Incorrect),
            other => Err(format!("unknown feedback label: {other}")),
        }
    }
}

/// The outcome of grading one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub is_correct: bool,
    pub feedback: Feedback,
}

impl Grade {
    pub fn new(is_correct: bool) -> Self {
        Self {
            is_correct,
            feedback: Feedback::from_correctness(is_correct),
        }
    }
}

/// A persisted submission. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub assessment_id: AssessmentId,
    pub question_id: QuestionId,
    pub user_id: UserId,
    pub answer: String,
    pub is_correct: bool,
    pub feedback: Feedback,
    pub created_at: DateTime<Utc>,
}
