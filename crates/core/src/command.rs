//! Typed commands, one per operation.
//!
//! The transport layer decodes each request body straight into one of these
//! and calls `validate()` before anything reaches a service. Services call
//! it again, so a command that skipped the transport is still checked.

use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::{Question, QuestionId, UserId};
use crate::session::SessionToken;

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    #[serde(rename = "authhash", alias = "auth_hash")]
    pub auth_hash: String,
}

impl RegisterUser {
    pub fn validate(&self) -> Result<()> {
        require("username", &self.username)?;
        require("email", &self.email)?;
        require("authhash", &self.auth_hash)?;
        if !self.email.contains('@') {
            return Err(Error::validation("email must contain '@'"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    pub email: String,
    #[serde(rename = "authhash", alias = "auth_hash")]
    pub auth_hash: String,
}

impl LoginUser {
    pub fn validate(&self) -> Result<()> {
        require("email", &self.email)?;
        require("authhash", &self.auth_hash)
    }
}

/// A question as submitted when an assessment starts.
#[derive(Debug, Clone, Deserialize)]
pub struct NewQuestion {
    /// Optional client-chosen id. Missing ids are assigned.
    #[serde(default)]
    pub id: Option<QuestionId>,
    #[serde(alias = "question")]
    pub prompt: String,
    pub correct_answer: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssessment {
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<NewQuestion>,
}

impl CreateAssessment {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        if self.questions.is_empty() {
            return Err(Error::validation("questions must not be empty"));
        }

        let mut seen = HashSet::new();
        for (index, question) in self.questions.iter().enumerate() {
            if question.correct_answer.is_empty() {
                return Err(Error::validation(format!(
                    "question {index} has an empty correct_answer"
                )));
            }
            match question.id {
                Some(0) => {
                    return Err(Error::validation(format!(
                        "question {index} has id 0; ids start at 1"
                    )));
                }
                Some(id) if !seen.insert(id) => {
                    return Err(Error::validation(format!("duplicate question id {id}")));
                }
                _ => {}
            }
        }

        // Unnumbered questions take ids after the highest explicit one.
        let highest = seen.iter().copied().max().unwrap_or(0);
        let unnumbered = self.questions.iter().filter(|q| q.id.is_none()).count();
        let room = u32::MAX - highest;
        if u32::try_from(unnumbered).map_or(true, |n| n > room) {
            return Err(Error::validation("no question id left to assign"));
        }
        Ok(())
    }

    /// Freeze the submitted questions, assigning ids to those without one.
    ///
    /// Unnumbered questions are numbered after the highest explicit id, in
    /// input order. Ids are unique and non-zero for any command that passed
    /// `validate()`.
    pub fn freeze_questions(&self) -> Vec<Question> {
        let mut next = self
            .questions
            .iter()
            .filter_map(|q| q.id)
            .max()
            .unwrap_or(0);

        self.questions
            .iter()
            .map(|q| {
                let id = q.id.unwrap_or_else(|| {
                    next = next.saturating_add(1);
                    next
                });
                Question {
                    id,
                    prompt: q.prompt.clone(),
                    correct_answer: q.correct_answer.clone(),
                    metadata: q.metadata.clone(),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswer {
    pub session_id: SessionToken,
    pub question_id: QuestionId,
    pub answer: String,
}

impl SubmitAnswer {
    pub fn validate(&self) -> Result<()> {
        require("session_id", self.session_id.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStory {
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub content: String,
}

impl NewStory {
    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("content", &self.content)
    }
}
