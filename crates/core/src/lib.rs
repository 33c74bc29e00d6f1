//! # Inkwell Core
//!
//! Domain types, typed commands, store traits, and error definitions for the
//! Inkwell learning platform API. This crate has **no framework dependencies**:
//! it defines the model that the store, service, and gateway crates build on.
//!
//! ## Layout
//!
//! - [`model`] — records: users, stories, assessments, questions, answers
//! - [`session`] — opaque per-assessment session tokens
//! - [`command`] — validated input for every operation
//! - [`store`] — the Record Store contract, one trait per record family
//! - [`error`] — the error taxonomy shared by every layer

pub mod command;
pub mod error;
pub mod model;
pub mod session;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use command::{CreateAssessment, LoginUser, NewQuestion, NewStory, RegisterUser, SubmitAnswer};
pub use error::{Error, NotFound, Result, StoreError};
pub use model::{
    Answer, AnswerId, Assessment, AssessmentId, Feedback, Grade, Question, QuestionId, Story,
    StoryId, User, UserId,
};
pub use session::SessionToken;
pub use store::{AssessmentStore, NewAnswer, NewAssessment, NewUser, StoryStore, UserStore};
