//! The assessment engine — starts sessions, resolves them by token, and
//! grades and records answers.
//!
//! The engine is stateless: everything lives in the [`AssessmentStore`].
//! Two identical submissions produce two answer records; there is no
//! "already answered" state.

use std::sync::Arc;

use inkwell_core::command::{CreateAssessment, SubmitAnswer};
use inkwell_core::error::{Error, NotFound, Result};
use inkwell_core::model::{Answer, Assessment, Grade, Question};
use inkwell_core::session::SessionToken;
use inkwell_core::store::{AssessmentStore, NewAnswer, NewAssessment};
use tracing::{debug, error, info};

/// Grade a submission: exact, case-sensitive string equality with the
/// stored correct answer. No trimming, no partial credit.
pub fn grade(question: &Question, answer: &str) -> Grade {
    Grade::new(question.correct_answer == answer)
}

pub struct AssessmentEngine {
    store: Arc<dyn AssessmentStore>,
}

impl AssessmentEngine {
    pub fn new(store: Arc<dyn AssessmentStore>) -> Self {
        Self { store }
    }

    /// Start a new assessment session.
    ///
    /// Token uniqueness comes from [`SessionToken::generate`]; the engine
    /// does not re-check it against the store.
    pub async fn create_assessment(&self, command: CreateAssessment) -> Result<Assessment> {
        command.validate()?;

        let questions = command.freeze_questions();
        let session_id = SessionToken::generate();
        let user_id = command.user_id;

        let assessment = self
            .store
            .create_assessment(NewAssessment {
                user_id,
                title: command.title,
                description: command.description,
                session_id,
                questions,
            })
            .await
            .map_err(|e| {
                error!(error = %e, user_id, backend = self.store.name(), "Failed to persist assessment");
                Error::internal("could not create assessment")
            })?;

        info!(
            assessment_id = assessment.id,
            user_id,
            questions = assessment.questions.len(),
            "Assessment session started"
        );
        Ok(assessment)
    }

    /// Resolve a session token to its assessment.
    pub async fn get_assessment_by_session_id(
        &self,
        session_id: &SessionToken,
    ) -> Result<Assessment> {
        match self.store.find_assessment_by_session(session_id).await {
            Ok(Some(assessment)) => Ok(assessment),
            Ok(None) => {
                debug!("Unknown session token");
                Err(NotFound::Session.into())
            }
            Err(e) => {
                error!(error = %e, "Session lookup failed");
                Err(Error::internal("could not load assessment"))
            }
        }
    }

    /// Grade a submission and record it.
    ///
    /// The grade is only returned once the answer is durably stored; if the
    /// write fails the whole submission fails and nothing is rolled back.
    pub async fn submit_answer(&self, command: SubmitAnswer) -> Result<Grade> {
        command.validate()?;

        let assessment = self.get_assessment_by_session_id(&command.session_id).await?;
        let question = assessment
            .find_question(command.question_id)
            .ok_or(NotFound::Question)?;

        let result = grade(question, &command.answer);

        let answer = self
            .store
            .create_answer(NewAnswer {
                assessment_id: assessment.id,
                question_id: question.id,
                user_id: assessment.user_id,
                answer: command.answer,
                is_correct: result.is_correct,
                feedback: result.feedback,
            })
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    assessment_id = assessment.id,
                    question_id = question.id,
                    "Failed to persist answer"
                );
                Error::internal("could not save answer")
            })?;

        info!(
            answer_id = answer.id,
            assessment_id = assessment.id,
            question_id = question.id,
            correct = result.is_correct,
            "Answer graded"
        );
        Ok(result)
    }

    /// The append-only answer log for a session, oldest first.
    pub async fn list_answers(&self, session_id: &SessionToken) -> Result<Vec<Answer>> {
        let assessment = self.get_assessment_by_session_id(session_id).await?;
        self.store.list_answers(assessment.id).await.map_err(|e| {
            error!(error = %e, assessment_id = assessment.id, "Failed to list answers");
            Error::internal("could not load answers")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inkwell_core::command::NewQuestion;
    use inkwell_core::error::StoreError;
    use inkwell_core::model::{AssessmentId, Feedback, QuestionId};
    use inkwell_store::InMemoryStore;
    use std::collections::HashSet;

    fn new_question(id: QuestionId, correct: &str) -> NewQuestion {
        NewQuestion {
            id: Some(id),
            prompt: format!("Question {id}"),
            correct_answer: correct.into(),
            metadata: serde_json::Map::new(),
        }
    }

    fn scenario_command() -> CreateAssessment {
        CreateAssessment {
            user_id: 11,
            title: "General knowledge".into(),
            description: "Two quick ones".into(),
            questions: vec![new_question(1, "Paris"), new_question(2, "42")],
        }
    }

    fn submit(session: &SessionToken, question_id: QuestionId, answer: &str) -> SubmitAnswer {
        SubmitAnswer {
            session_id: session.clone(),
            question_id,
            answer: answer.into(),
        }
    }

    fn engine() -> AssessmentEngine {
        AssessmentEngine::new(Arc::new(InMemoryStore::new()))
    }

    /// Delegates to an in-memory store but refuses every write it is told to.
    struct FailingStore {
        inner: InMemoryStore,
        fail_assessments: bool,
        fail_answers: bool,
    }

    #[async_trait]
    impl AssessmentStore for FailingStore {
        fn name(&self) -> &str {
            "failing"
        }

        async fn create_assessment(
            &self,
            assessment: NewAssessment,
        ) -> std::result::Result<Assessment, StoreError> {
            if self.fail_assessments {
                return Err(StoreError::Storage("disk full".into()));
            }
            self.inner.create_assessment(assessment).await
        }

        async fn find_assessment_by_session(
            &self,
            session_id: &SessionToken,
        ) -> std::result::Result<Option<Assessment>, StoreError> {
            self.inner.find_assessment_by_session(session_id).await
        }

        async fn create_answer(&self, answer: NewAnswer) -> std::result::Result<Answer, StoreError> {
            if self.fail_answers {
                return Err(StoreError::Storage("disk full".into()));
            }
            self.inner.create_answer(answer).await
        }

        async fn list_answers(
            &self,
            assessment_id: AssessmentId,
        ) -> std::result::Result<Vec<Answer>, StoreError> {
            self.inner.list_answers(assessment_id).await
        }
    }

    #[tokio::test]
    async fn grading_scenario() {
        let engine = engine();
        let assessment = engine.create_assessment(scenario_command()).await.unwrap();
        let s1 = assessment.session_id.clone();

        let grade = engine.submit_answer(submit(&s1, 1, "Paris")).await.unwrap();
        assert!(grade.is_correct);
        assert_eq!(grade.feedback, Feedback::Correct);

        let grade = engine.submit_answer(submit(&s1, 2, "43")).await.unwrap();
        assert!(!grade.is_correct);
        assert_eq!(grade.feedback, Feedback::Incorrect);

        let err = engine.submit_answer(submit(&s1, 99, "x")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFound::Question)));

        let bogus = SessionToken::from("bogus");
        let err = engine.submit_answer(submit(&bogus, 1, "Paris")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFound::Session)));
    }

    #[tokio::test]
    async fn grading_is_exact() {
        let engine = engine();
        let s = engine.create_assessment(scenario_command()).await.unwrap().session_id;

        for near_miss in ["paris", "PARIS", "Paris ", " Paris", ""] {
            let grade = engine.submit_answer(submit(&s, 1, near_miss)).await.unwrap();
            assert!(!grade.is_correct, "{near_miss:?} must not be accepted");
            assert_eq!(grade.feedback, Feedback::Incorrect);
        }
    }

    #[tokio::test]
    async fn question_zero_is_never_found() {
        let engine = engine();
        let s = engine.create_assessment(scenario_command()).await.unwrap().session_id;
        let err = engine.submit_answer(submit(&s, 0, "Paris")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFound::Question)));
    }

    #[tokio::test]
    async fn created_assessment_is_retrievable() {
        let engine = engine();
        let created = engine.create_assessment(scenario_command()).await.unwrap();

        let fetched = engine
            .get_assessment_by_session_id(&created.session_id)
            .await
            .unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.user_id, 11);
        assert_eq!(fetched.questions.len(), 2);

        let err = engine
            .get_assessment_by_session_id(&SessionToken::from("never-issued"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(NotFound::Session)));
    }

    #[tokio::test]
    async fn token_lookup_is_case_sensitive() {
        let engine = engine();
        let created = engine.create_assessment(scenario_command()).await.unwrap();
        let upper = SessionToken::from(created.session_id.as_str().to_uppercase());
        assert!(engine.get_assessment_by_session_id(&upper).await.is_err());
    }

    #[tokio::test]
    async fn session_tokens_are_unique() {
        let engine = engine();
        let mut seen = HashSet::new();
        for _ in 0..50 {
            let a = engine.create_assessment(scenario_command()).await.unwrap();
            assert!(seen.insert(a.session_id));
        }
    }

    #[tokio::test]
    async fn invalid_commands_rejected_before_store() {
        let engine = engine();
        let mut cmd = scenario_command();
        cmd.questions.clear();
        assert!(matches!(
            engine.create_assessment(cmd).await.unwrap_err(),
            Error::Validation(_)
        ));

        let mut cmd = scenario_command();
        cmd.questions[1].correct_answer.clear();
        assert!(matches!(
            engine.create_assessment(cmd).await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn repeated_submissions_are_not_deduplicated() {
        let engine = engine();
        let s = engine.create_assessment(scenario_command()).await.unwrap().session_id;

        engine.submit_answer(submit(&s, 1, "Paris")).await.unwrap();
        engine.submit_answer(submit(&s, 1, "Paris")).await.unwrap();

        let answers = engine.list_answers(&s).await.unwrap();
        assert_eq!(answers.len(), 2);
        assert_ne!(answers[0].id, answers[1].id);
    }

    #[tokio::test]
    async fn answer_records_copy_assessment_owner() {
        let engine = engine();
        let a = engine.create_assessment(scenario_command()).await.unwrap();
        engine.submit_answer(submit(&a.session_id, 2, "43")).await.unwrap();

        let answers = engine.list_answers(&a.session_id).await.unwrap();
        let answer = &answers[0];
        assert_eq!(answer.assessment_id, a.id);
        assert_eq!(answer.user_id, a.user_id);
        assert_eq!(answer.question_id, 2);
        assert_eq!(answer.answer, "43");
        assert!(!answer.is_correct);
        assert_eq!(answer.feedback, Feedback::Incorrect);
    }

    #[tokio::test]
    async fn failed_answer_write_fails_the_submission() {
        let store = FailingStore {
            inner: InMemoryStore::new(),
            fail_assessments: false,
            fail_answers: true,
        };
        let engine = AssessmentEngine::new(Arc::new(store));
        let s = engine.create_assessment(scenario_command()).await.unwrap().session_id;

        let err = engine.submit_answer(submit(&s, 1, "Paris")).await.unwrap_err();
        match err {
            Error::Internal(message) => assert_eq!(message, "could not save answer"),
            other => panic!("expected internal error, got {other:?}"),
        }
        assert!(engine.list_answers(&s).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_assessment_write_is_opaque() {
        let store = FailingStore {
            inner: InMemoryStore::new(),
            fail_assessments: true,
            fail_answers: false,
        };
        let engine = AssessmentEngine::new(Arc::new(store));

        let err = engine.create_assessment(scenario_command()).await.unwrap_err();
        match err {
            Error::Internal(message) => {
                assert_eq!(message, "could not create assessment");
                assert!(!message.contains("disk full"));
            }
            other => panic!("expected internal error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn concurrent_submissions_all_recorded() {
        let engine = Arc::new(engine());
        let s = engine.create_assessment(scenario_command()).await.unwrap().session_id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = engine.clone();
                let s = s.clone();
                tokio::spawn(async move { engine.submit_answer(submit(&s, 1, "Paris")).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_correct);
        }
        assert_eq!(engine.list_answers(&s).await.unwrap().len(), 8);
    }

    #[test]
    fn grade_function_is_pure_equality() {
        let question = Question {
            id: 1,
            prompt: "6 x 7".into(),
            correct_answer: "42".into(),
            metadata: serde_json::Map::new(),
        };
        assert_eq!(grade(&question, "42"), Grade::new(true));
        assert_eq!(grade(&question, "42.0"), Grade::new(false));
    }
}
