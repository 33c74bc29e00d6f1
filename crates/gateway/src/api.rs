//! HTTP API — the learning platform endpoints.
//!
//! Endpoints:
//!
//! - `POST /auth/register`                    — Register a user
//! - `POST /auth/login`                       — Log in with email + credential hash
//! - `GET  /user`                             — List users
//! - `POST /assessments/start`                — Start an assessment session
//! - `POST /assessments/submit`               — Grade and record one answer
//! - `GET  /assessments/{session_id}`         — Fetch a session
//! - `GET  /assessments/{session_id}/answers` — The session's answer log
//! - `GET  /stories`                          — List stories

use axum::{
    Router,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use inkwell_core::command::{CreateAssessment, LoginUser, RegisterUser, SubmitAnswer};
use inkwell_core::error::Error;
use inkwell_core::model::{Answer, Assessment, Grade, Question, Story, User};
use inkwell_core::session::SessionToken;

use crate::SharedState;
use crate::error::ApiError;

type ApiResult<T> = Result<T, ApiError>;

/// Build the API router.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/user", get(list_users_handler))
        .route("/assessments/start", post(start_assessment_handler))
        .route("/assessments/submit", post(submit_answer_handler))
        .route("/assessments/{session_id}", get(get_assessment_handler))
        .route(
            "/assessments/{session_id}/answers",
            get(list_answers_handler),
        )
        .route("/stories", get(list_stories_handler))
        .with_state(state)
}

// ── Response types ────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize, Deserialize)]
struct StartAssessmentResponse {
    session_id: SessionToken,
    questions: Vec<Question>,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn register_handler(
    State(state): State<SharedState>,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(command) = payload?;

    state.services.auth.register(command).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".into(),
        }),
    ))
}

async fn login_handler(
    State(state): State<SharedState>,
    payload: Result<Json<LoginUser>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Json(command) = payload?;

    let user = state.services.auth.login(command).await?;
    Ok(Json(user))
}

async fn list_users_handler(State(state): State<SharedState>) -> ApiResult<Json<Vec<User>>> {
    let users = state.services.users.list_users().await?;
    Ok(Json(users))
}

async fn start_assessment_handler(
    State(state): State<SharedState>,
    payload: Result<Json<CreateAssessment>, JsonRejection>,
) -> ApiResult<Json<StartAssessmentResponse>> {
    let Json(command) = payload?;

    let assessment = state.services.assessments.create_assessment(command).await?;
    Ok(Json(StartAssessmentResponse {
        session_id: assessment.session_id,
        questions: assessment.questions,
    }))
}

async fn submit_answer_handler(
    State(state): State<SharedState>,
    payload: Result<Json<SubmitAnswer>, JsonRejection>,
) -> ApiResult<Json<Grade>> {
    let Json(command) = payload?;

    let grade = state.services.assessments.submit_answer(command).await?;
    Ok(Json(grade))
}

/// A lookup miss on this route reads "Assessment not found".
fn assessment_lookup_error(err: Error) -> ApiError {
    match err {
        Error::NotFound(_) => ApiError::not_found("Assessment not found"),
        other => other.into(),
    }
}

async fn get_assessment_handler(
    State(state): State<SharedState>,
    session_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Assessment>> {
    let Path(session_id) = session_id?;
    let assessment = state
        .services
        .assessments
        .get_assessment_by_session_id(&SessionToken::from(session_id))
        .await
        .map_err(assessment_lookup_error)?;
    Ok(Json(assessment))
}

async fn list_answers_handler(
    State(state): State<SharedState>,
    session_id: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Vec<Answer>>> {
    let Path(session_id) = session_id?;
    let answers = state
        .services
        .assessments
        .list_answers(&SessionToken::from(session_id))
        .await
        .map_err(assessment_lookup_error)?;
    Ok(Json(answers))
}

async fn list_stories_handler(State(state): State<SharedState>) -> ApiResult<Json<Vec<Story>>> {
    let stories = state.services.stories.list_stories().await?;
    Ok(Json(stories))
}
