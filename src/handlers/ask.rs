use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use crate::error::AppError;
use crate::models::CurrentUser;
use crate::services::metrics::{
    record_answer_request, record_provider_error, record_provider_latency,
};
use crate::startup::AppState;

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// POST /ask
///
/// The body is taken as loose, optional JSON: a request that is not JSON at
/// all lands here as `None` and gets the same fixed error body as a missing
/// or non-string `question`, instead of a framework rejection.
pub async fn ask(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Option<Json<Value>>,
) -> Result<Json<AskResponse>, AppError> {
    let question = body
        .as_ref()
        .and_then(|body| body.get("question"))
        .and_then(Value::as_str);
    let question = match question {
        Some(q) if !q.is_empty() => q,
        _ => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "question must be a string"
            )))
        }
    };

    // Question text stays out of the logs; only its length is recorded.
    tracing::info!(
        question_len = question.len(),
        user = user.as_ref().map(|u| u.email.as_str()).unwrap_or("anonymous"),
        "Answering question"
    );

    let started = Instant::now();
    let result = state.answers.answer(question).await;
    record_provider_latency(
        state.answers.name(),
        state.answers.model(),
        started.elapsed().as_secs_f64(),
    );

    match result {
        Ok(answer) => {
            record_answer_request(state.answers.model(), "ok");
            tracing::info!(answer_len = answer.len(), "Question answered");
            Ok(Json(AskResponse { answer }))
        }
        Err(e) => {
            record_provider_error(state.answers.name(), e.error_type());
            record_answer_request(state.answers.model(), "error");
            tracing::error!(error = %e, "Answer provider failed");
            Err(AppError::Internal(anyhow::anyhow!(e)))
        }
    }
}
