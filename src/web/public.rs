use std::collections::HashMap;

use crate::db::{self, SubmitterMeta};
use crate::domain::models::Question;
use crate::domain::schema;
use crate::domain::submission::assemble_answers;
use crate::domain::validate::validate_submission;
use crate::error::AppError;
use crate::middleware::RateLimiter;
use crate::state::SharedState;
use crate::web::client_ip;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static SUBMIT_RATE_LIMITER: Lazy<RateLimiter> = Lazy::new(|| RateLimiter::new(10, 60));

const MAX_ANSWER_LEN: usize = 5000;

#[derive(Serialize)]
pub struct PublicForm {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
}

#[derive(Deserialize)]
pub struct SubmissionPayload {
    #[serde(default)]
    pub answers: HashMap<Uuid, String>,
}

#[derive(Serialize)]
pub struct SubmissionReceipt {
    pub response_id: Uuid,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/:id", get(view))
        .route("/:id/responses", post(submit))
        .with_state(state)
}

/// The public render of a form. Inactive and unknown forms look the same
/// from outside: not found.
async fn view(
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<PublicForm>, AppError> {
    let form = db::load_active_form(&state.pool, form_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let questions = db::load_questions(&state.pool, form.id).await?;
    Ok(Json(PublicForm {
        id: form.id,
        title: form.title,
        description: form.description,
        questions: schema::sorted_for_display(&questions),
    }))
}

/// Anonymous submission: validate the answer map against the form's
/// questions, assemble the rows worth storing, then persist the response and
/// its answers. Validation failures never reach storage.
async fn submit(
    headers: HeaderMap,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<SubmissionPayload>,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    let ip = client_ip(&headers);
    if !SUBMIT_RATE_LIMITER.allow(&ip).await {
        tracing::warn!("Submission rate limit exceeded for IP: {}", ip);
        return Err(AppError::RateLimited);
    }

    if payload.answers.values().any(|v| v.len() > MAX_ANSWER_LEN) {
        return Err(AppError::validation("answer too long"));
    }

    let form = db::load_active_form(&state.pool, form_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let questions = db::load_questions(&state.pool, form.id).await?;
    validate_submission(&questions, &payload.answers)?;

    let assembled = assemble_answers(&questions, &payload.answers);

    let meta = SubmitterMeta {
        origin_ip: Some(ip).filter(|ip| ip != "unknown"),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
    };

    let response = db::create_response(&state.pool, form.id, &meta).await?;
    db::create_answers(&state.pool, response.id, &assembled).await?;

    tracing::info!(
        "Stored response {} with {} answers for form {}",
        response.id,
        assembled.len(),
        form.id
    );

    Ok((
        StatusCode::CREATED,
        Json(SubmissionReceipt {
            response_id: response.id,
        }),
    ))
}

/// Drop aged-out entries from the submission limiter; wired to the hourly
/// scheduler job.
pub async fn prune_rate_limiter() {
    SUBMIT_RATE_LIMITER.prune().await;
}
