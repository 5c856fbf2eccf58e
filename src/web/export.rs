use crate::analytics::csv;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;
use crate::web::session::UserSession;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::IntoResponse,
};
use uuid::Uuid;

/// Download a form's responses as CSV. Routed under /forms/:id/export.csv.
pub async fn download(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let form = db::load_form(&state.pool, form_id, owner_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let questions = db::load_questions(&state.pool, form.id).await?;
    let responses = db::load_responses_with_answers(&state.pool, form.id).await?;
    let body = csv::to_csv(&responses, &questions);

    tracing::info!(
        "Exported {} responses for form {} as CSV",
        responses.len(),
        form.id
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "text/csv; charset=utf-8".parse().unwrap(),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"responses-{}.csv\"", form.id)
            .parse()
            .unwrap(),
    );
    Ok((headers, body))
}
