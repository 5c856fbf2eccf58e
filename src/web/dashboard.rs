use crate::analytics::{self, DailyCount};
use crate::db;
use crate::domain::models::FormWithCount;
use crate::error::AppError;
use crate::state::SharedState;
use crate::web::session::UserSession;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

const TREND_DAYS: i64 = 7;

#[derive(Serialize)]
pub struct DashboardSummary {
    pub total_responses: usize,
    pub last_7_days: usize,
    pub last_30_days: usize,
    pub average_rating: f64,
    pub top_form: Option<FormWithCount>,
    pub daily: Vec<DailyCount>,
}

#[derive(Serialize)]
pub struct FormAnalytics {
    pub response_count: usize,
    pub average_rating: f64,
    pub daily: Vec<DailyCount>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/summary", get(summary))
        .with_state(state)
}

/// Owner-wide rollup: every number is derived in memory from one read of the
/// owner's expanded responses, so the dashboard always reflects storage as of
/// this request.
async fn summary(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let forms = db::list_forms_with_counts(&state.pool, owner_id).await?;
    let responses = db::load_owner_responses(&state.pool, owner_id).await?;
    let now = Utc::now();

    Ok(Json(DashboardSummary {
        total_responses: analytics::response_count(&responses),
        last_7_days: analytics::responses_in_window(&responses, now - Duration::days(7)),
        last_30_days: analytics::responses_in_window(&responses, now - Duration::days(30)),
        average_rating: analytics::average_rating(&responses),
        top_form: analytics::top_performing_form(&forms).cloned(),
        daily: analytics::trailing_daily_counts(&responses, TREND_DAYS, now),
    }))
}

/// Per-form rollup, routed under /forms/:id/analytics.
pub async fn form_analytics(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormAnalytics>, AppError> {
    let form = db::load_form(&state.pool, form_id, owner_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let responses = db::load_responses_with_answers(&state.pool, form.id).await?;
    let now = Utc::now();

    Ok(Json(FormAnalytics {
        response_count: analytics::response_count(&responses),
        average_rating: analytics::average_rating(&responses),
        daily: analytics::trailing_daily_counts(&responses, TREND_DAYS, now),
    }))
}
