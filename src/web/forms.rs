use crate::db;
use crate::domain::models::{Form, FormWithCount, Question, QuestionDraft, QuestionType};
use crate::domain::schema::{self, Direction, QuestionDefaults};
use crate::domain::submission::plan_form_save;
use crate::domain::validate::{validate_form_for_save, SavePath};
use crate::error::AppError;
use crate::state::SharedState;
use crate::web::session::UserSession;
use crate::web::{dashboard, export};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A question as sent by the editor. When `is_required` is omitted, the
/// call-site default applies: questions added on the create path start
/// required, questions added while editing start optional.
#[derive(Deserialize)]
pub struct QuestionInput {
    pub text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub order_index: Option<i32>,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CreateFormPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
}

#[derive(Deserialize)]
pub struct SaveFormPayload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionInput>,
}

#[derive(Deserialize)]
pub struct InlineQuestionPayload {
    pub text: String,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Deserialize)]
pub struct MovePayload {
    pub direction: Direction,
}

#[derive(Deserialize)]
pub struct ActivePayload {
    pub is_active: bool,
}

#[derive(Serialize)]
pub struct FormDetail {
    #[serde(flatten)]
    pub form: Form,
    pub questions: Vec<Question>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(detail).put(save))
        .route("/:id/active", post(set_active))
        .route("/:id/questions", post(add_question))
        .route("/:id/questions/:qid", delete(remove_question))
        .route("/:id/questions/:qid/move", post(move_question))
        .route("/:id/analytics", get(dashboard::form_analytics))
        .route("/:id/export.csv", get(export::download))
        .with_state(state)
}

fn drafts_from_inputs(inputs: Vec<QuestionInput>, defaults: QuestionDefaults) -> Vec<QuestionDraft> {
    let mut drafts = Vec::with_capacity(inputs.len());
    for input in inputs {
        schema::add_question(&mut drafts, defaults);
        let Some(draft) = drafts.last_mut() else {
            continue;
        };
        draft.text = input.text;
        draft.question_type = input.question_type;
        draft.options = input.options;
        if let Some(required) = input.is_required {
            draft.is_required = required;
        }
        if let Some(order) = input.order_index {
            draft.order_index = order;
        }
    }
    drafts
}

async fn load_detail(state: &SharedState, form: Form) -> Result<FormDetail, AppError> {
    let questions = db::load_questions(&state.pool, form.id).await?;
    Ok(FormDetail {
        form,
        questions: schema::sorted_for_display(&questions),
    })
}

async fn owned_form(state: &SharedState, form_id: Uuid, owner_id: Uuid) -> Result<Form, AppError> {
    db::load_form(&state.pool, form_id, owner_id)
        .await?
        .ok_or(AppError::NotFound)
}

async fn list(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
) -> Result<Json<Vec<FormWithCount>>, AppError> {
    let forms = db::list_forms_with_counts(&state.pool, owner_id).await?;
    Ok(Json(forms))
}

async fn create(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
    Json(payload): Json<CreateFormPayload>,
) -> Result<(StatusCode, Json<FormDetail>), AppError> {
    let drafts = drafts_from_inputs(payload.questions, QuestionDefaults::Create);
    validate_form_for_save(&payload.title, &drafts, SavePath::Create)?;

    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let form = db::create_form(
        &state.pool,
        owner_id,
        payload.title.trim(),
        description,
        payload.is_active,
    )
    .await?;

    let plan = plan_form_save(form.id, &payload.title, description, drafts);
    db::insert_questions(&state.pool, form.id, &plan.insert).await?;

    tracing::info!("Form {} created by {}", form.id, owner_id);
    let detail = load_detail(&state, form).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn detail(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormDetail>, AppError> {
    let form = owned_form(&state, form_id, owner_id).await?;
    Ok(Json(load_detail(&state, form).await?))
}

/// Full-replace save: validation runs before any write, then the stored
/// question list is rebuilt from the payload with fresh ids and dense
/// indices.
async fn save(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<SaveFormPayload>,
) -> Result<Json<FormDetail>, AppError> {
    let form = owned_form(&state, form_id, owner_id).await?;

    let drafts = drafts_from_inputs(payload.questions, QuestionDefaults::Edit);
    validate_form_for_save(&payload.title, &drafts, SavePath::Edit)?;

    let plan = plan_form_save(
        form.id,
        &payload.title,
        payload.description.as_deref(),
        drafts,
    );
    db::replace_form_questions(&state.pool, &plan).await?;

    tracing::info!("Form {} saved by {}", form.id, owner_id);
    let form = owned_form(&state, form_id, owner_id).await?;
    Ok(Json(load_detail(&state, form).await?))
}

/// Inline editor add: the draft starts with the edit-path defaults (not
/// required), then takes its content from the payload, and the whole list is
/// persisted through the usual replace plan.
async fn add_question(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<InlineQuestionPayload>,
) -> Result<(StatusCode, Json<FormDetail>), AppError> {
    let form = owned_form(&state, form_id, owner_id).await?;

    let mut drafts: Vec<QuestionDraft> = db::load_questions(&state.pool, form.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    schema::add_question(&mut drafts, QuestionDefaults::Edit);
    if let Some(draft) = drafts.last_mut() {
        draft.text = payload.text;
        draft.question_type = payload.question_type;
        draft.options = payload.options;
    }

    validate_form_for_save(&form.title, &drafts, SavePath::Edit)?;

    let plan = plan_form_save(form.id, &form.title, form.description.as_deref(), drafts);
    db::replace_form_questions(&state.pool, &plan).await?;

    let form = owned_form(&state, form_id, owner_id).await?;
    let detail = load_detail(&state, form).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Remove a question and renumber the rest. Removing an id that is not on
/// the form leaves it unchanged, mirroring the editor's silent no-op.
async fn remove_question(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
    Path((form_id, question_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FormDetail>, AppError> {
    let form = owned_form(&state, form_id, owner_id).await?;

    let mut drafts: Vec<QuestionDraft> = db::load_questions(&state.pool, form.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    schema::remove_question(&mut drafts, question_id);

    let plan = plan_form_save(form.id, &form.title, form.description.as_deref(), drafts);
    db::replace_form_questions(&state.pool, &plan).await?;

    let form = owned_form(&state, form_id, owner_id).await?;
    Ok(Json(load_detail(&state, form).await?))
}

/// Swap a question with its neighbor; boundary moves and unknown ids are
/// no-ops.
async fn move_question(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
    Path((form_id, question_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<MovePayload>,
) -> Result<Json<FormDetail>, AppError> {
    let form = owned_form(&state, form_id, owner_id).await?;

    let mut drafts: Vec<QuestionDraft> = db::load_questions(&state.pool, form.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    schema::move_question(&mut drafts, question_id, payload.direction);

    let plan = plan_form_save(form.id, &form.title, form.description.as_deref(), drafts);
    db::replace_form_questions(&state.pool, &plan).await?;

    let form = owned_form(&state, form_id, owner_id).await?;
    Ok(Json(load_detail(&state, form).await?))
}

async fn set_active(
    UserSession(owner_id): UserSession,
    State(state): State<SharedState>,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<ActivePayload>,
) -> Result<StatusCode, AppError> {
    let updated = db::set_form_active(&state.pool, form_id, owner_id, payload.is_active).await?;
    if !updated {
        return Err(AppError::NotFound);
    }
    tracing::info!(
        "Form {} set {} by {}",
        form_id,
        if payload.is_active { "active" } else { "inactive" },
        owner_id
    );
    Ok(StatusCode::NO_CONTENT)
}
