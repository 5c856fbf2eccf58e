use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "question_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[default]
    Text,
    MultipleChoice,
    Rating,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Form {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A stored question. `options` is only meaningful for `multiple_choice`;
/// for `text` and `rating` it is always empty.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub form_id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub is_required: bool,
    pub order_index: i32,
}

/// An in-editor question that has not been persisted yet. Drafts carry an id
/// so edit operations can target them, but the save plan discards identity:
/// every save re-inserts the whole list with fresh ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: Uuid,
    pub text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub is_required: bool,
    pub order_index: i32,
}

impl From<Question> for QuestionDraft {
    fn from(q: Question) -> Self {
        QuestionDraft {
            id: q.id,
            text: q.text,
            question_type: q.question_type,
            options: q.options,
            is_required: q.is_required,
            order_index: q.order_index,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FormResponse {
    pub id: Uuid,
    pub form_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub origin_ip: Option<String>,
    pub user_agent: Option<String>,
}

/// An answer expanded with its question's text, type and position, as read
/// back for analytics and export.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerWithQuestion {
    pub question_id: Uuid,
    pub question_text: String,
    pub question_type: QuestionType,
    pub order_index: i32,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseWithAnswers {
    pub id: Uuid,
    pub form_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub origin_ip: Option<String>,
    pub user_agent: Option<String>,
    pub answers: Vec<AnswerWithQuestion>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FormWithCount {
    pub id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub response_count: i64,
}
