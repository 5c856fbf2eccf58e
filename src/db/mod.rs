//! Typed storage operations. Ownership checks live in the queries
//! themselves: owner-scoped lookups filter on `owner_id`, so an absent row
//! and a row belonging to someone else are indistinguishable to callers.

pub mod seed;

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::models::{
    AnswerWithQuestion, Form, FormResponse, FormWithCount, Question, QuestionDraft, QuestionType,
    ResponseWithAnswers,
};
use crate::domain::submission::{AnswerInput, FormSavePlan};

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub hash: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Optional submitter metadata recorded with a public submission.
#[derive(Debug, Clone, Default)]
pub struct SubmitterMeta {
    pub origin_ip: Option<String>,
    pub user_agent: Option<String>,
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        "SELECT id, email, hash, name, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        "SELECT id, email, hash, name, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn create_user(pool: &PgPool, email: &str, hash: &str, name: &str) -> Result<DbUser> {
    let user = sqlx::query_as::<_, DbUser>(
        "INSERT INTO users (id, email, hash, name) VALUES ($1, $2, $3, $4) \
         RETURNING id, email, hash, name, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(hash)
    .bind(name)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn create_form(
    pool: &PgPool,
    owner_id: Uuid,
    title: &str,
    description: Option<&str>,
    is_active: bool,
) -> Result<Form> {
    let form = sqlx::query_as::<_, Form>(
        "INSERT INTO forms (id, owner_id, title, description, is_active) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, owner_id, title, description, is_active, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(title)
    .bind(description)
    .bind(is_active)
    .fetch_one(pool)
    .await?;
    Ok(form)
}

/// Owner-scoped lookup; `None` covers both "absent" and "not yours".
pub async fn load_form(pool: &PgPool, form_id: Uuid, owner_id: Uuid) -> Result<Option<Form>> {
    let form = sqlx::query_as::<_, Form>(
        "SELECT id, owner_id, title, description, is_active, created_at \
         FROM forms WHERE id = $1 AND owner_id = $2",
    )
    .bind(form_id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;
    Ok(form)
}

/// Public lookup: no owner check, but only active forms are visible.
pub async fn load_active_form(pool: &PgPool, form_id: Uuid) -> Result<Option<Form>> {
    let form = sqlx::query_as::<_, Form>(
        "SELECT id, owner_id, title, description, is_active, created_at \
         FROM forms WHERE id = $1 AND is_active = TRUE",
    )
    .bind(form_id)
    .fetch_optional(pool)
    .await?;
    Ok(form)
}

pub async fn list_forms_with_counts(pool: &PgPool, owner_id: Uuid) -> Result<Vec<FormWithCount>> {
    let forms = sqlx::query_as::<_, FormWithCount>(
        "SELECT f.id, f.title, f.is_active, f.created_at, COUNT(r.id) AS response_count \
         FROM forms f \
         LEFT JOIN responses r ON r.form_id = f.id \
         WHERE f.owner_id = $1 \
         GROUP BY f.id, f.title, f.is_active, f.created_at \
         ORDER BY f.created_at ASC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(forms)
}

pub async fn load_questions(pool: &PgPool, form_id: Uuid) -> Result<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        "SELECT id, form_id, text, question_type, options, is_required, order_index \
         FROM questions WHERE form_id = $1 ORDER BY order_index ASC",
    )
    .bind(form_id)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

pub async fn insert_questions(
    pool: &PgPool,
    form_id: Uuid,
    questions: &[QuestionDraft],
) -> Result<()> {
    for question in questions {
        sqlx::query(
            "INSERT INTO questions (id, form_id, text, question_type, options, is_required, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(Uuid::new_v4())
        .bind(form_id)
        .bind(&question.text)
        .bind(question.question_type)
        .bind(&question.options)
        .bind(question.is_required)
        .bind(question.order_index)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Execute a full-replace save: update the form's scalar fields, delete all
/// of its questions, insert the plan's list. The three steps run in order
/// without a transaction; a failure mid-sequence is surfaced to the caller,
/// who retries the whole save.
pub async fn replace_form_questions(pool: &PgPool, plan: &FormSavePlan) -> Result<()> {
    sqlx::query("UPDATE forms SET title = $1, description = $2 WHERE id = $3")
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(plan.form_id)
        .execute(pool)
        .await?;

    sqlx::query("DELETE FROM questions WHERE form_id = $1")
        .bind(plan.form_id)
        .execute(pool)
        .await?;

    insert_questions(pool, plan.form_id, &plan.insert).await?;
    Ok(())
}

/// Returns false when the form does not exist or is not owned by `owner_id`.
pub async fn set_form_active(
    pool: &PgPool,
    form_id: Uuid,
    owner_id: Uuid,
    is_active: bool,
) -> Result<bool> {
    let result = sqlx::query("UPDATE forms SET is_active = $1 WHERE id = $2 AND owner_id = $3")
        .bind(is_active)
        .bind(form_id)
        .bind(owner_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn create_response(
    pool: &PgPool,
    form_id: Uuid,
    meta: &SubmitterMeta,
) -> Result<FormResponse> {
    let response = sqlx::query_as::<_, FormResponse>(
        "INSERT INTO responses (id, form_id, origin_ip, user_agent) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, form_id, submitted_at, origin_ip, user_agent",
    )
    .bind(Uuid::new_v4())
    .bind(form_id)
    .bind(&meta.origin_ip)
    .bind(&meta.user_agent)
    .fetch_one(pool)
    .await?;
    Ok(response)
}

pub async fn create_answers(
    pool: &PgPool,
    response_id: Uuid,
    answers: &[AnswerInput],
) -> Result<()> {
    for answer in answers {
        sqlx::query(
            "INSERT INTO answers (id, response_id, question_id, value) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(response_id)
        .bind(answer.question_id)
        .bind(&answer.value)
        .execute(pool)
        .await?;
    }
    Ok(())
}

#[derive(FromRow)]
struct ExpandedAnswerRow {
    response_id: Uuid,
    question_id: Uuid,
    value: String,
    question_text: String,
    question_type: QuestionType,
    order_index: i32,
}

fn group_answers(
    responses: Vec<FormResponse>,
    answer_rows: Vec<ExpandedAnswerRow>,
) -> Vec<ResponseWithAnswers> {
    let mut grouped: HashMap<Uuid, Vec<AnswerWithQuestion>> = HashMap::new();
    for row in answer_rows {
        grouped
            .entry(row.response_id)
            .or_default()
            .push(AnswerWithQuestion {
                question_id: row.question_id,
                question_text: row.question_text,
                question_type: row.question_type,
                order_index: row.order_index,
                value: row.value,
            });
    }

    responses
        .into_iter()
        .map(|r| ResponseWithAnswers {
            answers: grouped.remove(&r.id).unwrap_or_default(),
            id: r.id,
            form_id: r.form_id,
            submitted_at: r.submitted_at,
            origin_ip: r.origin_ip,
            user_agent: r.user_agent,
        })
        .collect()
}

/// All responses for one form, expanded with their answers and each answer's
/// question text, type and position.
pub async fn load_responses_with_answers(
    pool: &PgPool,
    form_id: Uuid,
) -> Result<Vec<ResponseWithAnswers>> {
    let responses = sqlx::query_as::<_, FormResponse>(
        "SELECT id, form_id, submitted_at, origin_ip, user_agent \
         FROM responses WHERE form_id = $1 ORDER BY submitted_at DESC",
    )
    .bind(form_id)
    .fetch_all(pool)
    .await?;

    let answer_rows = sqlx::query_as::<_, ExpandedAnswerRow>(
        "SELECT a.response_id, a.question_id, a.value, \
                q.text AS question_text, q.question_type, q.order_index \
         FROM answers a \
         JOIN questions q ON q.id = a.question_id \
         JOIN responses r ON r.id = a.response_id \
         WHERE r.form_id = $1",
    )
    .bind(form_id)
    .fetch_all(pool)
    .await?;

    Ok(group_answers(responses, answer_rows))
}

/// Every response across all of an owner's forms, expanded the same way.
pub async fn load_owner_responses(
    pool: &PgPool,
    owner_id: Uuid,
) -> Result<Vec<ResponseWithAnswers>> {
    let responses = sqlx::query_as::<_, FormResponse>(
        "SELECT r.id, r.form_id, r.submitted_at, r.origin_ip, r.user_agent \
         FROM responses r \
         JOIN forms f ON f.id = r.form_id \
         WHERE f.owner_id = $1 \
         ORDER BY r.submitted_at DESC",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let answer_rows = sqlx::query_as::<_, ExpandedAnswerRow>(
        "SELECT a.response_id, a.question_id, a.value, \
                q.text AS question_text, q.question_type, q.order_index \
         FROM answers a \
         JOIN questions q ON q.id = a.question_id \
         JOIN responses r ON r.id = a.response_id \
         JOIN forms f ON f.id = r.form_id \
         WHERE f.owner_id = $1",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    Ok(group_answers(responses, answer_rows))
}
