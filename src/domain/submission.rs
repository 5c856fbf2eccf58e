//! Assemblers: turn validated editor state into a persistable save plan, and
//! a respondent's raw answer map into the minimal set of answer rows.

use std::collections::HashMap;

use uuid::Uuid;

use super::models::{Question, QuestionDraft, QuestionType};
use super::schema;

/// One answer row to be persisted under a new response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerInput {
    pub question_id: Uuid,
    pub value: String,
}

/// Filter a raw answer map down to the rows worth storing, in display order.
/// A value is kept only when it trims non-empty; rating and choice tokens are
/// canonical and unaffected by the trim in practice. Kept values are stored
/// trimmed, whatever the question type.
pub fn assemble_answers(
    questions: &[Question],
    answers: &HashMap<Uuid, String>,
) -> Vec<AnswerInput> {
    let mut ordered: Vec<&Question> = questions.iter().collect();
    ordered.sort_by_key(|q| q.order_index);

    let mut assembled = Vec::new();
    for question in ordered {
        let Some(raw) = answers.get(&question.id) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        assembled.push(AnswerInput {
            question_id: question.id,
            value: trimmed.to_string(),
        });
    }
    assembled
}

/// A full-replace save: update the form's scalar fields, drop every stored
/// question, insert this list. Prior question identity is not preserved.
#[derive(Debug, Clone)]
pub struct FormSavePlan {
    pub form_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub insert: Vec<QuestionDraft>,
}

/// Build the replace plan from validated editor state: trim the scalar
/// fields, trim question texts, keep only non-empty options on
/// multiple-choice questions (other types always store an empty list), and
/// assign fresh dense order indices.
pub fn plan_form_save(
    form_id: Uuid,
    title: &str,
    description: Option<&str>,
    mut questions: Vec<QuestionDraft>,
) -> FormSavePlan {
    questions.sort_by_key(|q| q.order_index);
    schema::renumber(&mut questions);

    for question in &mut questions {
        question.text = question.text.trim().to_string();
        question.options = match question.question_type {
            QuestionType::MultipleChoice => question
                .options
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            QuestionType::Text | QuestionType::Rating => Vec::new(),
        };
    }

    FormSavePlan {
        form_id,
        title: title.trim().to_string(),
        description: description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        insert: questions,
    }
}
