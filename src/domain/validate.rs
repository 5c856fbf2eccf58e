//! Save-time and submission-time validation. Everything here runs before the
//! first persistence call, so a failed validation never leaves partial state.

use std::collections::HashMap;

use uuid::Uuid;

use crate::error::AppError;

use super::models::{Question, QuestionDraft, QuestionType};

/// Which save flow is validating. The create flow accepts a multiple-choice
/// question with a single option; the edit flow insists on two. Both minimums
/// exist in the product, so the path is explicit instead of unified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SavePath {
    Create,
    Edit,
}

impl SavePath {
    fn min_options(self) -> usize {
        match self {
            SavePath::Create => 1,
            SavePath::Edit => 2,
        }
    }
}

/// Validate a form before it is saved. Checks run in a fixed order: title,
/// question count, then one pass over the questions in display order checking
/// text before options, reporting the first offender with its 1-indexed
/// number.
pub fn validate_form_for_save(
    title: &str,
    questions: &[QuestionDraft],
    path: SavePath,
) -> Result<(), AppError> {
    if title.trim().is_empty() {
        return Err(AppError::validation("title required"));
    }
    if questions.is_empty() {
        return Err(AppError::validation("at least one question required"));
    }

    let mut ordered: Vec<&QuestionDraft> = questions.iter().collect();
    ordered.sort_by_key(|q| q.order_index);

    for (idx, question) in ordered.iter().enumerate() {
        let number = idx + 1;
        if question.text.trim().is_empty() {
            return Err(AppError::validation(format!(
                "question {number} text required"
            )));
        }
        if question.question_type == QuestionType::MultipleChoice {
            let usable = question
                .options
                .iter()
                .filter(|o| !o.trim().is_empty())
                .count();
            if usable < path.min_options() {
                return Err(AppError::validation(format!(
                    "question {number} needs options"
                )));
            }
        }
    }

    Ok(())
}

/// Validate a respondent's answer map against the form's questions. Collects
/// every violated required question (by 1-indexed display position) before
/// reporting, rather than failing on the first one. A `text` answer must trim
/// non-empty; `rating` and `multiple_choice` are satisfied by any non-empty
/// value, "falsy-looking" tokens like `"0"` included.
pub fn validate_submission(
    questions: &[Question],
    answers: &HashMap<Uuid, String>,
) -> Result<(), AppError> {
    let mut ordered: Vec<&Question> = questions.iter().collect();
    ordered.sort_by_key(|q| q.order_index);

    let mut missing: Vec<String> = Vec::new();
    for (idx, question) in ordered.iter().enumerate() {
        if !question.is_required {
            continue;
        }
        let satisfied = match answers.get(&question.id) {
            None => false,
            Some(value) => match question.question_type {
                QuestionType::Text => !value.trim().is_empty(),
                QuestionType::MultipleChoice | QuestionType::Rating => !value.is_empty(),
            },
        };
        if !satisfied {
            missing.push((idx + 1).to_string());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "please answer required question(s) {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str, question_type: QuestionType, options: &[&str], order: i32) -> QuestionDraft {
        QuestionDraft {
            id: Uuid::new_v4(),
            text: text.to_string(),
            question_type,
            options: options.iter().map(|o| o.to_string()).collect(),
            is_required: false,
            order_index: order,
        }
    }

    fn question(
        text: &str,
        question_type: QuestionType,
        is_required: bool,
        order: i32,
    ) -> Question {
        Question {
            id: Uuid::new_v4(),
            form_id: Uuid::new_v4(),
            text: text.to_string(),
            question_type,
            options: Vec::new(),
            is_required,
            order_index: order,
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_title_is_reported_before_missing_questions() {
        let err = validate_form_for_save("   ", &[], SavePath::Create).unwrap_err();
        assert_eq!(message(err), "title required");
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = validate_form_for_save("Survey", &[], SavePath::Create).unwrap_err();
        assert_eq!(message(err), "at least one question required");
    }

    #[test]
    fn first_blank_question_text_is_reported_with_its_number() {
        let questions = vec![
            draft("How was it?", QuestionType::Text, &[], 0),
            draft("   ", QuestionType::Text, &[], 1),
        ];
        let err = validate_form_for_save("Survey", &questions, SavePath::Create).unwrap_err();
        assert_eq!(message(err), "question 2 text required");
    }

    #[test]
    fn single_option_choice_passes_create_but_fails_edit() {
        let questions = vec![draft(
            "Pick one",
            QuestionType::MultipleChoice,
            &["Yes"],
            0,
        )];

        assert!(validate_form_for_save("Survey", &questions, SavePath::Create).is_ok());

        let err = validate_form_for_save("Survey", &questions, SavePath::Edit).unwrap_err();
        assert_eq!(message(err), "question 1 needs options");
    }

    #[test]
    fn whitespace_only_options_do_not_count() {
        let questions = vec![draft(
            "Pick one",
            QuestionType::MultipleChoice,
            &["  ", ""],
            0,
        )];
        let err = validate_form_for_save("Survey", &questions, SavePath::Create).unwrap_err();
        assert_eq!(message(err), "question 1 needs options");
    }

    #[test]
    fn question_numbers_follow_display_order_not_list_order() {
        let questions = vec![
            draft("   ", QuestionType::Text, &[], 1),
            draft("First by order", QuestionType::Text, &[], 0),
        ];
        let err = validate_form_for_save("Survey", &questions, SavePath::Create).unwrap_err();
        assert_eq!(message(err), "question 2 text required");
    }

    #[test]
    fn whitespace_only_text_answer_fails_required() {
        let q = question("Comments?", QuestionType::Text, true, 0);
        let answers = HashMap::from([(q.id, "   ".to_string())]);
        let err = validate_submission(&[q], &answers).unwrap_err();
        assert_eq!(message(err), "please answer required question(s) 1");
    }

    #[test]
    fn rating_token_satisfies_required() {
        let q = question("Score?", QuestionType::Rating, true, 0);
        let answers = HashMap::from([(q.id, "3".to_string())]);
        assert!(validate_submission(&[q], &answers).is_ok());
    }

    #[test]
    fn zero_rating_still_counts_as_answered() {
        let q = question("Score?", QuestionType::Rating, true, 0);
        let answers = HashMap::from([(q.id, "0".to_string())]);
        assert!(validate_submission(&[q], &answers).is_ok());
    }

    #[test]
    fn all_violations_are_collected_in_one_message() {
        let first = question("A", QuestionType::Text, true, 0);
        let second = question("B", QuestionType::Rating, false, 1);
        let third = question("C", QuestionType::MultipleChoice, true, 2);
        let answers = HashMap::from([(second.id, "2".to_string())]);

        let err = validate_submission(&[first, second, third], &answers).unwrap_err();
        assert_eq!(message(err), "please answer required question(s) 1, 3");
    }

    #[test]
    fn optional_questions_may_be_skipped() {
        let q = question("Anything else?", QuestionType::Text, false, 0);
        assert!(validate_submission(&[q], &HashMap::new()).is_ok());
    }
}
