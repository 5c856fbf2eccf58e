//! CSV rendering for response export. Every field is quoted, with internal
//! quotes doubled, so the output stays deterministic whatever the content.

use crate::domain::models::{Question, ResponseWithAnswers};
use crate::domain::schema;

fn escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render responses as CSV: a header of fixed metadata columns followed by
/// question texts in display order, then one row per response with the
/// matching answer in each question column (empty when unanswered).
pub fn to_csv(responses: &[ResponseWithAnswers], questions: &[Question]) -> String {
    let ordered = schema::sorted_for_display(questions);

    let mut out = String::new();

    let mut header: Vec<String> = vec![escape("Response ID"), escape("Submitted At")];
    header.extend(ordered.iter().map(|q| escape(&q.text)));
    out.push_str(&header.join(","));
    out.push('\n');

    for response in responses {
        let mut row: Vec<String> = vec![
            escape(&response.id.to_string()),
            escape(&response.submitted_at.to_rfc3339()),
        ];
        for question in &ordered {
            let value = response
                .answers
                .iter()
                .find(|a| a.question_id == question.id)
                .map(|a| a.value.as_str())
                .unwrap_or("");
            row.push(escape(value));
        }
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AnswerWithQuestion, QuestionType};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn question(id: Uuid, text: &str, order: i32) -> Question {
        Question {
            id,
            form_id: Uuid::new_v4(),
            text: text.to_string(),
            question_type: QuestionType::Text,
            options: Vec::new(),
            is_required: false,
            order_index: order,
        }
    }

    fn response_with(
        answers: Vec<(Uuid, &str)>,
    ) -> ResponseWithAnswers {
        ResponseWithAnswers {
            id: Uuid::new_v4(),
            form_id: Uuid::new_v4(),
            submitted_at: Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap(),
            origin_ip: None,
            user_agent: None,
            answers: answers
                .into_iter()
                .map(|(question_id, value)| AnswerWithQuestion {
                    question_id,
                    question_text: String::new(),
                    question_type: QuestionType::Text,
                    order_index: 0,
                    value: value.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn internal_quotes_are_doubled() {
        let q = question(Uuid::new_v4(), "Quote?", 0);
        let response = response_with(vec![(q.id, r#"He said "hi""#)]);

        let csv = to_csv(&[response], &[q]);
        assert!(csv.contains(r#""He said ""hi""""#));
    }

    #[test]
    fn header_follows_order_index_not_input_order() {
        let a = question(Uuid::new_v4(), "Second", 1);
        let b = question(Uuid::new_v4(), "First", 0);

        let csv = to_csv(&[], &[a, b]);
        let header = csv.lines().next().unwrap();
        assert_eq!(header, r#""Response ID","Submitted At","First","Second""#);
    }

    #[test]
    fn unanswered_questions_render_as_empty_fields() {
        let answered = question(Uuid::new_v4(), "Answered", 0);
        let skipped = question(Uuid::new_v4(), "Skipped", 1);
        let response = response_with(vec![(answered.id, "yes")]);

        let csv = to_csv(&[response], &[answered, skipped]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.ends_with(r#","yes","""#));
    }

    #[test]
    fn every_field_is_quoted() {
        let q = question(Uuid::new_v4(), "Plain", 0);
        let response = response_with(vec![(q.id, "no delimiters here")]);

        let csv = to_csv(&[response], &[q]);
        for line in csv.lines() {
            assert!(line.starts_with('"'));
            assert!(line.ends_with('"'));
        }
    }
}
