//! Read-only summary statistics computed from stored responses. Everything
//! here is pure: the callers load expanded responses once and derive all
//! dashboard numbers in memory.

pub mod csv;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::models::{FormWithCount, QuestionType, ResponseWithAnswers};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DailyCount {
    pub date: String,
    pub count: usize,
}

pub fn response_count(responses: &[ResponseWithAnswers]) -> usize {
    responses.len()
}

/// Responses submitted at or after `since`.
pub fn responses_in_window(responses: &[ResponseWithAnswers], since: DateTime<Utc>) -> usize {
    responses
        .iter()
        .filter(|r| r.submitted_at >= since)
        .count()
}

/// Mean of all parseable rating answers across the given responses, rounded
/// to one decimal. Answers that fail to parse as integers are discarded;
/// an empty rating set yields 0.0 rather than an error.
pub fn average_rating(responses: &[ResponseWithAnswers]) -> f64 {
    let ratings: Vec<i64> = responses
        .iter()
        .flat_map(|r| r.answers.iter())
        .filter(|a| a.question_type == QuestionType::Rating)
        .filter_map(|a| a.value.trim().parse::<i64>().ok())
        .collect();

    if ratings.is_empty() {
        return 0.0;
    }
    let mean = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Per-calendar-day response counts for the `days` days ending at
/// `reference_now`, oldest first. Bucketing matches on the ISO date prefix of
/// the submission timestamp, not a rolling 24-hour interval; consumers rely
/// on the resulting date labels.
pub fn trailing_daily_counts(
    responses: &[ResponseWithAnswers],
    days: i64,
    reference_now: DateTime<Utc>,
) -> Vec<DailyCount> {
    let mut buckets = Vec::with_capacity(days as usize);
    for offset in (0..days).rev() {
        let date = (reference_now - Duration::days(offset))
            .date_naive()
            .to_string();
        let count = responses
            .iter()
            .filter(|r| r.submitted_at.to_rfc3339().starts_with(&date))
            .count();
        buckets.push(DailyCount { date, count });
    }
    buckets
}

/// The form with the strictly greatest response count, scanning in the given
/// order; ties keep the earlier entry. None when the input is empty.
pub fn top_performing_form(forms: &[FormWithCount]) -> Option<&FormWithCount> {
    let mut best: Option<&FormWithCount> = None;
    for form in forms {
        let beats = match best {
            None => true,
            Some(current) => form.response_count > current.response_count,
        };
        if beats {
            best = Some(form);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::AnswerWithQuestion;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn rating_answer(value: &str) -> AnswerWithQuestion {
        AnswerWithQuestion {
            question_id: Uuid::new_v4(),
            question_text: "Score?".to_string(),
            question_type: QuestionType::Rating,
            order_index: 0,
            value: value.to_string(),
        }
    }

    fn text_answer(value: &str) -> AnswerWithQuestion {
        AnswerWithQuestion {
            question_id: Uuid::new_v4(),
            question_text: "Comments?".to_string(),
            question_type: QuestionType::Text,
            order_index: 1,
            value: value.to_string(),
        }
    }

    fn response_at(
        submitted_at: DateTime<Utc>,
        answers: Vec<AnswerWithQuestion>,
    ) -> ResponseWithAnswers {
        ResponseWithAnswers {
            id: Uuid::new_v4(),
            form_id: Uuid::new_v4(),
            submitted_at,
            origin_ip: None,
            user_agent: None,
            answers,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn average_rating_discards_unparseable_values() {
        let responses = vec![
            response_at(at(2026, 8, 1, 9), vec![rating_answer("3"), rating_answer("5")]),
            response_at(
                at(2026, 8, 2, 9),
                vec![rating_answer("bad"), rating_answer("1"), text_answer("5")],
            ),
        ];
        assert_eq!(average_rating(&responses), 3.0);
    }

    #[test]
    fn average_rating_rounds_to_one_decimal() {
        let responses = vec![response_at(
            at(2026, 8, 1, 9),
            vec![rating_answer("4"), rating_answer("5"), rating_answer("5")],
        )];
        assert_eq!(average_rating(&responses), 4.7);
    }

    #[test]
    fn average_rating_without_ratings_is_zero() {
        let responses = vec![response_at(at(2026, 8, 1, 9), vec![text_answer("fine")])];
        assert_eq!(average_rating(&responses), 0.0);
    }

    #[test]
    fn window_count_includes_the_boundary_instant() {
        let since = at(2026, 8, 1, 0);
        let responses = vec![
            response_at(since, vec![]),
            response_at(at(2026, 7, 31, 23), vec![]),
            response_at(at(2026, 8, 3, 12), vec![]),
        ];
        assert_eq!(responses_in_window(&responses, since), 2);
    }

    #[test]
    fn trailing_counts_are_zero_filled_and_oldest_first() {
        let now = at(2026, 8, 7, 15);
        let responses = vec![response_at(at(2026, 6, 1, 9), vec![])];

        let counts = trailing_daily_counts(&responses, 7, now);
        assert_eq!(counts.len(), 7);
        assert!(counts.iter().all(|c| c.count == 0));
        assert_eq!(counts[0].date, "2026-08-01");
        assert_eq!(counts[6].date, "2026-08-07");
    }

    #[test]
    fn trailing_counts_bucket_by_calendar_day() {
        let now = at(2026, 8, 7, 15);
        let responses = vec![
            response_at(at(2026, 8, 7, 0), vec![]),
            response_at(at(2026, 8, 7, 23), vec![]),
            response_at(at(2026, 8, 6, 12), vec![]),
        ];

        let counts = trailing_daily_counts(&responses, 7, now);
        assert_eq!(counts[6], DailyCount { date: "2026-08-07".into(), count: 2 });
        assert_eq!(counts[5], DailyCount { date: "2026-08-06".into(), count: 1 });
    }

    fn form_with_count(title: &str, response_count: i64) -> FormWithCount {
        FormWithCount {
            id: Uuid::new_v4(),
            title: title.to_string(),
            is_active: true,
            created_at: at(2026, 1, 1, 0),
            response_count,
        }
    }

    #[test]
    fn top_form_requires_a_strictly_greater_count() {
        let forms = vec![
            form_with_count("first", 4),
            form_with_count("tied", 4),
            form_with_count("smaller", 2),
        ];
        assert_eq!(top_performing_form(&forms).unwrap().title, "first");
    }

    #[test]
    fn top_form_of_empty_input_is_none() {
        assert!(top_performing_form(&[]).is_none());
    }
}
