//! Question-list editing. All operations keep `order_index` a dense
//! `0..N-1` sequence in the list's relative order.

use serde::Deserialize;
use uuid::Uuid;

use super::models::{Question, QuestionDraft, QuestionType};

/// Defaults applied when a new question is appended. The create page starts
/// new questions as required; the inline editor starts them optional. Both
/// call sites of the original product behave this way, so the choice is a
/// parameter rather than a single rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuestionDefaults {
    Create,
    Edit,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Append a blank `text` question at the end of the list. Returns the new
/// draft's id.
pub fn add_question(questions: &mut Vec<QuestionDraft>, defaults: QuestionDefaults) -> Uuid {
    let draft = QuestionDraft {
        id: Uuid::new_v4(),
        text: String::new(),
        question_type: QuestionType::Text,
        options: Vec::new(),
        is_required: matches!(defaults, QuestionDefaults::Create),
        order_index: questions.len() as i32,
    };
    let id = draft.id;
    questions.push(draft);
    id
}

/// Remove the question with the given id and renumber the survivors.
/// A no-op when the id is not in the list.
pub fn remove_question(questions: &mut Vec<QuestionDraft>, id: Uuid) {
    let before = questions.len();
    questions.retain(|q| q.id != id);
    if questions.len() != before {
        renumber(questions);
    }
}

/// Swap the question with its immediate neighbor in the given direction.
/// A no-op at the list boundary or when the id is not in the list.
pub fn move_question(questions: &mut Vec<QuestionDraft>, id: Uuid, direction: Direction) {
    questions.sort_by_key(|q| q.order_index);
    let Some(pos) = questions.iter().position(|q| q.id == id) else {
        return;
    };
    let target = match direction {
        Direction::Up if pos > 0 => pos - 1,
        Direction::Down if pos + 1 < questions.len() => pos + 1,
        _ => return,
    };
    questions.swap(pos, target);
    renumber(questions);
}

/// Reassign `order_index` to `0..N-1` in current list order.
pub fn renumber(questions: &mut [QuestionDraft]) {
    for (idx, q) in questions.iter_mut().enumerate() {
        q.order_index = idx as i32;
    }
}

/// Questions sorted ascending by `order_index`. The editor, the owner
/// preview, the public renderer and the CSV exporter all order through this
/// one function so they agree on the same stored state.
pub fn sorted_for_display(questions: &[Question]) -> Vec<Question> {
    let mut sorted = questions.to_vec();
    sorted.sort_by_key(|q| q.order_index);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str, order_index: i32) -> QuestionDraft {
        QuestionDraft {
            id: Uuid::new_v4(),
            text: text.to_string(),
            question_type: QuestionType::Text,
            options: Vec::new(),
            is_required: false,
            order_index,
        }
    }

    fn indices(questions: &[QuestionDraft]) -> Vec<i32> {
        questions.iter().map(|q| q.order_index).collect()
    }

    #[test]
    fn add_question_appends_with_next_index() {
        let mut questions = vec![draft("a", 0), draft("b", 1)];
        let id = add_question(&mut questions, QuestionDefaults::Create);

        assert_eq!(questions.len(), 3);
        let added = questions.iter().find(|q| q.id == id).unwrap();
        assert_eq!(added.order_index, 2);
        assert_eq!(added.question_type, QuestionType::Text);
        assert!(added.options.is_empty());
    }

    #[test]
    fn create_and_edit_defaults_differ_on_required() {
        let mut questions = Vec::new();
        add_question(&mut questions, QuestionDefaults::Create);
        add_question(&mut questions, QuestionDefaults::Edit);

        assert!(questions[0].is_required);
        assert!(!questions[1].is_required);
    }

    #[test]
    fn indices_stay_dense_through_edit_sequence() {
        let mut questions = Vec::new();
        for _ in 0..5 {
            add_question(&mut questions, QuestionDefaults::Create);
        }
        let second = questions[1].id;
        let fourth = questions[3].id;

        remove_question(&mut questions, second);
        move_question(&mut questions, fourth, Direction::Up);
        add_question(&mut questions, QuestionDefaults::Edit);
        remove_question(&mut questions, fourth);

        assert_eq!(indices(&questions), vec![0, 1, 2, 3]);
    }

    #[test]
    fn remove_unknown_id_is_a_noop() {
        let mut questions = vec![draft("a", 0), draft("b", 1)];
        let snapshot = questions.clone();
        remove_question(&mut questions, Uuid::new_v4());
        assert_eq!(questions, snapshot);
    }

    #[test]
    fn move_at_boundary_is_a_noop() {
        let mut questions = vec![draft("a", 0), draft("b", 1), draft("c", 2)];
        let first = questions[0].id;
        let last = questions[2].id;
        let snapshot = questions.clone();

        move_question(&mut questions, first, Direction::Up);
        assert_eq!(questions, snapshot);

        move_question(&mut questions, last, Direction::Down);
        assert_eq!(questions, snapshot);
    }

    #[test]
    fn move_swaps_adjacent_pair_and_renumbers() {
        let mut questions = vec![draft("a", 0), draft("b", 1), draft("c", 2)];
        let third = questions[2].id;

        move_question(&mut questions, third, Direction::Up);

        let texts: Vec<&str> = questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c", "b"]);
        assert_eq!(indices(&questions), vec![0, 1, 2]);
    }

    #[test]
    fn sorted_for_display_orders_by_index() {
        let stored = vec![
            Question {
                id: Uuid::new_v4(),
                form_id: Uuid::new_v4(),
                text: "second".into(),
                question_type: QuestionType::Text,
                options: vec![],
                is_required: false,
                order_index: 1,
            },
            Question {
                id: Uuid::new_v4(),
                form_id: Uuid::new_v4(),
                text: "first".into(),
                question_type: QuestionType::Rating,
                options: vec![],
                is_required: true,
                order_index: 0,
            },
        ];

        let ordered = sorted_for_display(&stored);
        let texts: Vec<&str> = ordered.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }
}
