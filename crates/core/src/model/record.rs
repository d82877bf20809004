use serde::Serialize;

/// Outcome of grading one question.
///
/// One record is written per question, at the moment its answer is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub selected: usize,
    pub correct_index: usize,
    pub is_correct: bool,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(question_index: usize, selected: usize, correct_index: usize) -> Self {
        Self {
            question_index,
            selected,
            correct_index,
            is_correct: selected == correct_index,
        }
    }
}

/// Counts the correct answers in a slice of records.
#[must_use]
pub fn count_correct(records: &[AnswerRecord]) -> usize {
    records.iter().filter(|r| r.is_correct).count()
}
