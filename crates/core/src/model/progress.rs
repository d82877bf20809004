use serde::Serialize;
use std::fmt;

/// Where a session stands in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionPhase {
    /// The current question is waiting for a (possibly tentative) selection.
    AwaitingSelection,
    /// The current answer was graded; the learner may only advance.
    AnswerChecked,
    /// The learner advanced past the last question. Terminal.
    Completed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionPhase::AwaitingSelection => "awaiting selection",
            SessionPhase::AnswerChecked => "answer checked",
            SessionPhase::Completed => "completed",
        })
    }
}

/// Read-only view of a session, handed to the presentation layer after every
/// transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_index: usize,
    pub total: usize,
    pub selected_option: Option<usize>,
    pub is_answer_checked: bool,
    pub score: usize,
    pub is_completed: bool,
    pub progress_fraction: f64,
}

impl SessionSnapshot {
    /// 1-based position label, e.g. `2/5`.
    #[must_use]
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.total)
    }
}
