use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::bank::{BankError, QuestionBank};
use crate::model::progress::{SessionPhase, SessionSnapshot};
use crate::model::question::{Question, QuestionDraft};
use crate::model::record::AnswerRecord;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Learner intents and queries that can be rejected by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionAction {
    SelectOption,
    CheckAnswer,
    NextQuestion,
    FinalScore,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionAction::SelectOption => "select an option",
            SessionAction::CheckAnswer => "check the answer",
            SessionAction::NextQuestion => "advance to the next question",
            SessionAction::FinalScore => "read the final score",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("could not load quiz: {0}")]
    InvalidQuestionBank(#[from] BankError),

    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        action: SessionAction,
        phase: SessionPhase,
    },

    #[error("option {index} is out of range (question has {len} options)")]
    IndexOutOfRange { index: usize, len: usize },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner's run through a question bank.
///
/// State only changes through [`select_option`](Self::select_option),
/// [`check_answer`](Self::check_answer) and
/// [`next_question`](Self::next_question). A rejected call leaves the session
/// exactly as it was.
#[derive(Debug, Clone)]
pub struct QuizSession {
    bank: QuestionBank,
    current_index: usize,
    selected_option: Option<usize>,
    is_answer_checked: bool,
    score: usize,
    is_completed: bool,
    records: Vec<AnswerRecord>,
}

impl QuizSession {
    #[must_use]
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            current_index: 0,
            selected_option: None,
            is_answer_checked: false,
            score: 0,
            is_completed: false,
            records: Vec::new(),
        }
    }

    /// Validates the drafts and starts a session over them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidQuestionBank` if the bank is empty or any
    /// question is malformed. No session is produced in that case.
    pub fn from_drafts(drafts: Vec<QuestionDraft>) -> Result<Self, SessionError> {
        Ok(Self::new(QuestionBank::new(drafts)?))
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    #[must_use]
    pub fn is_answer_checked(&self) -> bool {
        self.is_answer_checked
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.bank.len()
    }

    /// Graded answers so far, in question order.
    #[must_use]
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.bank.questions()[self.current_index]
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.is_completed {
            SessionPhase::Completed
        } else if self.is_answer_checked {
            SessionPhase::AnswerChecked
        } else {
            SessionPhase::AwaitingSelection
        }
    }

    /// Records a tentative choice for the current question.
    ///
    /// A new selection replaces the previous one until the answer is checked.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` once the answer is checked or
    /// the session is completed, and `SessionError::IndexOutOfRange` if `index`
    /// does not address an option of the current question.
    pub fn select_option(&mut self, index: usize) -> Result<(), SessionError> {
        self.require(SessionAction::SelectOption, SessionPhase::AwaitingSelection)?;

        let len = self.current_question().option_count();
        if index >= len {
            return Err(SessionError::IndexOutOfRange { index, len });
        }

        self.selected_option = Some(index);
        Ok(())
    }

    /// Grades the current selection, awarding one point if it is correct, and
    /// returns the record appended to the answer log.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` if nothing is selected, the
    /// answer was already checked, or the session is completed.
    pub fn check_answer(&mut self) -> Result<AnswerRecord, SessionError> {
        self.require(SessionAction::CheckAnswer, SessionPhase::AwaitingSelection)?;
        let Some(selected) = self.selected_option else {
            return Err(self.rejected(SessionAction::CheckAnswer));
        };

        let record = AnswerRecord::new(
            self.current_index,
            selected,
            self.current_question().correct_index(),
        );
        if record.is_correct {
            self.score += 1;
        }
        self.is_answer_checked = true;
        self.records.push(record);
        Ok(record)
    }

    /// Advances past a checked question.
    ///
    /// On the last question the session becomes completed and `current_index`
    /// stays put. Returns the phase after the transition.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the current answer has
    /// been checked.
    pub fn next_question(&mut self) -> Result<SessionPhase, SessionError> {
        self.require(SessionAction::NextQuestion, SessionPhase::AnswerChecked)?;

        if self.current_index == self.bank.last_index() {
            self.is_completed = true;
        } else {
            self.current_index += 1;
            self.selected_option = None;
            self.is_answer_checked = false;
        }
        Ok(self.phase())
    }

    /// `(current_index + 1) / total`, always in `(0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress_fraction(&self) -> f64 {
        (self.current_index + 1) as f64 / self.bank.len() as f64
    }

    /// Score as a whole percentage, rounded half up.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` before the session is completed.
    pub fn final_score_percentage(&self) -> Result<u8, SessionError> {
        if !self.is_completed {
            return Err(self.rejected(SessionAction::FinalScore));
        }
        Ok(percentage(self.score, self.bank.len()))
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase(),
            current_index: self.current_index,
            total: self.bank.len(),
            selected_option: self.selected_option,
            is_answer_checked: self.is_answer_checked,
            score: self.score,
            is_completed: self.is_completed,
            progress_fraction: self.progress_fraction(),
        }
    }

    fn require(&self, action: SessionAction, expected: SessionPhase) -> Result<(), SessionError> {
        if self.phase() == expected {
            Ok(())
        } else {
            Err(self.rejected(action))
        }
    }

    fn rejected(&self, action: SessionAction) -> SessionError {
        SessionError::InvalidTransition {
            action,
            phase: self.phase(),
        }
    }
}

/// `round(100 * score / total)` with halves rounded up, in integer arithmetic.
#[must_use]
pub fn percentage(score: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let score = score.min(total);
    let rounded = (score.saturating_mul(200) + total) / total.saturating_mul(2);
    u8::try_from(rounded).unwrap_or(100)
}
