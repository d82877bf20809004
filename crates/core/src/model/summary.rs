use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::TopicId;
use crate::model::record::{AnswerRecord, count_correct};
use crate::model::session::{QuizSession, percentage};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("session is not completed")]
    NotCompleted,

    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("score ({score}) does not match correct answers ({correct})")]
    ScoreMismatch { score: usize, correct: usize },
}

/// Result of a completed quiz run, handed to the host once the learner finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    topic_id: TopicId,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total: usize,
    score: usize,
    records: Vec<AnswerRecord>,
}

impl SessionSummary {
    /// Builds a summary from a finished session.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::NotCompleted` for a session still in progress,
    /// `SummaryError::InvalidTimeRange` if `completed_at` precedes `started_at`,
    /// and `SummaryError::ScoreMismatch` if the score disagrees with the
    /// recorded answers.
    pub fn from_session(
        topic_id: TopicId,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        session: &QuizSession,
    ) -> Result<Self, SummaryError> {
        if !session.is_completed() {
            return Err(SummaryError::NotCompleted);
        }
        if completed_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }

        let records = session.records().to_vec();
        let correct = count_correct(&records);
        if correct != session.score() {
            return Err(SummaryError::ScoreMismatch {
                score: session.score(),
                correct,
            });
        }

        Ok(Self {
            topic_id,
            started_at,
            completed_at,
            total: session.total_questions(),
            score: session.score(),
            records,
        })
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        percentage(self.score, self.total)
    }

    #[must_use]
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    /// Indices of the questions answered incorrectly, for a review screen.
    #[must_use]
    pub fn missed_questions(&self) -> Vec<usize> {
        self.records
            .iter()
            .filter(|r| !r.is_correct)
            .map(|r| r.question_index)
            .collect()
    }
}
