//! Shared error types for the services crate.

use std::path::PathBuf;

use thiserror::Error;

use quiz_core::model::{BankError, SessionError, SummaryError, TopicId};

/// Errors emitted by `QuizSessionController`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Summary(#[from] SummaryError),
}

impl QuizError {
    /// True for intents rejected because of ordering (a presentation bug).
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            QuizError::Session(SessionError::InvalidTransition { .. })
        )
    }
}

/// Errors emitted while loading or querying a `QuizCatalog`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog: {0}")]
    Json(#[from] serde_json::Error),
    #[error("catalog has no topics")]
    Empty,
    #[error("topic {0} is defined more than once")]
    DuplicateTopic(TopicId),
    #[error("unknown topic: {0}")]
    UnknownTopic(TopicId),
    #[error("could not load quiz for topic {topic}: {source}")]
    Bank {
        topic: TopicId,
        #[source]
        source: BankError,
    },
}
