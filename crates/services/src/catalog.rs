//! Topic to question-bank lookup table.
//!
//! The catalog is static configuration: it is loaded once at startup from JSON
//! and never changes afterwards.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use quiz_core::Clock;
use quiz_core::model::{QuestionBank, QuestionDraft, TopicId};

use crate::error::CatalogError;
use crate::sessions::QuizSessionController;

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.json");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    topics: Vec<TopicFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TopicFile {
    id: TopicId,
    title: String,
    questions: Vec<QuestionDraft>,
}

/// A lesson section and its question bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    id: TopicId,
    title: String,
    bank: QuestionBank,
}

impl Topic {
    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }
}

/// Read-only, ordered set of topics.
#[derive(Debug, Clone)]
pub struct QuizCatalog {
    topics: Vec<Topic>,
}

impl QuizCatalog {
    /// The catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled JSON is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_CATALOG)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise the same
    /// errors as [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = raw.len(), "read catalog file");
        Self::from_json_str(&raw)
    }

    /// Parses and validates a catalog. Every topic's bank is validated up
    /// front, so a loaded catalog can always start a session.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Json` for malformed JSON, `CatalogError::Empty`
    /// without topics, `CatalogError::DuplicateTopic` for repeated ids and
    /// `CatalogError::Bank` for an invalid question bank.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        if file.topics.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        let mut topics = Vec::with_capacity(file.topics.len());
        for topic in file.topics {
            if !seen.insert(topic.id.clone()) {
                return Err(CatalogError::DuplicateTopic(topic.id));
            }
            let bank = QuestionBank::new(topic.questions).map_err(|source| CatalogError::Bank {
                topic: topic.id.clone(),
                source,
            })?;
            topics.push(Topic {
                id: topic.id,
                title: topic.title,
                bank,
            });
        }

        info!(topics = topics.len(), "quiz catalog loaded");
        Ok(Self { topics })
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    #[must_use]
    pub fn get(&self, id: &TopicId) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.id == id)
    }

    /// First topic in catalog order, used when the host does not pick one.
    #[must_use]
    pub fn first(&self) -> Option<&Topic> {
        self.topics.first()
    }

    /// Starts a new quiz session for `id`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTopic` if the id is not in the catalog.
    pub fn start_session(
        &self,
        id: &TopicId,
        clock: Clock,
    ) -> Result<QuizSessionController, CatalogError> {
        let topic = self
            .get(id)
            .ok_or_else(|| CatalogError::UnknownTopic(id.clone()))?;
        Ok(QuizSessionController::new(
            topic.id.clone(),
            topic.bank.clone(),
            clock,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = QuizCatalog::builtin().unwrap();
        assert!(!catalog.topics().is_empty());
        for topic in catalog.topics() {
            assert!(!topic.title().is_empty());
            assert!(!topic.bank().is_empty());
        }
    }

    #[test]
    fn duplicate_topics_are_rejected() {
        let raw = r#"{"topics": [
            {"id": "a", "title": "A", "questions": [
                {"prompt": "p", "options": ["x"], "correct_index": 0, "explanation": "e"}]},
            {"id": "a", "title": "A2", "questions": [
                {"prompt": "p", "options": ["x"], "correct_index": 0, "explanation": "e"}]}
        ]}"#;
        let err = QuizCatalog::from_json_str(raw).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateTopic(id) if id.as_str() == "a"));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = QuizCatalog::from_json_str(r#"{"topics": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn questions_must_be_a_list() {
        let raw = r#"{"topics": [{"id": "a", "title": "A", "questions": {"prompt": "p"}}]}"#;
        assert!(matches!(
            QuizCatalog::from_json_str(raw).unwrap_err(),
            CatalogError::Json(_)
        ));
    }
}
