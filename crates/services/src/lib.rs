#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use catalog::{QuizCatalog, Topic};
pub use error::{CatalogError, QuizError};
pub use sessions::{QuizSessionController, SnapshotObserver};
