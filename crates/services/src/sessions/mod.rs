mod controller;

// Public API of the session subsystem.
pub use controller::{QuizSessionController, SnapshotObserver};
