use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, info, warn};

use quiz_core::Clock;
use quiz_core::enrich::{Explanation, enrich};
use quiz_core::model::{
    Question, QuestionBank, QuestionDraft, QuizSession, SessionAction, SessionError, SessionPhase,
    SessionSnapshot, SessionSummary, TopicId,
};

use crate::error::QuizError;

/// Callback invoked with the post-transition snapshot after every accepted intent.
pub type SnapshotObserver = Box<dyn FnMut(&SessionSnapshot)>;

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Owns the `QuizSession` for one quiz run and is the only way to mutate it.
///
/// The presentation layer sends the three intents (`select_option`,
/// `check_answer`, `next_question`) and either reads the returned snapshot or
/// subscribes to be notified after each accepted transition.
pub struct QuizSessionController {
    topic_id: TopicId,
    clock: Clock,
    session: QuizSession,
    started_at: DateTime<Utc>,
    summary: Option<SessionSummary>,
    observers: Vec<SnapshotObserver>,
}

impl QuizSessionController {
    /// Starts a session over an already validated bank.
    #[must_use]
    pub fn new(topic_id: TopicId, bank: QuestionBank, clock: Clock) -> Self {
        let started_at = clock.now();
        info!(topic = %topic_id, questions = bank.len(), "quiz session started");
        Self {
            topic_id,
            clock,
            session: QuizSession::new(bank),
            started_at,
            summary: None,
            observers: Vec::new(),
        }
    }

    /// Validates `drafts` and starts a session over them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidQuestionBank` (wrapped in `QuizError`) if
    /// the drafts do not form a valid bank.
    pub fn from_drafts(
        topic_id: TopicId,
        drafts: Vec<QuestionDraft>,
        clock: Clock,
    ) -> Result<Self, QuizError> {
        let bank = QuestionBank::new(drafts).map_err(|err| {
            warn!(topic = %topic_id, error = %err, "could not load quiz");
            SessionError::from(err)
        })?;
        Ok(Self::new(topic_id, bank, clock))
    }

    /// Registers an observer. It is not called for the current state, only for
    /// later transitions.
    pub fn subscribe(&mut self, observer: impl FnMut(&SessionSnapshot) + 'static) {
        self.observers.push(Box::new(observer));
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
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        self.session.current_question()
    }

    #[must_use]
    pub fn progress_fraction(&self) -> f64 {
        self.session.progress_fraction()
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` before the session is completed.
    pub fn final_score_percentage(&self) -> Result<u8, QuizError> {
        Ok(self.session.final_score_percentage()?)
    }

    /// Summary of the run, available once the session is completed.
    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Enriched explanation of the current question, once its answer is checked.
    #[must_use]
    pub fn explanation(&self) -> Option<Explanation> {
        if !self.session.is_answer_checked() {
            return None;
        }
        let was_correct = self
            .session
            .records()
            .last()
            .is_some_and(|record| record.is_correct);
        Some(enrich(self.session.current_question(), was_correct))
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` after the answer is checked,
    /// or `SessionError::IndexOutOfRange` for a bad option index.
    pub fn select_option(&mut self, index: usize) -> Result<SessionSnapshot, QuizError> {
        self.apply(SessionAction::SelectOption, |session| {
            session.select_option(index)
        })
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` without a selection or if the
    /// answer was already checked.
    pub fn check_answer(&mut self) -> Result<SessionSnapshot, QuizError> {
        self.apply(SessionAction::CheckAnswer, |session| {
            let record = session.check_answer()?;
            debug!(
                question = record.question_index,
                selected = record.selected,
                correct = record.is_correct,
                "answer checked"
            );
            Ok(())
        })
    }

    /// Advances, completing the session after the last question.
    ///
    /// The summary is built before the transition is committed, so an error
    /// leaves the session and the observers untouched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the answer is checked.
    pub fn next_question(&mut self) -> Result<SessionSnapshot, QuizError> {
        let summary = self.pending_summary()?;
        let snapshot = self.apply(SessionAction::NextQuestion, |session| {
            session.next_question().map(|_| ())
        })?;

        if let Some(summary) = summary {
            info!(
                topic = %self.topic_id,
                score = summary.score(),
                total = summary.total(),
                percentage = summary.percentage(),
                "quiz session completed"
            );
            self.summary = Some(summary);
        }
        Ok(snapshot)
    }

    /// Summary the next `next_question` would produce, if it completes the run.
    ///
    /// A wall clock that stepped back since the start is clamped to
    /// `started_at`.
    fn pending_summary(&self) -> Result<Option<SessionSummary>, QuizError> {
        let mut staged = self.session.clone();
        if staged.next_question() != Ok(SessionPhase::Completed) {
            return Ok(None);
        }
        let completed_at = self.clock.now().max(self.started_at);
        let summary =
            SessionSummary::from_session(self.topic_id.clone(), self.started_at, completed_at, &staged)?;
        Ok(Some(summary))
    }

    /// Discards progress and starts over on the same bank. Observers stay
    /// subscribed and receive the fresh snapshot.
    pub fn restart(&mut self) -> SessionSnapshot {
        info!(topic = %self.topic_id, "quiz session restarted");
        self.session = QuizSession::new(self.session.bank().clone());
        self.started_at = self.clock.now();
        self.summary = None;
        let snapshot = self.session.snapshot();
        self.notify(&snapshot);
        snapshot
    }

    fn apply<F>(&mut self, action: SessionAction, transition: F) -> Result<SessionSnapshot, QuizError>
    where
        F: FnOnce(&mut QuizSession) -> Result<(), SessionError>,
    {
        if let Err(err) = transition(&mut self.session) {
            warn!(topic = %self.topic_id, %action, error = %err, "intent rejected");
            return Err(err.into());
        }

        let snapshot = self.session.snapshot();
        debug!(
            topic = %self.topic_id,
            %action,
            phase = %snapshot.phase,
            index = snapshot.current_index,
            score = snapshot.score,
            "transition applied"
        );
        self.notify(&snapshot);
        Ok(snapshot)
    }

    fn notify(&mut self, snapshot: &SessionSnapshot) {
        for observer in &mut self.observers {
            observer(snapshot);
        }
    }
}

impl fmt::Debug for QuizSessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSessionController")
            .field("topic_id", &self.topic_id)
            .field("current_index", &self.session.current_index())
            .field("phase", &self.session.phase())
            .field("score", &self.session.score())
            .field("started_at", &self.started_at)
            .field("observers_len", &self.observers.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::enrich::SegmentKind;
    use quiz_core::time::{fixed_clock, fixed_now};

    fn controller() -> QuizSessionController {
        let drafts = vec![
            QuestionDraft::new("O que faz o operador &?", ["valor", "endereço"], 1, "Retorna o endereço."),
            QuestionDraft::new("Quantos bytes tem um char?", ["1", "2"], 0, "Sempre 1."),
        ];
        QuizSessionController::from_drafts(
            TopicId::new("ponteiros").unwrap(),
            drafts,
            fixed_clock(),
        )
        .unwrap()
    }

    #[test]
    fn explanation_only_after_checking() {
        let mut c = controller();
        assert!(c.explanation().is_none());

        c.select_option(0).unwrap();
        assert!(c.explanation().is_none());

        c.check_answer().unwrap();
        let explanation = c.explanation().unwrap();
        assert_eq!(explanation.verdict().label(), "Resposta incorreta.");
        assert!(explanation.segment(SegmentKind::Code).is_some());

        c.next_question().unwrap();
        assert!(c.explanation().is_none());
    }

    #[test]
    fn rejected_intent_does_not_notify() {
        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut c = controller();
        let counter = std::rc::Rc::clone(&calls);
        c.subscribe(move |_| counter.set(counter.get() + 1));

        assert!(c.check_answer().unwrap_err().is_invalid_transition());
        assert_eq!(calls.get(), 0);

        c.select_option(1).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn debug_output_omits_observers() {
        let c = controller();
        let text = format!("{c:?}");
        assert!(text.contains("QuizSessionController"));
        assert!(text.contains("observers_len: 0"));
    }

    #[test]
    fn completion_survives_clock_stepping_back() {
        let snapshots = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut c = controller();
        let sink = std::rc::Rc::clone(&snapshots);
        c.subscribe(move |snapshot| sink.borrow_mut().push(*snapshot));
        c.clock = Clock::fixed(fixed_now() - Duration::minutes(10));

        for option in [1, 0] {
            c.select_option(option).unwrap();
            c.check_answer().unwrap();
            c.next_question().unwrap();
        }

        assert_eq!(c.phase(), SessionPhase::Completed);
        let summary = c.summary().unwrap();
        assert_eq!(summary.started_at(), fixed_now());
        assert_eq!(summary.completed_at(), fixed_now());
        assert_eq!(summary.score(), 2);
        assert!(snapshots.borrow().last().unwrap().is_completed);
    }

    #[test]
    fn rejected_advance_leaves_summary_unset() {
        let mut c = controller();
        assert!(c.next_question().unwrap_err().is_invalid_transition());
        assert_eq!(c.phase(), SessionPhase::AwaitingSelection);
        assert!(c.summary().is_none());
    }
}
