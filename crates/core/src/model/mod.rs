mod bank;
mod ids;
mod progress;
mod question;
mod record;
mod session;
mod summary;

pub use bank::{BankError, QuestionBank};
pub use ids::{ParseIdError, TopicId};
pub use progress::{SessionPhase, SessionSnapshot};
pub use question::{Question, QuestionDraft, QuestionError};
pub use record::{AnswerRecord, count_correct};
pub use session::{QuizSession, SessionAction, SessionError, percentage};
pub use summary::{SessionSummary, SummaryError};
