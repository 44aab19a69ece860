pub mod question;
pub mod session;
pub mod statistics;

pub use question::{AnswerOption, PreparedQuestion, Question};
pub use session::{QuizSettings, QuizState, SavedQuiz};
pub use statistics::{QuizHistoryEntry, Statistics};
