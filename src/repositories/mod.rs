pub mod bookmark_repository;
pub mod key_value_store;
pub mod question_source;
pub mod saved_quiz_repository;
pub mod statistics_repository;

pub use bookmark_repository::BookmarkRepository;
pub use key_value_store::{FileStore, InMemoryStore, KeyValueStore};
pub use question_source::{export_questions, load_pool, FileQuestionSource, QuestionSource};
pub use saved_quiz_repository::SavedQuizRepository;
pub use statistics_repository::StatisticsRepository;
