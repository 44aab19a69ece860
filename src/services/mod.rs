pub mod grading;
pub mod quiz_runner;
pub mod selection;
pub mod statistics_service;
pub mod time_helpers;

pub use quiz_runner::{QuizEvent, QuizRunner, RunnerStatus};
pub use statistics_service::StatisticsService;
