use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{QuizHistoryEntry, Statistics};
use crate::repositories::StatisticsRepository;

pub struct StatisticsService {
    repository: Arc<StatisticsRepository>,
}

impl StatisticsService {
    pub fn new(repository: Arc<StatisticsRepository>) -> Self {
        Self { repository }
    }

    pub fn get(&self) -> AppResult<Statistics> {
        self.repository.get()
    }

    /// Folds one finished session into the running history and persists the
    /// updated aggregate. A zero-question session records a score of 0.
    pub fn record_quiz(
        &self,
        total_questions: usize,
        correct_answers: usize,
        time_taken_secs: u64,
    ) -> AppResult<Statistics> {
        let score = if total_questions > 0 {
            correct_answers as f64 / total_questions as f64 * 100.0
        } else {
            0.0
        };

        let entry = QuizHistoryEntry {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            total_questions,
            correct_answers,
            score,
            time_taken: time_taken_secs,
        };

        let mut statistics = self.repository.get()?;
        statistics.append(entry);
        self.repository.put(&statistics)?;

        log::info!(
            "Recorded quiz: {}/{} correct, score {:.1}%, {} quizzes total",
            correct_answers,
            total_questions,
            score,
            statistics.total_quizzes
        );
        Ok(statistics)
    }
}
