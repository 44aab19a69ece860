use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed quiz, recorded at the moment the session finished.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizHistoryEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score: f64,
    pub time_taken: u64,
}

/// Aggregate over all recorded quizzes. History is append-only, oldest
/// first; the average is a full recompute over entry scores.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Statistics {
    pub total_quizzes: u32,
    pub average_score: f64,
    pub history: Vec<QuizHistoryEntry>,
}

impl Statistics {
    pub fn append(&mut self, entry: QuizHistoryEntry) {
        self.history.push(entry);
        self.total_quizzes += 1;

        let total: f64 = self.history.iter().map(|e| e.score).sum();
        self.average_score = total / self.history.len() as f64;
    }
}
