use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::question::PreparedQuestion;
use crate::services::grading;

/// Settings chosen on the setup screen before a session starts.
/// `available_questions` records the pool size at selection time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Validate)]
pub struct QuizSettings {
    #[validate(range(min = 1))]
    pub start_question_number: u32,
    #[validate(range(min = 1))]
    pub number_of_questions: usize,
    pub available_questions: usize,
}

impl QuizSettings {
    /// Rejects settings a session must never be created from. The selector
    /// itself degrades gracefully, so this is the only gate.
    pub fn validate_for_pool(&self, pool_size: usize) -> AppResult<()> {
        if self.number_of_questions == 0 {
            return Err(AppError::ValidationError(
                "Number of questions must be greater than 0".to_string(),
            ));
        }
        if self.number_of_questions > pool_size {
            return Err(AppError::ValidationError(format!(
                "Cannot select more than {} questions",
                pool_size
            )));
        }
        if self.start_question_number < 1 {
            return Err(AppError::ValidationError(
                "Starting question number must be at least 1".to_string(),
            ));
        }
        self.validate()?;
        Ok(())
    }
}

/// The mutable state of one quiz session.
///
/// Transitions with failed preconditions are silent no-ops, mirroring a UI
/// that disables invalid controls. Invariants:
/// - `correct_answers` and `incorrect_answers` are disjoint and together
///   cover exactly the keys of `checked_answers`;
/// - every checked index has a selected answer;
/// - a checked answer is never overwritten.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizState {
    pub questions: Vec<PreparedQuestion>,
    pub current_question_index: usize,
    pub selected_answers: BTreeMap<usize, String>,
    pub checked_answers: BTreeMap<usize, bool>,
    pub correct_answers: Vec<usize>,
    pub incorrect_answers: Vec<usize>,
    pub bookmarked_questions: BTreeSet<usize>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_finished: bool,
}

impl QuizState {
    pub fn new(questions: Vec<PreparedQuestion>) -> Self {
        Self {
            questions,
            current_question_index: 0,
            selected_answers: BTreeMap::new(),
            checked_answers: BTreeMap::new(),
            correct_answers: Vec::new(),
            incorrect_answers: Vec::new(),
            bookmarked_questions: BTreeSet::new(),
            start_time: Utc::now(),
            end_time: None,
            is_finished: false,
        }
    }

    pub fn current_question(&self) -> Option<&PreparedQuestion> {
        self.questions.get(self.current_question_index)
    }

    pub fn is_current_checked(&self) -> bool {
        self.checked_answers
            .contains_key(&self.current_question_index)
    }

    /// Records the user's pick for `index`. Rejected once the index has been
    /// checked (answers lock on check) or after the session finished.
    pub fn select_answer(&mut self, index: usize, answer: &str) {
        if self.is_finished || index >= self.questions.len() {
            return;
        }
        if self.checked_answers.contains_key(&index) {
            return;
        }
        self.selected_answers.insert(index, answer.to_string());
    }

    /// Grades the current question's selected answer. Returns the verdict,
    /// or `None` when nothing was selected, the index was already checked,
    /// or the session finished. A second call on the same index changes
    /// nothing.
    pub fn check_answer(&mut self) -> Option<bool> {
        if self.is_finished {
            return None;
        }
        let index = self.current_question_index;
        if self.checked_answers.contains_key(&index) {
            return None;
        }
        let question = self.questions.get(index)?;
        let selected = self.selected_answers.get(&index)?;

        let is_correct = grading::is_answer_correct(question, selected);
        self.checked_answers.insert(index, is_correct);
        if is_correct {
            self.correct_answers.push(index);
        } else {
            self.incorrect_answers.push(index);
        }
        Some(is_correct)
    }

    /// Moves to the next question, finishing the session when called on the
    /// last index. Returns `true` when this call finished the session.
    pub fn advance(&mut self) -> bool {
        if self.is_finished {
            return false;
        }
        if self.current_question_index + 1 >= self.questions.len() {
            self.finish();
            return true;
        }
        self.current_question_index += 1;
        false
    }

    pub fn retreat(&mut self) {
        if !self.is_finished && self.current_question_index > 0 {
            self.current_question_index -= 1;
        }
    }

    /// Flips the session-local bookmark for `index` and reports the stable
    /// question number so the caller can mirror the toggle into the
    /// persistent bookmark store.
    pub fn toggle_bookmark(&mut self, index: usize) -> Option<u32> {
        if self.is_finished || index >= self.questions.len() {
            return None;
        }
        if !self.bookmarked_questions.remove(&index) {
            self.bookmarked_questions.insert(index);
        }
        Some(self.questions[index].question_number)
    }

    /// Countdown reached zero: finish immediately, whatever the cursor says.
    pub fn expire(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.is_finished {
            self.end_time = Some(Utc::now());
            self.is_finished = true;
        }
    }

    pub fn answered_count(&self) -> usize {
        self.checked_answers.len()
    }

    pub fn correct_count(&self) -> usize {
        self.correct_answers.len()
    }

    pub fn incorrect_count(&self) -> usize {
        self.incorrect_answers.len()
    }

    /// Share of checked questions answered correctly, as shown on the
    /// results screen. 0 when nothing was checked.
    pub fn score_percentage(&self) -> f64 {
        let answered = self.answered_count();
        if answered == 0 {
            return 0.0;
        }
        self.correct_count() as f64 / answered as f64 * 100.0
    }

    pub fn elapsed_seconds(&self) -> u64 {
        match self.end_time {
            Some(end) => (end - self.start_time).num_seconds().max(0) as u64,
            None => 0,
        }
    }

    /// The incorrect questions of this session, in the order they were
    /// checked, for review, export, or a retest.
    pub fn incorrect_questions(&self) -> Vec<PreparedQuestion> {
        self.incorrect_answers
            .iter()
            .filter_map(|&index| self.questions.get(index).cloned())
            .collect()
    }

    pub fn snapshot(&self, settings: QuizSettings, time_remaining: u64) -> SavedQuiz {
        SavedQuiz {
            state: self.clone(),
            settings,
            time_remaining,
        }
    }
}

/// A resumable snapshot of an in-progress session. At most one exists in
/// storage at a time.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SavedQuiz {
    pub state: QuizState,
    pub settings: QuizSettings,
    pub time_remaining: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures::{prepared_pool, test_settings};

    fn in_progress(count: u32) -> QuizState {
        QuizState::new(prepared_pool(count))
    }

    #[test]
    fn settings_reject_zero_questions() {
        let mut settings = test_settings();
        settings.number_of_questions = 0;
        assert!(settings.validate_for_pool(10).is_err());
    }

    #[test]
    fn settings_reject_count_above_pool_size() {
        let mut settings = test_settings();
        settings.number_of_questions = 11;
        let err = settings.validate_for_pool(10).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Cannot select more than 10 questions");
    }

    #[test]
    fn settings_reject_start_below_one() {
        let mut settings = test_settings();
        settings.start_question_number = 0;
        assert!(settings.validate_for_pool(10).is_err());
    }

    #[test]
    fn check_before_select_is_a_no_op() {
        let mut state = in_progress(3);
        assert_eq!(state.check_answer(), None);
        assert!(state.checked_answers.is_empty());
        assert!(state.correct_answers.is_empty());
        assert!(state.incorrect_answers.is_empty());
    }

    #[test]
    fn check_answer_grades_and_partitions() {
        let mut state = in_progress(3);
        let correct = state.questions[0].correct_answer_text.clone();
        state.select_answer(0, &format!("a. {}", correct));

        assert_eq!(state.check_answer(), Some(true));
        assert_eq!(state.checked_answers.get(&0), Some(&true));
        assert_eq!(state.correct_answers, vec![0]);
        assert!(state.incorrect_answers.is_empty());
    }

    #[test]
    fn double_check_changes_nothing() {
        let mut state = in_progress(3);
        state.select_answer(0, "a. Wrong answer");
        assert_eq!(state.check_answer(), Some(false));

        let before = state.clone();
        assert_eq!(state.check_answer(), None);
        assert_eq!(state, before);
    }

    #[test]
    fn selected_answer_locks_once_checked() {
        let mut state = in_progress(3);
        let correct = state.questions[0].correct_answer_text.clone();
        state.select_answer(0, "a. Wrong answer");
        state.check_answer();

        state.select_answer(0, &format!("b. {}", correct));
        assert_eq!(
            state.selected_answers.get(&0).map(String::as_str),
            Some("a. Wrong answer")
        );
    }

    #[test]
    fn advance_walks_forward_and_finishes_on_last_index() {
        let mut state = in_progress(2);
        assert!(!state.advance());
        assert_eq!(state.current_question_index, 1);

        assert!(state.advance());
        assert!(state.is_finished);
        assert!(state.end_time.is_some());
    }

    #[test]
    fn finished_session_ignores_all_transitions() {
        let mut state = in_progress(2);
        state.expire();
        let before = state.clone();

        state.select_answer(0, "a. Anything");
        assert_eq!(state.check_answer(), None);
        assert!(!state.advance());
        state.retreat();
        assert_eq!(state.toggle_bookmark(0), None);
        assert_eq!(state, before);
    }

    #[test]
    fn retreat_stops_at_zero() {
        let mut state = in_progress(3);
        state.retreat();
        assert_eq!(state.current_question_index, 0);

        state.advance();
        state.retreat();
        assert_eq!(state.current_question_index, 0);
    }

    #[test]
    fn double_toggle_restores_bookmark_state() {
        let mut state = in_progress(3);
        assert!(state.bookmarked_questions.is_empty());

        let number = state.toggle_bookmark(1).expect("toggle should apply");
        assert_eq!(number, state.questions[1].question_number);
        assert!(state.bookmarked_questions.contains(&1));

        state.toggle_bookmark(1);
        assert!(state.bookmarked_questions.is_empty());
    }

    #[test]
    fn expire_finishes_regardless_of_position() {
        let mut state = in_progress(5);
        state.advance();
        assert_eq!(state.current_question_index, 1);

        state.expire();
        assert!(state.is_finished);
        assert!(state.end_time.is_some());
        assert_eq!(state.current_question_index, 1);
    }

    #[test]
    fn score_percentage_guards_zero_answered() {
        let state = in_progress(3);
        assert_eq!(state.score_percentage(), 0.0);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut state = in_progress(3);
        state.select_answer(0, "a. Something");
        state.check_answer();
        state.toggle_bookmark(2);

        let snapshot = state.snapshot(test_settings(), 4200);
        let json = serde_json::to_vec(&snapshot).expect("snapshot should serialize");
        let parsed: SavedQuiz =
            serde_json::from_slice(&json).expect("snapshot should deserialize");

        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.time_remaining, 4200);
        assert_eq!(parsed.state.current_question_index, 0);
    }
}
