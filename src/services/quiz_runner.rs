use std::sync::Arc;

use crate::app_state::AppState;
use crate::errors::AppResult;
use crate::models::{Question, QuizSettings, QuizState, SavedQuiz};
use crate::repositories::{BookmarkRepository, SavedQuizRepository};
use crate::services::selection;
use crate::services::statistics_service::StatisticsService;

/// Everything that can happen to a running session. User actions and the
/// countdown tick arrive through the same serialized stream, so session
/// state is only ever mutated from one place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizEvent {
    SelectAnswer(String),
    CheckAnswer,
    NextQuestion,
    PreviousQuestion,
    ToggleBookmark,
    SaveProgress,
    Tick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunnerStatus {
    InProgress,
    Finished,
}

/// Owns one session's state plus its countdown, and applies events one at a
/// time. Completion side effects (statistics, clearing the saved slot) run
/// exactly once, whether the session ends by the last question or by
/// timeout.
pub struct QuizRunner {
    state: QuizState,
    settings: QuizSettings,
    time_remaining: u64,
    saved_quizzes: Arc<SavedQuizRepository>,
    bookmarks: Arc<BookmarkRepository>,
    statistics: Arc<StatisticsService>,
    completed: bool,
}

impl QuizRunner {
    /// Starts a fresh session from the pool. Settings are validated here;
    /// a session never comes into existence from invalid ones.
    pub fn start(app: &AppState, pool: &[Question], settings: QuizSettings) -> AppResult<Self> {
        settings.validate_for_pool(pool.len())?;

        let questions = selection::prepare_questions(
            pool,
            settings.start_question_number,
            settings.number_of_questions,
        );
        log::info!(
            "Starting quiz: {} questions from #{}",
            questions.len(),
            settings.start_question_number
        );

        Ok(Self {
            state: QuizState::new(questions),
            settings,
            time_remaining: app.config.quiz_duration_secs,
            saved_quizzes: app.saved_quizzes.clone(),
            bookmarks: app.bookmarks.clone(),
            statistics: app.statistics.clone(),
            completed: false,
        })
    }

    /// Resumes from a saved snapshot, restoring progress and the remaining
    /// countdown.
    pub fn resume(app: &AppState, saved: SavedQuiz) -> Self {
        log::info!(
            "Resuming quiz at question {} with {}s remaining",
            saved.state.current_question_index + 1,
            saved.time_remaining
        );
        Self {
            state: saved.state,
            settings: saved.settings,
            time_remaining: saved.time_remaining,
            saved_quizzes: app.saved_quizzes.clone(),
            bookmarks: app.bookmarks.clone(),
            statistics: app.statistics.clone(),
            completed: false,
        }
    }

    /// A follow-up session over the incorrect questions of this finished
    /// one, reusing them as already prepared. `None` when there is nothing
    /// to retest.
    pub fn retest_incorrect(&self, duration_secs: u64) -> Option<Self> {
        let incorrect = self.state.incorrect_questions();
        if incorrect.is_empty() {
            return None;
        }

        let settings = QuizSettings {
            start_question_number: incorrect[0].question_number,
            number_of_questions: incorrect.len(),
            available_questions: incorrect.len(),
        };
        Some(Self {
            state: QuizState::new(incorrect),
            settings,
            time_remaining: duration_secs,
            saved_quizzes: self.saved_quizzes.clone(),
            bookmarks: self.bookmarks.clone(),
            statistics: self.statistics.clone(),
            completed: false,
        })
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn settings(&self) -> QuizSettings {
        self.settings
    }

    pub fn time_remaining(&self) -> u64 {
        self.time_remaining
    }

    pub fn status(&self) -> RunnerStatus {
        if self.state.is_finished {
            RunnerStatus::Finished
        } else {
            RunnerStatus::InProgress
        }
    }

    /// Resolves a letter typed by the user to the matching option of the
    /// current question, as displayed.
    pub fn option_for_letter(&self, letter: char) -> Option<String> {
        let question = self.state.current_question()?;
        question
            .options
            .iter()
            .find(|option| option.label.starts_with(letter))
            .map(|option| option.display())
    }

    pub fn handle_event(&mut self, event: QuizEvent) -> AppResult<RunnerStatus> {
        match event {
            QuizEvent::SelectAnswer(answer) => {
                let index = self.state.current_question_index;
                self.state.select_answer(index, &answer);
            }
            QuizEvent::CheckAnswer => {
                self.state.check_answer();
            }
            QuizEvent::NextQuestion => {
                if self.state.advance() {
                    self.complete()?;
                }
            }
            QuizEvent::PreviousQuestion => {
                self.state.retreat();
            }
            QuizEvent::ToggleBookmark => {
                let index = self.state.current_question_index;
                if let Some(question_number) = self.state.toggle_bookmark(index) {
                    // Session toggles mirror into the persistent store; the
                    // store keyed by question number is the source of truth
                    // for the bookmarks view.
                    self.bookmarks.toggle(question_number)?;
                }
            }
            QuizEvent::SaveProgress => {
                if !self.state.is_finished {
                    let snapshot = self.state.snapshot(self.settings, self.time_remaining);
                    self.saved_quizzes.put(&snapshot)?;
                }
            }
            QuizEvent::Tick => {
                // A tick that lands after finish must do nothing.
                if !self.state.is_finished {
                    if self.time_remaining == 0 {
                        log::info!("Time is up, finishing quiz");
                        self.state.expire();
                        self.complete()?;
                    } else {
                        self.time_remaining -= 1;
                    }
                }
            }
        }
        Ok(self.status())
    }

    fn complete(&mut self) -> AppResult<()> {
        if self.completed {
            return Ok(());
        }
        self.completed = true;

        self.saved_quizzes.clear()?;
        self.statistics.record_quiz(
            self.state.questions.len(),
            self.state.correct_count(),
            self.state.elapsed_seconds(),
        )?;
        Ok(())
    }
}
