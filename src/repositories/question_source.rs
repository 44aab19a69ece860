use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{AppError, AppResult};
use crate::models::Question;

/// Where the question pool comes from: the bundled default bank, or bytes
/// the user uploaded as a replacement.
#[cfg_attr(test, mockall::automock)]
pub trait QuestionSource: Send + Sync {
    fn load_default(&self) -> AppResult<Vec<Question>>;
    fn parse_uploaded(&self, bytes: &[u8]) -> AppResult<Vec<Question>>;
}

pub struct FileQuestionSource {
    path: PathBuf,
}

impl FileQuestionSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl QuestionSource for FileQuestionSource {
    fn load_default(&self) -> AppResult<Vec<Question>> {
        let bytes = fs::read(&self.path).map_err(|err| {
            AppError::StorageError(format!(
                "failed to read question file {}: {}",
                self.path.display(),
                err
            ))
        })?;
        self.parse_uploaded(&bytes)
    }

    fn parse_uploaded(&self, bytes: &[u8]) -> AppResult<Vec<Question>> {
        serde_json::from_slice(bytes)
            .map_err(|err| AppError::InvalidQuestionFile(err.to_string()))
    }
}

/// Loads the default pool, degrading a failure to an empty pool. The caller
/// decides what to show; the application never crashes over a missing bank.
pub fn load_pool(source: &dyn QuestionSource) -> Vec<Question> {
    match source.load_default() {
        Ok(questions) => {
            log::info!("Loaded {} questions from the default bank", questions.len());
            questions
        }
        Err(err) => {
            log::error!("Failed to load default questions: {}", err);
            Vec::new()
        }
    }
}

/// Serializes questions into the same JSON layout `parse_uploaded` accepts.
pub fn export_questions(questions: &[Question]) -> AppResult<Vec<u8>> {
    serde_json::to_vec_pretty(questions)
        .map_err(|err| AppError::InternalError(format!("serialize questions: {}", err)))
}
