use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::models::SavedQuiz;
use crate::repositories::KeyValueStore;

const SAVED_QUIZ_KEY: &str = "med_quiz_saved";

/// Single-slot storage for the resumable session snapshot. A new save
/// overwrites the previous one; there is never a queue of snapshots.
pub struct SavedQuizRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SavedQuizRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get(&self) -> AppResult<Option<SavedQuiz>> {
        match self.store.get(SAVED_QUIZ_KEY)? {
            Some(bytes) => {
                let saved = serde_json::from_slice(&bytes).map_err(|err| {
                    AppError::StorageError(format!("corrupt saved quiz snapshot: {}", err))
                })?;
                Ok(Some(saved))
            }
            None => Ok(None),
        }
    }

    pub fn put(&self, saved: &SavedQuiz) -> AppResult<()> {
        let bytes = serde_json::to_vec(saved)
            .map_err(|err| AppError::InternalError(format!("serialize saved quiz: {}", err)))?;
        self.store.set(SAVED_QUIZ_KEY, &bytes)?;
        log::info!(
            "Saved quiz progress at question {} with {}s remaining",
            saved.state.current_question_index + 1,
            saved.time_remaining
        );
        Ok(())
    }

    pub fn clear(&self) -> AppResult<()> {
        self.store.remove(SAVED_QUIZ_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuizState;
    use crate::repositories::InMemoryStore;
    use crate::test_utils::fixtures::{prepared_pool, test_settings};

    fn repository() -> SavedQuizRepository {
        SavedQuizRepository::new(Arc::new(InMemoryStore::new()))
    }

    #[test]
    fn get_on_empty_store_is_none() {
        assert_eq!(repository().get().unwrap(), None);
    }

    #[test]
    fn put_then_get_round_trips_snapshot() {
        let repo = repository();
        let state = QuizState::new(prepared_pool(3));
        let saved = state.snapshot(test_settings(), 1800);

        repo.put(&saved).unwrap();
        assert_eq!(repo.get().unwrap(), Some(saved));
    }

    #[test]
    fn put_overwrites_the_single_slot() {
        let repo = repository();
        let state = QuizState::new(prepared_pool(3));

        repo.put(&state.snapshot(test_settings(), 100)).unwrap();
        repo.put(&state.snapshot(test_settings(), 50)).unwrap();

        assert_eq!(repo.get().unwrap().unwrap().time_remaining, 50);
    }

    #[test]
    fn clear_removes_the_snapshot() {
        let repo = repository();
        let state = QuizState::new(prepared_pool(2));
        repo.put(&state.snapshot(test_settings(), 100)).unwrap();

        repo.clear().unwrap();
        assert_eq!(repo.get().unwrap(), None);
    }

    #[test]
    fn corrupt_snapshot_surfaces_storage_error() {
        let store = Arc::new(InMemoryStore::new());
        store.set("med_quiz_saved", b"not json").unwrap();

        let repo = SavedQuizRepository::new(store);
        assert!(repo.get().is_err());
    }
}
