use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::repositories::KeyValueStore;

const BOOKMARKS_KEY: &str = "med_quiz_bookmarks";

/// Long-lived bookmarks, keyed by stable question number. Survives across
/// sessions, unlike the session-local index set in `QuizState`.
pub struct BookmarkRepository {
    store: Arc<dyn KeyValueStore>,
}

impl BookmarkRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Bookmarked question numbers, in the order they were added.
    pub fn get(&self) -> AppResult<Vec<u32>> {
        match self.store.get(BOOKMARKS_KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
                AppError::StorageError(format!("corrupt bookmarks blob: {}", err))
            }),
            None => Ok(Vec::new()),
        }
    }

    pub fn put(&self, bookmarks: &[u32]) -> AppResult<()> {
        let bytes = serde_json::to_vec(bookmarks)
            .map_err(|err| AppError::InternalError(format!("serialize bookmarks: {}", err)))?;
        self.store.set(BOOKMARKS_KEY, &bytes)
    }

    /// Adds the question number if absent, removes it if present. Returns
    /// the updated list.
    pub fn toggle(&self, question_number: u32) -> AppResult<Vec<u32>> {
        let mut bookmarks = self.get()?;
        match bookmarks.iter().position(|&n| n == question_number) {
            Some(index) => {
                bookmarks.remove(index);
            }
            None => bookmarks.push(question_number),
        }
        self.put(&bookmarks)?;
        Ok(bookmarks)
    }

    pub fn clear(&self) -> AppResult<()> {
        self.put(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryStore;

    fn repository() -> BookmarkRepository {
        BookmarkRepository::new(Arc::new(InMemoryStore::new()))
    }

    #[test]
    fn empty_store_yields_no_bookmarks() {
        assert!(repository().get().unwrap().is_empty());
    }

    #[test]
    fn toggle_adds_then_removes() {
        let repo = repository();

        assert_eq!(repo.toggle(42).unwrap(), vec![42]);
        assert_eq!(repo.get().unwrap(), vec![42]);

        assert!(repo.toggle(42).unwrap().is_empty());
        assert!(repo.get().unwrap().is_empty());
    }

    #[test]
    fn toggle_preserves_insertion_order() {
        let repo = repository();
        repo.toggle(5).unwrap();
        repo.toggle(2).unwrap();
        repo.toggle(9).unwrap();
        repo.toggle(2).unwrap();

        assert_eq!(repo.get().unwrap(), vec![5, 9]);
    }

    #[test]
    fn clear_empties_the_set_but_keeps_the_key_readable() {
        let repo = repository();
        repo.toggle(1).unwrap();
        repo.toggle(2).unwrap();

        repo.clear().unwrap();
        assert!(repo.get().unwrap().is_empty());
    }
}
