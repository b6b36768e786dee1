//! Assessment history access.

use word_progress_core::ProficiencyLevel;

use crate::error::{ApiError, Result};
use crate::store::RowStore;

/// Prior assessed levels for a (user, word) pair, oldest first.
///
/// Unknown words are `NotFound`; a known word with no assessments yet has an
/// empty history.
pub async fn load_history<S: RowStore>(
    store: &S,
    user_id: &str,
    word_id: &str,
) -> Result<Vec<ProficiencyLevel>> {
    if !store.word_exists(word_id).await? {
        return Err(ApiError::NotFound(format!("word {word_id}")));
    }
    store.assessment_levels(user_id, word_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_unknown_word_is_not_found() {
        let store = MemoryStore::new();
        let err = load_history(&store, "u1", "missing").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_known_word_without_assessments_is_empty() {
        let store = MemoryStore::new();
        store.add_word("w1");
        assert!(load_history(&store, "u1", "w1").await.unwrap().is_empty());
    }
}
