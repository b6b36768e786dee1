//! Row store abstraction used by the services.
//!
//! Implementations own no business logic. The one behavioral requirement is
//! `commit_schedule`: the progress write, the schedule-log append and the
//! assessment append land together or not at all, and the progress write
//! only succeeds if the stored row is still the one the decision was
//! computed from.

pub mod memory;

use std::future::Future;

use chrono::{DateTime, Utc};
use word_progress_core::{
    ActionLogEntry, ProficiencyLevel, ReviewScheduleLog, ReviewStrategy, ScheduleOutcome,
    UserWordProgress,
};

use crate::error::Result;

pub use memory::MemoryStore;

pub trait RowStore: Send + Sync + 'static {
    /// Whether the word is in the catalog.
    fn word_exists(&self, word_id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Add a word to the catalog. Existing words are left untouched.
    fn register_word(
        &self,
        word_id: &str,
        spelling: Option<&str>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn get_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> impl Future<Output = Result<Option<UserWordProgress>>> + Send;

    /// Progress rows due at `now`, earliest first.
    fn list_due_progress(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<UserWordProgress>>> + Send;

    fn list_strategies(&self) -> impl Future<Output = Result<Vec<ReviewStrategy>>> + Send;

    /// Assessed levels for the pair, oldest first.
    fn assessment_levels(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> impl Future<Output = Result<Vec<ProficiencyLevel>>> + Send;

    fn schedule_logs(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> impl Future<Output = Result<Vec<ReviewScheduleLog>>> + Send;

    /// Atomically write the updated progress row, its schedule-log entry and
    /// the assessed level.
    ///
    /// `previous` is the row the outcome was computed from (`None` for a
    /// first schedule). Fails with `PersistenceConflict` if the stored row
    /// changed since, and with `SinkUnavailable` if the log append fails.
    fn commit_schedule(
        &self,
        previous: Option<&UserWordProgress>,
        outcome: &ScheduleOutcome,
        level: ProficiencyLevel,
    ) -> impl Future<Output = Result<()>> + Send;

    fn append_action(&self, entry: &ActionLogEntry) -> impl Future<Output = Result<()>> + Send;
}

/// Whether two snapshots of the same progress row are the same version.
pub(crate) fn same_version(a: &UserWordProgress, b: &UserWordProgress) -> bool {
    a.last_review_date == b.last_review_date && a.reviewed_times == b.reviewed_times
}
