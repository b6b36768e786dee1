//! In-process row store.
//!
//! Backs the service when no database is configured and drives the tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use word_progress_core::{
    default_strategies, ActionLogEntry, ProficiencyLevel, ReviewScheduleLog, ReviewStrategy,
    ScheduleOutcome, UserWordProgress,
};

use super::{same_version, RowStore};
use crate::error::{ApiError, Result};

type PairKey = (String, String);

#[derive(Default)]
struct Tables {
    words: HashSet<String>,
    progress: HashMap<PairKey, UserWordProgress>,
    strategies: Vec<ReviewStrategy>,
    schedule_logs: Vec<ReviewScheduleLog>,
    assessments: Vec<(PairKey, ProficiencyLevel, DateTime<Utc>)>,
    actions: Vec<ActionLogEntry>,
}

pub struct MemoryStore {
    tables: Mutex<Tables>,
    sink_available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with no strategies.
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            sink_available: AtomicBool::new(true),
        }
    }

    /// Store seeded with the built-in strategy set.
    pub fn with_default_strategies() -> Self {
        let store = Self::new();
        for strategy in default_strategies() {
            store.add_strategy(strategy);
        }
        store
    }

    pub fn add_word(&self, word_id: &str) {
        self.tables.lock().expect("store lock").words.insert(word_id.to_string());
    }

    pub fn add_strategy(&self, strategy: ReviewStrategy) {
        self.tables.lock().expect("store lock").strategies.push(strategy);
    }

    /// Overwrite a progress row directly, bypassing the version check.
    pub fn put_progress(&self, progress: UserWordProgress) {
        let key = (progress.user_id.clone(), progress.word_id.clone());
        self.tables.lock().expect("store lock").progress.insert(key, progress);
    }

    /// Toggle whether log appends succeed.
    pub fn set_sink_available(&self, available: bool) {
        self.sink_available.store(available, Ordering::SeqCst);
    }

    pub fn actions(&self) -> Vec<ActionLogEntry> {
        self.tables.lock().expect("store lock").actions.clone()
    }
}

impl RowStore for MemoryStore {
    async fn word_exists(&self, word_id: &str) -> Result<bool> {
        Ok(self.tables.lock().expect("store lock").words.contains(word_id))
    }

    async fn register_word(&self, word_id: &str, _spelling: Option<&str>) -> Result<()> {
        self.add_word(word_id);
        Ok(())
    }

    async fn get_progress(&self, user_id: &str, word_id: &str) -> Result<Option<UserWordProgress>> {
        let tables = self.tables.lock().expect("store lock");
        Ok(tables
            .progress
            .get(&(user_id.to_string(), word_id.to_string()))
            .cloned())
    }

    async fn list_due_progress(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UserWordProgress>> {
        let tables = self.tables.lock().expect("store lock");
        let mut due: Vec<UserWordProgress> = tables
            .progress
            .values()
            .filter(|p| p.user_id == user_id && p.is_due(now))
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            a.next_review_date
                .cmp(&b.next_review_date)
                .then_with(|| a.word_id.cmp(&b.word_id))
        });
        due.truncate(limit.max(0) as usize);
        Ok(due)
    }

    async fn list_strategies(&self) -> Result<Vec<ReviewStrategy>> {
        Ok(self.tables.lock().expect("store lock").strategies.clone())
    }

    async fn assessment_levels(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Vec<ProficiencyLevel>> {
        let tables = self.tables.lock().expect("store lock");
        Ok(tables
            .assessments
            .iter()
            .filter(|((u, w), _, _)| u == user_id && w == word_id)
            .map(|(_, level, _)| *level)
            .collect())
    }

    async fn schedule_logs(&self, user_id: &str, word_id: &str) -> Result<Vec<ReviewScheduleLog>> {
        let tables = self.tables.lock().expect("store lock");
        Ok(tables
            .schedule_logs
            .iter()
            .filter(|log| log.user_id == user_id && log.word_id == word_id)
            .cloned()
            .collect())
    }

    async fn commit_schedule(
        &self,
        previous: Option<&UserWordProgress>,
        outcome: &ScheduleOutcome,
        level: ProficiencyLevel,
    ) -> Result<()> {
        let mut tables = self.tables.lock().expect("store lock");
        let key = (outcome.progress.user_id.clone(), outcome.progress.word_id.clone());

        let unchanged = match (previous, tables.progress.get(&key)) {
            (None, None) => true,
            (Some(prev), Some(current)) => same_version(prev, current),
            _ => false,
        };
        if !unchanged {
            return Err(ApiError::PersistenceConflict(format!(
                "progress for {}/{} changed concurrently",
                key.0, key.1
            )));
        }

        if !self.sink_available.load(Ordering::SeqCst) {
            return Err(ApiError::SinkUnavailable("schedule log append rejected".to_string()));
        }

        tables.progress.insert(key.clone(), outcome.progress.clone());
        tables.schedule_logs.push(outcome.log.clone());
        tables.assessments.push((key, level, outcome.log.review_time));
        Ok(())
    }

    async fn append_action(&self, entry: &ActionLogEntry) -> Result<()> {
        if !self.sink_available.load(Ordering::SeqCst) {
            return Err(ApiError::SinkUnavailable("action log append rejected".to_string()));
        }
        self.tables.lock().expect("store lock").actions.push(entry.clone());
        Ok(())
    }
}
