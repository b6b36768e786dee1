//! PostgreSQL row store

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool};
use word_progress_core::ScheduleOutcome;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::store::RowStore;

/// Database wrapper with connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL and create connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ApiError::Migration(e.to_string()))?;
        Ok(())
    }
}

impl RowStore for Database {
    // === Word Catalog ===

    async fn word_exists(&self, word_id: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM words WHERE id = $1)")
            .bind(word_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn register_word(&self, word_id: &str, spelling: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO words (id, spelling)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(word_id)
        .bind(spelling)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // === Progress Repository ===

    async fn get_progress(&self, user_id: &str, word_id: &str) -> Result<Option<UserWordProgress>> {
        let row = sqlx::query_as::<_, DbUserWordProgress>(
            r#"
            SELECT user_id, word_id, is_long_difficult, proficiency_level, strategy_id,
                   start_date, last_review_date, next_review_date, reviewed_times, review_config
            FROM user_word_progress
            WHERE user_id = $1 AND word_id = $2
            "#,
        )
        .bind(user_id)
        .bind(word_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.to_core()).transpose()
    }

    async fn list_due_progress(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UserWordProgress>> {
        let rows = sqlx::query_as::<_, DbUserWordProgress>(
            r#"
            SELECT user_id, word_id, is_long_difficult, proficiency_level, strategy_id,
                   start_date, last_review_date, next_review_date, reviewed_times, review_config
            FROM user_word_progress
            WHERE user_id = $1 AND next_review_date <= $2
            ORDER BY next_review_date, word_id
            LIMIT $3
            "#,
        )
        .bind(user_id)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(|r| r.to_core()).collect()
    }

    // === Strategy Repository ===

    async fn list_strategies(&self) -> Result<Vec<ReviewStrategy>> {
        let rows = sqlx::query_as::<_, DbReviewStrategy>(
            r#"
            SELECT id, strategy_type, strategy_name, applicable_condition, interval_rule, algorithm
            FROM review_strategies
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.to_core()).collect()
    }

    // === History Repository ===

    async fn assessment_levels(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Vec<ProficiencyLevel>> {
        let levels: Vec<i16> = sqlx::query_scalar(
            r#"
            SELECT level
            FROM word_assessments
            WHERE user_id = $1 AND word_id = $2
            ORDER BY assessed_at, id
            "#,
        )
        .bind(user_id)
        .bind(word_id)
        .fetch_all(&self.pool)
        .await?;

        levels
            .into_iter()
            .map(|level| ProficiencyLevel::try_from(level as i64).map_err(ApiError::from))
            .collect()
    }

    async fn schedule_logs(&self, user_id: &str, word_id: &str) -> Result<Vec<ReviewScheduleLog>> {
        let rows = sqlx::query_as::<_, DbReviewScheduleLog>(
            r#"
            SELECT id, user_id, word_id, review_time, schedule_days, next_review_time,
                   strategy_id, review_config, review_log
            FROM review_schedule_logs
            WHERE user_id = $1 AND word_id = $2
            ORDER BY review_time, id
            "#,
        )
        .bind(user_id)
        .bind(word_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.to_core()).collect())
    }

    // === Scheduling Commit ===

    async fn commit_schedule(
        &self,
        previous: Option<&UserWordProgress>,
        outcome: &ScheduleOutcome,
        level: ProficiencyLevel,
    ) -> Result<()> {
        let row = DbUserWordProgress::from_core(&outcome.progress);
        let mut tx = self.pool.begin().await?;

        let written = match previous {
            None => sqlx::query(
                r#"
                INSERT INTO user_word_progress (user_id, word_id, is_long_difficult,
                                                proficiency_level, strategy_id, start_date,
                                                last_review_date, next_review_date,
                                                reviewed_times, review_config)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (user_id, word_id) DO NOTHING
                "#,
            )
            .bind(&row.user_id)
            .bind(&row.word_id)
            .bind(row.is_long_difficult)
            .bind(row.proficiency_level)
            .bind(&row.strategy_id)
            .bind(row.start_date)
            .bind(row.last_review_date)
            .bind(row.next_review_date)
            .bind(row.reviewed_times)
            .bind(&row.review_config)
            .execute(&mut *tx)
            .await?
            .rows_affected(),
            Some(prev) => sqlx::query(
                r#"
                UPDATE user_word_progress
                SET is_long_difficult = $3,
                    proficiency_level = $4,
                    strategy_id = $5,
                    start_date = $6,
                    last_review_date = $7,
                    next_review_date = $8,
                    reviewed_times = $9,
                    review_config = $10
                WHERE user_id = $1 AND word_id = $2
                  AND last_review_date IS NOT DISTINCT FROM $11
                  AND reviewed_times IS NOT DISTINCT FROM $12
                "#,
            )
            .bind(&row.user_id)
            .bind(&row.word_id)
            .bind(row.is_long_difficult)
            .bind(row.proficiency_level)
            .bind(&row.strategy_id)
            .bind(row.start_date)
            .bind(row.last_review_date)
            .bind(row.next_review_date)
            .bind(row.reviewed_times)
            .bind(&row.review_config)
            .bind(prev.last_review_date)
            .bind(prev.reviewed_times.map(|n| n as i32))
            .execute(&mut *tx)
            .await?
            .rows_affected(),
        };

        if written == 0 {
            tx.rollback().await?;
            return Err(ApiError::PersistenceConflict(format!(
                "progress for {}/{} changed concurrently",
                row.user_id, row.word_id
            )));
        }

        let log = &outcome.log;
        sqlx::query(
            r#"
            INSERT INTO review_schedule_logs (user_id, word_id, review_time, schedule_days,
                                              next_review_time, strategy_id, review_config,
                                              review_log)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&log.user_id)
        .bind(&log.word_id)
        .bind(log.review_time)
        .bind(log.schedule_days)
        .bind(log.next_review_time)
        .bind(&log.strategy_id)
        .bind(&log.review_config)
        .bind(&log.review_log)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::SinkUnavailable(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO word_assessments (user_id, word_id, level, assessed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&log.user_id)
        .bind(&log.word_id)
        .bind(level.value() as i16)
        .bind(log.review_time)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::SinkUnavailable(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| ApiError::SinkUnavailable(e.to_string()))?;

        Ok(())
    }

    // === Action Log ===

    async fn append_action(&self, entry: &ActionLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO action_logs (user_id, word_id, action_type, success, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&entry.user_id)
        .bind(&entry.word_id)
        .bind(entry.action_type.as_str())
        .bind(entry.success)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::SinkUnavailable(e.to_string()))?;

        Ok(())
    }
}
