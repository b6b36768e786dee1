//! Request bodies and progress rows for the integration tests.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use word_progress_backend::models::{ProficiencyLevel, UserWordProgress};

pub fn start_assessment_request(user_id: &str, word_id: &str) -> Value {
    json!({ "user_id": user_id, "word_id": word_id })
}

pub fn answer_request(success: bool) -> Value {
    json!({ "success": success })
}

pub fn schedule_request(user_id: &str, word_id: &str, level: i64) -> Value {
    json!({ "user_id": user_id, "word_id": word_id, "level": level })
}

pub fn action_request(
    user_id: &str,
    word_id: &str,
    action_type: &str,
    success: Option<bool>,
) -> Value {
    json!({
        "user_id": user_id,
        "word_id": word_id,
        "action_type": action_type,
        "success": success,
        "metadata": { "client": "test" },
    })
}

/// A progress row that was last scheduled to come back at `next`.
pub fn scheduled_progress(user_id: &str, word_id: &str, next: DateTime<Utc>) -> UserWordProgress {
    let mut progress = UserWordProgress::new(user_id, word_id, false);
    progress.proficiency_level = ProficiencyLevel::L1;
    progress.strategy_id = Some("traditional-fresh".to_string());
    progress.start_date = Some(next - chrono::Duration::days(3));
    progress.last_review_date = Some(next - chrono::Duration::days(1));
    progress.next_review_date = Some(next);
    progress.reviewed_times = Some(1);
    progress
}
