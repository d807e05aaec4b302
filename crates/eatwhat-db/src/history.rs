//! Database operations for the append-only `history` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// How many entries [`list_history`] returns.
pub const HISTORY_LIMIT: i64 = 50;

/// A history entry joined with the candidate it refers to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HistoryRow {
    pub id: i64,
    pub candidate_id: i64,
    pub candidate_name: String,
    pub rating: Decimal,
    pub price_label: String,
    pub session_id: Option<Uuid>,
    pub rejected_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Input record for one confirmed result.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry<'a> {
    pub user_key: &'a str,
    pub candidate_id: i64,
    pub session_id: Option<Uuid>,
    pub rejected_count: i32,
}

/// Appends a history entry and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, for example when the
/// candidate does not exist.
pub async fn add_history(pool: &PgPool, entry: &NewHistoryEntry<'_>) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO history (user_key, candidate_id, session_id, rejected_count) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(entry.user_key)
    .bind(entry.candidate_id)
    .bind(entry.session_id)
    .bind(entry.rejected_count)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the latest [`HISTORY_LIMIT`] entries for `user_key`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_history(pool: &PgPool, user_key: &str) -> Result<Vec<HistoryRow>, DbError> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        "SELECT h.id, h.candidate_id, c.name AS candidate_name, c.rating, c.price_label, \
                h.session_id, h.rejected_count, h.created_at \
         FROM history h \
         JOIN candidates c ON c.id = h.candidate_id \
         WHERE h.user_key = $1 \
         ORDER BY h.created_at DESC, h.id DESC \
         LIMIT $2",
    )
    .bind(user_key)
    .bind(HISTORY_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
