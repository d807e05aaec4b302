//! Database operations for the `favorites` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteToggle {
    Added,
    Removed,
}

impl std::fmt::Display for FavoriteToggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FavoriteToggle::Added => write!(f, "added"),
            FavoriteToggle::Removed => write!(f, "removed"),
        }
    }
}

/// A favorite joined with the candidate it refers to.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FavoriteRow {
    pub id: i64,
    pub candidate_id: i64,
    pub candidate_name: String,
    pub address: String,
    pub rating: Decimal,
    pub price_label: String,
    pub created_at: DateTime<Utc>,
}

/// Removes the favorite if present, otherwise adds it.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the candidate does not exist, or
/// [`DbError::Sqlx`] if a query fails.
pub async fn toggle_favorite(
    pool: &PgPool,
    user_key: &str,
    candidate_id: i64,
) -> Result<FavoriteToggle, DbError> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query(
        "DELETE FROM favorites \
         WHERE user_key = $1 AND candidate_id = $2",
    )
    .bind(user_key)
    .bind(candidate_id)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if removed > 0 {
        tx.commit().await?;
        return Ok(FavoriteToggle::Removed);
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM candidates WHERE id = $1)")
        .bind(candidate_id)
        .fetch_one(&mut *tx)
        .await?;
    if !exists {
        return Err(DbError::NotFound);
    }

    sqlx::query(
        "INSERT INTO favorites (user_key, candidate_id) \
         VALUES ($1, $2) \
         ON CONFLICT (user_key, candidate_id) DO NOTHING",
    )
    .bind(user_key)
    .bind(candidate_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(FavoriteToggle::Added)
}

/// Returns the favorites of `user_key`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_favorites(pool: &PgPool, user_key: &str) -> Result<Vec<FavoriteRow>, DbError> {
    let rows = sqlx::query_as::<_, FavoriteRow>(
        "SELECT f.id, f.candidate_id, c.name AS candidate_name, c.address, c.rating, \
                c.price_label, f.created_at \
         FROM favorites f \
         JOIN candidates c ON c.id = f.candidate_id \
         WHERE f.user_key = $1 \
         ORDER BY f.created_at DESC, f.id DESC",
    )
    .bind(user_key)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
