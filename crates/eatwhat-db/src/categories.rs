//! Database operations for the `categories` table.

use chrono::{DateTime, Utc};
use eatwhat_core::{Category, NewCategory};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            icon: row.icon,
            description: row.description,
        }
    }
}

/// Returns every category in creation order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, DbError> {
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, name, icon, description, created_at \
         FROM categories \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Category::from).collect())
}

/// Inserts `categories` in order inside one transaction and returns the
/// rows it created. Names that already exist are skipped, so concurrent
/// seeding of an empty table cannot duplicate the defaults.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails; nothing is written then.
pub async fn insert_categories(
    pool: &PgPool,
    categories: &[NewCategory],
) -> Result<Vec<Category>, DbError> {
    let mut tx = pool.begin().await?;
    let mut inserted = Vec::with_capacity(categories.len());

    for category in categories {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (name, icon) \
             VALUES ($1, $2) \
             ON CONFLICT (name) DO NOTHING \
             RETURNING id, name, icon, description, created_at",
        )
        .bind(&category.name)
        .bind(&category.icon)
        .fetch_optional(&mut *tx)
        .await?;
        if let Some(row) = row {
            inserted.push(Category::from(row));
        }
    }

    tx.commit().await?;
    Ok(inserted)
}
