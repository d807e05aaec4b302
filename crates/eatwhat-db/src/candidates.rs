//! Database operations for the `candidates` table.

use chrono::{DateTime, Utc};
use eatwhat_core::{Candidate, GeoPoint, NewCandidate};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `candidates` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub category_id: i64,
    pub rating: Decimal,
    pub price_label: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    pub created_at: DateTime<Utc>,
}

impl From<CandidateRow> for Candidate {
    fn from(row: CandidateRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            category_id: row.category_id,
            rating: row.rating,
            price_label: row.price_label,
            tags: row.tags,
            image_url: row.image_url,
            description: row.description,
            location: GeoPoint::new(row.lat, row.lng),
            distance_meters: None,
        }
    }
}

/// A candidate joined with its category name, for detail views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CandidateDetailRow {
    #[sqlx(flatten)]
    pub candidate: CandidateRow,
    pub category_name: Option<String>,
}

const CANDIDATE_COLUMNS: &str = "c.id, c.name, c.address, c.category_id, c.rating, c.price_label, \
     c.tags, c.image_url, c.description, c.lat, c.lng, c.created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every stored candidate ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_candidates(pool: &PgPool) -> Result<Vec<Candidate>, DbError> {
    let rows = sqlx::query_as::<_, CandidateRow>(&format!(
        "SELECT {CANDIDATE_COLUMNS} FROM candidates c ORDER BY c.id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Candidate::from).collect())
}

/// Returns one candidate with its category name, or `None` if the id is unknown.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_candidate(pool: &PgPool, id: i64) -> Result<Option<CandidateDetailRow>, DbError> {
    let row = sqlx::query_as::<_, CandidateDetailRow>(&format!(
        "SELECT {CANDIDATE_COLUMNS}, cat.name AS category_name \
         FROM candidates c \
         LEFT JOIN categories cat ON cat.id = c.category_id \
         WHERE c.id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts `candidate` unless one with the same `(name, address)` exists.
///
/// Returns the new id, or `None` for a duplicate. The unique constraint does
/// the dedup, so concurrent callers cannot both insert the same place.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_candidate_if_absent(
    pool: &PgPool,
    candidate: &NewCandidate,
) -> Result<Option<i64>, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO candidates \
             (name, address, category_id, rating, price_label, tags, image_url, description, lat, lng) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (name, address) DO NOTHING \
         RETURNING id",
    )
    .bind(&candidate.name)
    .bind(&candidate.address)
    .bind(candidate.category_id)
    .bind(candidate.rating)
    .bind(&candidate.price_label)
    .bind(&candidate.tags)
    .bind(&candidate.image_url)
    .bind(&candidate.description)
    .bind(candidate.location.lat)
    .bind(candidate.location.lng)
    .fetch_optional(pool)
    .await?;

    Ok(id)
}

/// Returns `true` if any stored candidate lies within `radius_km` of `point`,
/// using the same spherical law of cosines as [`eatwhat_core::distance_km`].
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn any_candidate_within_km(
    pool: &PgPool,
    point: GeoPoint,
    radius_km: f64,
) -> Result<bool, DbError> {
    let found = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
             SELECT 1 FROM candidates \
             WHERE 6371.0 * acos(LEAST(1.0, GREATEST(-1.0, \
                   cos(radians($1)) * cos(radians(lat)) * cos(radians(lng) - radians($2)) \
                   + sin(radians($1)) * sin(radians(lat))))) <= $3 \
         )",
    )
    .bind(point.lat)
    .bind(point.lng)
    .bind(radius_km)
    .fetch_one(pool)
    .await?;

    Ok(found)
}
