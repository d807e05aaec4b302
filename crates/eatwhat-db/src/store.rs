//! Postgres implementation of the core persistence seam.

use eatwhat_core::{Candidate, CandidateStore, Category, GeoPoint, NewCandidate, NewCategory};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone)]
pub struct PgCandidateStore {
    pool: PgPool,
}

impl PgCandidateStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl CandidateStore for PgCandidateStore {
    type Error = DbError;

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        crate::categories::list_categories(&self.pool).await
    }

    async fn insert_categories(&self, categories: &[NewCategory]) -> Result<Vec<Category>, DbError> {
        crate::categories::insert_categories(&self.pool, categories).await
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>, DbError> {
        crate::candidates::list_candidates(&self.pool).await
    }

    async fn insert_candidate_if_absent(
        &self,
        candidate: &NewCandidate,
    ) -> Result<Option<i64>, DbError> {
        crate::candidates::insert_candidate_if_absent(&self.pool, candidate).await
    }

    async fn any_candidate_within_km(
        &self,
        point: GeoPoint,
        radius_km: f64,
    ) -> Result<bool, DbError> {
        crate::candidates::any_candidate_within_km(&self.pool, point, radius_km).await
    }
}
