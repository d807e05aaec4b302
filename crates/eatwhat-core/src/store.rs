//! The persistence seam used by the acquisition workflows.
//!
//! The store is owned elsewhere (see `eatwhat-db`); the core only needs the
//! handful of operations below. Implementations must enforce the dedup rule
//! in [`CandidateStore::insert_candidate_if_absent`] so concurrent syncs stay
//! idempotent without extra locking.

use std::future::Future;

use crate::candidates::{Candidate, Category, GeoPoint, NewCandidate, NewCategory};

pub trait CandidateStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Categories in stored (creation) order.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send;

    /// Inserts in order, skipping names already stored. Returns only the
    /// categories this call created.
    fn insert_categories(
        &self,
        categories: &[NewCategory],
    ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send;

    fn list_candidates(&self) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send;

    /// Inserts unless a candidate with the same `(name, address)` exists.
    ///
    /// Returns the new id, or `None` when the record was a duplicate.
    fn insert_candidate_if_absent(
        &self,
        candidate: &NewCandidate,
    ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send;

    /// Returns `true` if any stored candidate lies within `radius_km` of `point`.
    fn any_candidate_within_km(
        &self,
        point: GeoPoint,
        radius_km: f64,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;
}
