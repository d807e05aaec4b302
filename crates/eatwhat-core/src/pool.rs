//! Proximity partitioning of the candidate set.
//!
//! [`ProximityPoolBuilder::build`] filters, annotates with distance, orders,
//! and flags candidates as nearby. The resulting [`AnnotatedPool`] exposes the
//! nearby subset, the full filtered superset, and [`AnnotatedPool::eligible`],
//! which applies the fallback policy: nearby when non-empty, otherwise the
//! superset plus a [`PoolNotice::NearbyEmptyFallback`].

use std::cmp::Ordering;

use crate::candidates::{Candidate, CandidateFilter, LocationFix};
use crate::geo::distance_km;

pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PoolEntry {
    pub candidate: Candidate,
    pub is_nearby: bool,
}

/// Non-fatal information attached to an eligible pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoolNotice {
    /// Nothing matched within the radius, so the whole filtered set is used.
    NearbyEmptyFallback { radius_km: f64 },
}

impl std::fmt::Display for PoolNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolNotice::NearbyEmptyFallback { radius_km } => write!(
                f,
                "no matching restaurants within {radius_km} km; picking from all matches"
            ),
        }
    }
}

/// The pool a spin draws from.
#[derive(Debug, Clone, PartialEq)]
pub struct EligiblePool {
    pub candidates: Vec<Candidate>,
    pub notice: Option<PoolNotice>,
}

impl EligiblePool {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedPool {
    entries: Vec<PoolEntry>,
    radius_km: f64,
}

impl AnnotatedPool {
    #[must_use]
    pub fn entries(&self) -> &[PoolEntry] {
        &self.entries
    }

    /// Candidates within the radius, in pool order.
    #[must_use]
    pub fn nearby(&self) -> Vec<Candidate> {
        self.entries
            .iter()
            .filter(|e| e.is_nearby)
            .map(|e| e.candidate.clone())
            .collect()
    }

    /// Every candidate that passed the filters, in pool order.
    #[must_use]
    pub fn all_filtered(&self) -> Vec<Candidate> {
        self.entries.iter().map(|e| e.candidate.clone()).collect()
    }

    #[must_use]
    pub fn eligible(&self) -> EligiblePool {
        let nearby = self.nearby();
        if !nearby.is_empty() {
            return EligiblePool {
                candidates: nearby,
                notice: None,
            };
        }

        let all = self.all_filtered();
        if all.is_empty() {
            return EligiblePool {
                candidates: all,
                notice: None,
            };
        }

        tracing::warn!(
            radius_km = self.radius_km,
            count = all.len(),
            "nearby pool empty; falling back to all filtered candidates"
        );
        EligiblePool {
            candidates: all,
            notice: Some(PoolNotice::NearbyEmptyFallback {
                radius_km: self.radius_km,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProximityPoolBuilder {
    radius_km: f64,
}

impl Default for ProximityPoolBuilder {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_NEARBY_RADIUS_KM,
        }
    }
}

impl ProximityPoolBuilder {
    #[must_use]
    pub fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }

    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Filters `candidates`, then annotates and orders them.
    ///
    /// With a reference point, candidates are ordered by ascending distance
    /// and flagged nearby when within the radius. Without one (no fix, or a
    /// city-only fix), they are ordered by descending rating and every
    /// candidate counts as nearby.
    #[must_use]
    pub fn build(
        &self,
        candidates: Vec<Candidate>,
        reference: Option<&LocationFix>,
        filter: &CandidateFilter,
    ) -> AnnotatedPool {
        let origin = reference.and_then(|fix| fix.point);
        let mut entries: Vec<PoolEntry> = candidates
            .into_iter()
            .filter(|c| filter.matches(c))
            .map(|mut candidate| {
                let is_nearby = match origin {
                    Some(point) => {
                        let km = distance_km(point, candidate.location);
                        candidate.distance_meters = Some(km * 1000.0);
                        km <= self.radius_km
                    }
                    None => {
                        candidate.distance_meters = None;
                        true
                    }
                };
                PoolEntry {
                    candidate,
                    is_nearby,
                }
            })
            .collect();

        if origin.is_some() {
            entries.sort_by(|a, b| {
                let da = a.candidate.distance_meters.unwrap_or(f64::INFINITY);
                let db = b.candidate.distance_meters.unwrap_or(f64::INFINITY);
                da.partial_cmp(&db).unwrap_or(Ordering::Equal)
            });
        } else {
            entries.sort_by(|a, b| b.candidate.rating.cmp(&a.candidate.rating));
        }

        tracing::debug!(
            total = entries.len(),
            nearby = entries.iter().filter(|e| e.is_nearby).count(),
            radius_km = self.radius_km,
            "built proximity pool"
        );

        AnnotatedPool {
            entries,
            radius_km: self.radius_km,
        }
    }
}
