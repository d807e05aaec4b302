//! Store-side acquisition workflows: merging provider records (sync) and
//! seeding synthetic restaurants into empty areas (bootstrap).
//!
//! Both run against any [`CandidateStore`] and never update an existing
//! candidate; items either insert or are skipped as duplicates.

use rand::Rng;

use crate::candidates::{Category, GeoPoint, LocationFix, SyncItem};
use crate::store::CandidateStore;
use crate::synth::{default_categories, generate_bootstrap_candidates};

/// Radius inside which an existing candidate marks the area as initialised.
pub const BOOTSTRAP_PROBE_RADIUS_KM: f64 = 1.0;

/// Counts reported by [`sync_items`]. There is no item-level error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub skipped_duplicates: usize,
}

impl SyncReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.inserted + self.skipped_duplicates
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A candidate already exists within the probe radius; nothing was generated.
    AlreadyInitialized,
    Initialized {
        generated: usize,
        inserted: usize,
        seeded_categories: bool,
    },
}

async fn categories_or_seed<S: CandidateStore>(
    store: &S,
) -> Result<(Vec<Category>, bool), S::Error> {
    let categories = store.list_categories().await?;
    if !categories.is_empty() {
        return Ok((categories, false));
    }
    tracing::info!("no categories found; seeding defaults");
    store.insert_categories(&default_categories()).await?;
    Ok((store.list_categories().await?, true))
}

/// Merges `items` into the store under the `(name, address)` dedup rule.
///
/// Syncing the same batch twice leaves the store exactly as syncing it once.
/// Seeds the default categories first when the store has none, so the
/// fallback category always exists.
///
/// # Errors
///
/// Propagates store errors; already-inserted items stay inserted.
pub async fn sync_items<S, R>(
    store: &S,
    items: Vec<SyncItem>,
    rng: &mut R,
) -> Result<SyncReport, S::Error>
where
    S: CandidateStore,
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return Ok(SyncReport::default());
    }

    let (categories, _) = categories_or_seed(store).await?;
    let mut report = SyncReport::default();

    for item in items {
        let name = item.name.clone();
        let candidate = item.into_new_candidate(&categories, rng);
        match store.insert_candidate_if_absent(&candidate).await? {
            Some(id) => {
                tracing::debug!(id, name = %name, "inserted candidate");
                report.inserted += 1;
            }
            None => {
                tracing::debug!(name = %name, "skipped duplicate candidate");
                report.skipped_duplicates += 1;
            }
        }
    }

    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped_duplicates,
        "candidate sync complete"
    );
    Ok(report)
}

/// Populates an empty area around `anchor` with synthetic candidates.
///
/// Idempotent: if any candidate already lies within
/// [`BOOTSTRAP_PROBE_RADIUS_KM`], returns [`BootstrapOutcome::AlreadyInitialized`]
/// without generating anything.
///
/// # Errors
///
/// Propagates store errors.
pub async fn bootstrap_area<S, R>(
    store: &S,
    anchor: GeoPoint,
    rng: &mut R,
) -> Result<BootstrapOutcome, S::Error>
where
    S: CandidateStore,
    R: Rng + ?Sized,
{
    if store
        .any_candidate_within_km(anchor, BOOTSTRAP_PROBE_RADIUS_KM)
        .await?
    {
        tracing::info!(%anchor, "area already initialized; skipping bootstrap");
        return Ok(BootstrapOutcome::AlreadyInitialized);
    }

    let (categories, seeded_categories) = categories_or_seed(store).await?;
    let generated = generate_bootstrap_candidates(anchor, &categories, rng);

    let mut inserted = 0usize;
    for candidate in &generated {
        if store.insert_candidate_if_absent(candidate).await?.is_some() {
            inserted += 1;
        }
    }

    tracing::info!(
        %anchor,
        generated = generated.len(),
        inserted,
        seeded_categories,
        "bootstrapped nearby candidates"
    );
    Ok(BootstrapOutcome::Initialized {
        generated: generated.len(),
        inserted,
        seeded_categories,
    })
}

/// Runs [`bootstrap_area`] around `fix` ahead of a location-based request.
///
/// Returns `None` without touching the store when the fix has no point (a
/// city-only IP fix); there is no anchor to seed around then.
///
/// # Errors
///
/// Propagates store errors.
pub async fn prepare_area<S, R>(
    store: &S,
    fix: &LocationFix,
    rng: &mut R,
) -> Result<Option<BootstrapOutcome>, S::Error>
where
    S: CandidateStore,
    R: Rng + ?Sized,
{
    let Some(anchor) = fix.point else {
        tracing::info!(label = %fix.label, "fix has no point; skipping bootstrap");
        return Ok(None);
    };
    bootstrap_area(store, anchor, rng).await.map(Some)
}

#[cfg(test)]
#[path = "acquisition_test.rs"]
mod tests;
