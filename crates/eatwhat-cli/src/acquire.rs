//! Command handlers that talk to the providers: locate, fetch, sync and
//! bootstrap.
//!
//! Fetch failures never abort a command. A partial or empty result is
//! reported along with the reason pagination stopped, and an empty one never
//! replaces the local snapshot.

use eatwhat_core::{
    bootstrap_area, prepare_area, sync_items, BootstrapOutcome, Candidate, GeoPoint, LocationFix,
};
use eatwhat_db::PgCandidateStore;
use eatwhat_provider::{FetchStop, PoiClient, PoiFetch, SearchAnchor};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cache::CandidateCache;
use crate::context::AppContext;

pub(crate) fn describe_stop(stop: &FetchStop) -> String {
    match stop {
        FetchStop::ShortPage { page, len } => format!("end of results (page {page} held {len})"),
        FetchStop::EmptyPage { page } => format!("end of results (page {page} was empty)"),
        FetchStop::PageLimit => "page limit reached".to_string(),
        FetchStop::Rejected { page, info } => {
            format!("provider rejected page {page}: {info}; kept earlier pages")
        }
        FetchStop::TransportFailure { page, error } => {
            format!("request for page {page} failed: {error}; nothing kept")
        }
    }
}

fn print_fix(fix: &LocationFix) {
    println!("Location: {} ({})", fix.label, fix.source);
    if let Some(point) = fix.point {
        println!("Point:    {point}");
    }
    if let Some(city) = &fix.city {
        println!("City:     {city}");
    }
}

/// Prints candidates as a table in the order given.
pub(crate) fn print_candidates(candidates: &[Candidate]) {
    println!(
        "{:<6}{:<24}{:<8}{:<10}{:<10}ADDRESS",
        "ID", "NAME", "RATING", "PRICE", "DISTANCE"
    );
    for c in candidates {
        let name = if c.name.chars().count() > 20 {
            format!("{}...", c.name.chars().take(20).collect::<String>())
        } else {
            c.name.clone()
        };
        println!(
            "{:<6}{:<24}{:<8}{:<10}{:<10}{}",
            c.id,
            name,
            c.rating,
            c.price_label,
            c.distance_label(),
            c.address
        );
    }
}

async fn fetch_for(
    ctx: &AppContext,
    client: &PoiClient,
    fix: &LocationFix,
) -> anyhow::Result<PoiFetch> {
    let Some(anchor) = SearchAnchor::for_fix(fix, ctx.config.search_radius_m) else {
        anyhow::bail!("location {} has neither a point nor a city to search", fix.label);
    };
    let fetch = client.fetch_all(&anchor).await;
    tracing::info!(
        %anchor,
        count = fetch.len(),
        pages = fetch.pages_requested,
        "fetched POIs"
    );
    Ok(fetch)
}

/// Seeds the area around `fix` when it holds no restaurants yet, so every
/// location-based command sees a populated area.
///
/// # Errors
///
/// Returns an error if a database read or write fails.
pub(crate) async fn prepare_fix_area(
    store: &PgCandidateStore,
    fix: &LocationFix,
    rng: &mut StdRng,
) -> anyhow::Result<()> {
    match prepare_area(store, fix, rng).await? {
        Some(BootstrapOutcome::Initialized {
            generated,
            inserted,
            seeded_categories,
        }) => {
            tracing::info!(
                label = %fix.label,
                generated,
                inserted,
                seeded_categories,
                "area was empty; bootstrapped"
            );
            println!("no restaurants near {} yet; generated {generated}", fix.label);
        }
        Some(BootstrapOutcome::AlreadyInitialized) => {
            tracing::info!(label = %fix.label, "area already initialized");
        }
        None => {}
    }
    Ok(())
}

/// Resolves and prints the active location.
///
/// # Errors
///
/// Returns an error if the provider client cannot be built. An unresolvable
/// location is reported, not returned as an error.
pub(crate) async fn run_locate(ctx: &AppContext, gps: Option<GeoPoint>) -> anyhow::Result<()> {
    let client = ctx.poi_client()?;
    match client.resolve_location(gps).await.fix() {
        Some(fix) => print_fix(fix),
        None => println!("location unavailable; pass --lat/--lng or try again later"),
    }
    Ok(())
}

/// Fetches nearby restaurants and, when any came back, replaces the local
/// snapshot with them. An empty or failed fetch leaves the snapshot alone.
///
/// # Errors
///
/// Returns an error if no location can be resolved or the cache cannot be
/// written.
pub(crate) async fn run_fetch(ctx: &AppContext, gps: Option<GeoPoint>) -> anyhow::Result<()> {
    let client = ctx.poi_client()?;
    let fix = ctx.require_fix(&client, gps).await?;
    let fetch = fetch_for(ctx, &client, &fix).await?;
    let mut rng = StdRng::from_os_rng();

    let candidates: Vec<Candidate> = fetch
        .sync_items()
        .into_iter()
        .zip(1_i64..)
        .map(|(item, id)| item.into_snapshot(id, &mut rng))
        .collect();

    print_fix(&fix);
    let stop = describe_stop(&fetch.stop);
    println!("{stop}");
    if candidates.is_empty() {
        tracing::warn!(stop = %stop, "fetch returned nothing; snapshot kept");
        println!(
            "no restaurants found; kept the previous snapshot at {}",
            ctx.config.cache_path.display()
        );
        return Ok(());
    }

    print_candidates(&candidates);
    ctx.store_cache(&CandidateCache::new(Some(fix), candidates))?;
    println!("snapshot written to {}", ctx.config.cache_path.display());
    Ok(())
}

/// Seeds the area if it is empty, then fetches nearby restaurants and merges
/// them into the database.
///
/// # Errors
///
/// Returns an error if no location can be resolved or a database write fails.
pub(crate) async fn run_sync(ctx: &AppContext, gps: Option<GeoPoint>) -> anyhow::Result<()> {
    let client = ctx.poi_client()?;
    let store = PgCandidateStore::new(ctx.pool().await?);
    let fix = ctx.require_fix(&client, gps).await?;
    let mut rng = StdRng::from_os_rng();

    prepare_fix_area(&store, &fix, &mut rng).await?;

    let fetch = fetch_for(ctx, &client, &fix).await?;
    println!("{}", describe_stop(&fetch.stop));
    let report = sync_items(&store, fetch.sync_items(), &mut rng).await?;

    println!(
        "synced around {}: {} inserted, {} duplicates skipped",
        fix.label, report.inserted, report.skipped_duplicates
    );
    Ok(())
}

/// Seeds synthetic restaurants around the active location if none exist.
///
/// With `--lat/--lng` the provider is not needed; the point is used as is.
///
/// # Errors
///
/// Returns an error if no location can be resolved, the location has no
/// point, or a database write fails.
pub(crate) async fn run_bootstrap(ctx: &AppContext, gps: Option<GeoPoint>) -> anyhow::Result<()> {
    let anchor = match gps {
        Some(point) => point,
        None => {
            let client = ctx.poi_client()?;
            let fix = ctx.require_fix(&client, None).await?;
            let Some(point) = fix.point else {
                anyhow::bail!(
                    "{} resolved to a city without a point; pass --lat/--lng",
                    fix.label
                );
            };
            point
        }
    };

    let store = PgCandidateStore::new(ctx.pool().await?);
    let mut rng = StdRng::from_os_rng();
    match bootstrap_area(&store, anchor, &mut rng).await? {
        BootstrapOutcome::AlreadyInitialized => {
            println!("area around {anchor} already has restaurants; nothing generated");
        }
        BootstrapOutcome::Initialized {
            generated,
            inserted,
            seeded_categories,
        } => {
            if seeded_categories {
                println!("seeded default categories");
            }
            println!("generated {generated} restaurants around {anchor}; {inserted} inserted");
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "acquire_test.rs"]
mod tests;
