//! Everything a command needs, built once in `main` and passed down.

use anyhow::Context;
use eatwhat_core::{AppConfig, GeoPoint, ProximityPoolBuilder};
use eatwhat_provider::{LocationResolution, PoiClient};
use sqlx::PgPool;

use crate::cache::CandidateCache;

pub(crate) struct AppContext {
    pub config: AppConfig,
}

impl AppContext {
    pub(crate) fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Connects to Postgres and checks the connection answers. Only
    /// DB-backed commands call this.
    pub(crate) async fn pool(&self) -> anyhow::Result<PgPool> {
        let pool = eatwhat_db::connect_from_app_config(&self.config)
            .await
            .context("failed to connect to the database")?;
        eatwhat_db::ping(&pool)
            .await
            .context("database did not answer a health check")?;
        Ok(pool)
    }

    pub(crate) fn poi_client(&self) -> anyhow::Result<PoiClient> {
        PoiClient::from_app_config(&self.config)
            .context("EATWHAT_POI_API_KEY must be set to reach the POI provider")
    }

    pub(crate) fn pool_builder(&self) -> ProximityPoolBuilder {
        ProximityPoolBuilder::new(self.config.nearby_radius_km)
    }

    pub(crate) fn load_cache(&self) -> anyhow::Result<Option<CandidateCache>> {
        CandidateCache::load(&self.config.cache_path)
    }

    pub(crate) fn store_cache(&self, cache: &CandidateCache) -> anyhow::Result<()> {
        cache.store(&self.config.cache_path)
    }

    /// Resolves the active location through the provider, bailing when
    /// neither the GPS point nor the IP lookup produced a fix.
    pub(crate) async fn require_fix(
        &self,
        client: &PoiClient,
        gps: Option<GeoPoint>,
    ) -> anyhow::Result<eatwhat_core::LocationFix> {
        match client.resolve_location(gps).await {
            LocationResolution::Fix(fix) => Ok(fix),
            LocationResolution::Unavailable => anyhow::bail!(
                "could not determine a location; pass --lat/--lng or try again later"
            ),
        }
    }
}
