//! Domain model and pure logic for the restaurant picker: candidate records,
//! proximity pools, synthetic data, and the store-agnostic sync and
//! bootstrap workflows.

pub mod acquisition;
pub mod app_config;
pub mod candidates;
pub mod config;
pub mod geo;
pub mod pool;
pub mod store;
pub mod synth;

use thiserror::Error;

pub use acquisition::{
    bootstrap_area, prepare_area, sync_items, BootstrapOutcome, SyncReport,
    BOOTSTRAP_PROBE_RADIUS_KM,
};
pub use app_config::{AppConfig, Environment};
pub use candidates::{
    distance_label, Candidate, CandidateFilter, Category, GeoPoint, LocationFix, LocationSource,
    NewCandidate, NewCategory, SyncItem, DEFAULT_CATEGORY_ID, UNKNOWN_LABEL,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{distance_km, distance_m};
pub use pool::{
    AnnotatedPool, EligiblePool, PoolEntry, PoolNotice, ProximityPoolBuilder,
    DEFAULT_NEARBY_RADIUS_KM,
};
pub use store::CandidateStore;
pub use synth::{
    categorize, default_categories, generate_bootstrap_candidates, synthesize_rating,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
