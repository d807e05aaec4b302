pub mod client;
pub mod error;
pub(crate) mod rate_limit;
pub mod types;

pub use client::{
    FetchStop, LocationResolution, PoiClient, PoiFetch, SearchAnchor, DEFAULT_BASE_URL, MAX_PAGES,
    PAGE_SIZE, UNKNOWN_LOCATION_LABEL,
};
pub use error::ProviderError;
pub use types::{IpLocation, RawPoi};
