//! HTTP client for the POI search and location endpoints.

mod fetch_all;
mod location;

use std::time::Duration;

use eatwhat_core::{AppConfig, GeoPoint, LocationFix, LocationSource};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::ProviderError;
use crate::rate_limit::retry_with_backoff;
use crate::types::{PlaceSearchResponse, RawPoi};

pub use fetch_all::{FetchStop, PoiFetch};
pub use location::{LocationResolution, UNKNOWN_LOCATION_LABEL};

pub const DEFAULT_BASE_URL: &str = "https://restapi.amap.com";

/// Fixed by the provider: a page never holds more than 25 POIs.
pub const PAGE_SIZE: usize = 25;

/// Pages requested per query at most (100 POIs).
pub const MAX_PAGES: u32 = 4;

pub const DEFAULT_KEYWORD: &str = "餐饮";
pub const DEFAULT_TYPES: &str = "050000";

pub(crate) const AROUND_PATH: &str = "/v3/place/around";
pub(crate) const TEXT_PATH: &str = "/v3/place/text";
pub(crate) const REGEO_PATH: &str = "/v3/geocode/regeo";
pub(crate) const IP_PATH: &str = "/v3/ip";

/// Where a search is centred.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchAnchor {
    /// Around a coordinate, within `radius_m` metres.
    Around { point: GeoPoint, radius_m: u32 },
    /// Within a named city, limited to that city.
    City(String),
}

impl SearchAnchor {
    /// GPS fixes search around their point; IP fixes search their city.
    /// `None` for a fix with neither a city nor a point.
    #[must_use]
    pub fn for_fix(fix: &LocationFix, radius_m: u32) -> Option<Self> {
        if let (LocationSource::Ip, Some(city)) = (fix.source, fix.city.as_deref()) {
            return Some(SearchAnchor::City(city.to_string()));
        }
        fix.point.map(|point| SearchAnchor::Around { point, radius_m })
    }
}

impl std::fmt::Display for SearchAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchAnchor::Around { point, radius_m } => write!(f, "{point} r={radius_m}m"),
            SearchAnchor::City(city) => write!(f, "city={city}"),
        }
    }
}

/// Client for the POI search provider and its location services.
///
/// Transient errors (429, network failures, 5xx) are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct PoiClient {
    pub(super) client: Client,
    pub(super) base_url: String,
    api_key: String,
    pub(super) keyword: String,
    pub(super) types: String,
    pub(super) max_retries: u32,
    pub(super) backoff_base_secs: u64,
    pub(super) inter_request_delay_ms: u64,
}

impl std::fmt::Debug for PoiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("keyword", &self.keyword)
            .field("types", &self.types)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl PoiClient {
    /// Creates a client with the given timeout, `User-Agent`, and retry policy,
    /// pointed at [`DEFAULT_BASE_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: impl Into<String>,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            keyword: DEFAULT_KEYWORD.to_string(),
            types: DEFAULT_TYPES.to_string(),
            max_retries,
            backoff_base_secs,
            inter_request_delay_ms: 0,
        })
    }

    /// Builds a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingApiKey`] when no key is configured, or
    /// [`ProviderError::Http`] if the HTTP client cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .poi_api_key
            .clone()
            .ok_or(ProviderError::MissingApiKey)?;
        Ok(Self::new(
            api_key,
            config.provider_request_timeout_secs,
            &config.provider_user_agent,
            config.provider_max_retries,
            config.provider_retry_backoff_base_secs,
        )?
        .with_base_url(&config.poi_base_url)
        .with_search_terms(&config.poi_keyword, &config.poi_types)
        .with_inter_request_delay_ms(config.provider_inter_request_delay_ms))
    }

    /// Points the client at another host (a mock server in tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_search_terms(mut self, keyword: &str, types: &str) -> Self {
        self.keyword = keyword.to_string();
        self.types = types.to_string();
        self
    }

    /// Delay between consecutive page requests of one query.
    #[must_use]
    pub fn with_inter_request_delay_ms(mut self, delay_ms: u64) -> Self {
        self.inter_request_delay_ms = delay_ms;
        self
    }

    /// Fetches one page (1-based) of POIs for `anchor`.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Rejected`] when the provider answers with a failure status.
    /// - [`ProviderError::RateLimited`], [`ProviderError::Http`] or a 5xx
    ///   [`ProviderError::UnexpectedStatus`] after all retries are exhausted.
    /// - [`ProviderError::NotFound`] / other [`ProviderError::UnexpectedStatus`] (not retried).
    /// - [`ProviderError::Deserialize`] when the body is not the expected JSON.
    pub async fn fetch_page(
        &self,
        anchor: &SearchAnchor,
        page: u32,
    ) -> Result<Vec<RawPoi>, ProviderError> {
        let (path, params) = self.search_params(anchor, page);
        let response: PlaceSearchResponse = self.get_json(path, &params).await?;
        if !response.envelope.is_ok() {
            return Err(ProviderError::Rejected {
                endpoint: path.to_string(),
                info: response.envelope.info_or_unknown(),
            });
        }
        Ok(response.pois)
    }

    fn search_params(
        &self,
        anchor: &SearchAnchor,
        page: u32,
    ) -> (&'static str, Vec<(&'static str, String)>) {
        let mut params = vec![
            ("keywords", self.keyword.clone()),
            ("types", self.types.clone()),
        ];
        let path = match anchor {
            SearchAnchor::Around { point, radius_m } => {
                params.push(("location", lng_lat(*point)));
                params.push(("radius", radius_m.to_string()));
                AROUND_PATH
            }
            SearchAnchor::City(city) => {
                params.push(("city", city.clone()));
                params.push(("citylimit", "true".to_string()));
                TEXT_PATH
            }
        };
        params.push(("page", page.to_string()));
        params.push(("offset", PAGE_SIZE.to_string()));
        (path, params)
    }

    /// Builds the request URL for `path`, appending `params` and the API key.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidBaseUrl`] if the base URL does not parse.
    fn endpoint_url(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&format!("{}{path}", self.base_url)).map_err(|e| {
            ProviderError::InvalidBaseUrl {
                base_url: self.base_url.clone(),
                reason: e.to_string(),
            }
        })?;
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in params {
                query.append_pair(k, v);
            }
            query.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// GETs `path` and decodes the JSON body, retrying transient failures.
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = self.endpoint_url(path, params)?;

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ProviderError::RateLimited {
                        endpoint: path.to_string(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ProviderError::NotFound {
                        endpoint: path.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(ProviderError::UnexpectedStatus {
                        status: status.as_u16(),
                        endpoint: path.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| ProviderError::Deserialize {
                    context: path.to_string(),
                    source: e,
                })
            }
        })
        .await
    }
}

/// Formats a point in the provider's `"lng,lat"` order.
pub(crate) fn lng_lat(point: GeoPoint) -> String {
    format!("{:.6},{:.6}", point.lng, point.lat)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
