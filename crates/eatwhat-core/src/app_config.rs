use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Absent when running against the local cache only.
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub poi_api_key: Option<String>,
    pub poi_base_url: String,
    pub poi_keyword: String,
    pub poi_types: String,
    pub search_radius_m: u32,
    pub nearby_radius_km: f64,
    pub user_key: String,
    pub cache_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub provider_request_timeout_secs: u64,
    pub provider_user_agent: String,
    pub provider_max_retries: u32,
    pub provider_retry_backoff_base_secs: u64,
    pub provider_inter_request_delay_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "poi_api_key",
                &self.poi_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("poi_base_url", &self.poi_base_url)
            .field("poi_keyword", &self.poi_keyword)
            .field("poi_types", &self.poi_types)
            .field("search_radius_m", &self.search_radius_m)
            .field("nearby_radius_km", &self.nearby_radius_km)
            .field("user_key", &self.user_key)
            .field("cache_path", &self.cache_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "provider_request_timeout_secs",
                &self.provider_request_timeout_secs,
            )
            .field("provider_user_agent", &self.provider_user_agent)
            .field("provider_max_retries", &self.provider_max_retries)
            .field(
                "provider_retry_backoff_base_secs",
                &self.provider_retry_backoff_base_secs,
            )
            .field(
                "provider_inter_request_delay_ms",
                &self.provider_inter_request_delay_ms,
            )
            .finish()
    }
}
