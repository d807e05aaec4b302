use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// cache-only configuration.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("EATWHAT_ENV", "development"))?;
    let log_level = or_default("EATWHAT_LOG_LEVEL", "info");

    let database_url = optional("DATABASE_URL");
    let poi_api_key = optional("EATWHAT_POI_API_KEY");
    let poi_base_url = or_default("EATWHAT_POI_BASE_URL", "https://restapi.amap.com")
        .trim_end_matches('/')
        .to_string();
    let poi_keyword = or_default("EATWHAT_POI_KEYWORD", "餐饮");
    let poi_types = or_default("EATWHAT_POI_TYPES", "050000");
    let search_radius_m = parse_u32("EATWHAT_SEARCH_RADIUS_M", "2000")?;

    let nearby_radius_km = or_default("EATWHAT_NEARBY_RADIUS_KM", "3")
        .parse::<f64>()
        .map_err(|e| invalid("EATWHAT_NEARBY_RADIUS_KM", e.to_string()))?;
    if !nearby_radius_km.is_finite() || nearby_radius_km <= 0.0 {
        return Err(invalid(
            "EATWHAT_NEARBY_RADIUS_KM",
            format!("must be a positive number of kilometres, got {nearby_radius_km}"),
        ));
    }

    let user_key = or_default("EATWHAT_USER_KEY", "local");
    let cache_path = PathBuf::from(or_default("EATWHAT_CACHE_PATH", "./.eatwhat/cache.json"));

    let db_max_connections = parse_u32("EATWHAT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("EATWHAT_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "EATWHAT_DB_MIN_CONNECTIONS",
            format!("{db_min_connections} exceeds EATWHAT_DB_MAX_CONNECTIONS ({db_max_connections})"),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("EATWHAT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let provider_request_timeout_secs = parse_u64("EATWHAT_PROVIDER_REQUEST_TIMEOUT_SECS", "30")?;
    let provider_user_agent = or_default("EATWHAT_PROVIDER_USER_AGENT", "eatwhat/0.1");
    let provider_max_retries = parse_u32("EATWHAT_PROVIDER_MAX_RETRIES", "3")?;
    let provider_retry_backoff_base_secs =
        parse_u64("EATWHAT_PROVIDER_RETRY_BACKOFF_BASE_SECS", "1")?;
    let provider_inter_request_delay_ms =
        parse_u64("EATWHAT_PROVIDER_INTER_REQUEST_DELAY_MS", "0")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        poi_api_key,
        poi_base_url,
        poi_keyword,
        poi_types,
        search_radius_m,
        nearby_radius_km,
        user_key,
        cache_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        provider_request_timeout_secs,
        provider_user_agent,
        provider_max_retries,
        provider_retry_backoff_base_secs,
        provider_inter_request_delay_ms,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "EATWHAT_ENV".to_string(),
            reason: format!("expected development, test, or production; got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
