use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let amap_api_key = require("HAULGEO_AMAP_KEY")?;
    let amap_base_url = or_default("HAULGEO_AMAP_BASE_URL", "https://restapi.amap.com/v3");
    let database_url = lookup("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

    let env = parse_environment(&or_default("HAULGEO_ENV", "development"))?;
    let log_level = or_default("HAULGEO_LOG_LEVEL", "info");

    let db_max_connections = parse_var(&lookup, "HAULGEO_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_var(&lookup, "HAULGEO_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_var(&lookup, "HAULGEO_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let provider_timeout_secs = parse_var(&lookup, "HAULGEO_PROVIDER_TIMEOUT_SECS", "10")?;
    let provider_max_retries = parse_var(&lookup, "HAULGEO_PROVIDER_MAX_RETRIES", "2")?;
    let provider_backoff_base_ms = parse_var(&lookup, "HAULGEO_PROVIDER_BACKOFF_BASE_MS", "500")?;
    let reverse_radius_m = parse_var(&lookup, "HAULGEO_REVERSE_RADIUS_M", "1000")?;

    let batch_max_concurrent = parse_var(&lookup, "HAULGEO_BATCH_MAX_CONCURRENT", "5")?;
    let accept_unrecognized_levels =
        parse_var(&lookup, "HAULGEO_ACCEPT_UNRECOGNIZED_LEVELS", "true")?;

    let route_deadline_ms = parse_var(&lookup, "HAULGEO_ROUTE_DEADLINE_MS", "5000")?;
    let route_curve_bias: f64 = parse_var(&lookup, "HAULGEO_ROUTE_CURVE_BIAS", "0.2")?;
    if !route_curve_bias.is_finite() {
        return Err(ConfigError::InvalidEnvVar {
            var: "HAULGEO_ROUTE_CURVE_BIAS".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    let route_samples_per_segment: usize =
        parse_var(&lookup, "HAULGEO_ROUTE_SAMPLES_PER_SEGMENT", "50")?;
    if route_samples_per_segment < 2 {
        return Err(ConfigError::InvalidEnvVar {
            var: "HAULGEO_ROUTE_SAMPLES_PER_SEGMENT".to_string(),
            reason: "must be at least 2".to_string(),
        });
    }

    Ok(AppConfig {
        env,
        log_level,
        amap_api_key,
        amap_base_url,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        provider_timeout_secs,
        provider_max_retries,
        provider_backoff_base_ms,
        reverse_radius_m,
        batch_max_concurrent,
        accept_unrecognized_levels,
        route_deadline_ms,
        route_curve_bias,
        route_samples_per_segment,
    })
}

fn parse_var<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "HAULGEO_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
