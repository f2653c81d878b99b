use crate::app_config::{AppConfig, Environment, ProxyConfig};
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
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::{Ipv4Addr, SocketAddr};

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        or_default(var, default)
            .parse::<u16>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("MLSCRAPE_ENV", "development"));
    let port = parse_u16("PORT", "3000")?;
    let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    let log_level = or_default("MLSCRAPE_LOG_LEVEL", "info");

    let proxy = match lookup("PROXY_HOST").ok().filter(|h| !h.trim().is_empty()) {
        Some(host) => {
            let raw_port =
                lookup("PROXY_PORT").map_err(|_| ConfigError::MissingEnvVar("PROXY_PORT".into()))?;
            let port = raw_port
                .parse::<u16>()
                .map_err(|e| invalid("PROXY_PORT", e.to_string()))?;
            Some(ProxyConfig {
                host: host.trim().to_string(),
                port,
                username: lookup("PROXY_USERNAME").ok().filter(|s| !s.is_empty()),
                password: lookup("PROXY_PASSWORD").ok().filter(|s| !s.is_empty()),
            })
        }
        None => None,
    };

    let test_mode = parse_flag(&or_default("TEST_MODE", "false"));

    let request_timeout_secs = parse_u64("MLSCRAPE_REQUEST_TIMEOUT_SECS", "25")?;
    let max_attempts = parse_u32("MLSCRAPE_MAX_ATTEMPTS", "10")?;
    if max_attempts == 0 {
        return Err(invalid("MLSCRAPE_MAX_ATTEMPTS", "must be at least 1".into()));
    }
    let retry_base_ms = parse_u64("MLSCRAPE_RETRY_BASE_MS", "400")?;
    let retry_max_delay_ms = parse_u64("MLSCRAPE_RETRY_MAX_DELAY_MS", "30000")?;
    let retry_jitter_ms = parse_u64("MLSCRAPE_RETRY_JITTER_MS", "200")?;

    let load_test_requests = parse_usize("MLSCRAPE_LOAD_TEST_REQUESTS", "10")?;
    let load_test_base_url = or_default(
        "MLSCRAPE_LOAD_TEST_BASE_URL",
        &format!("http://127.0.0.1:{port}"),
    )
    .trim_end_matches('/')
    .to_string();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        proxy,
        test_mode,
        request_timeout_secs,
        max_attempts,
        retry_base_ms,
        retry_max_delay_ms,
        retry_jitter_ms,
        load_test_requests,
        load_test_base_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

/// Only the literal `true` (any case) enables a flag.
fn parse_flag(s: &str) -> bool {
    s.trim().eq_ignore_ascii_case("true")
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
