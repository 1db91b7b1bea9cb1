use crate::app_config::{AppConfig, Environment, PlatformCredentials};
use crate::schedule::ScheduleZone;
use crate::ConfigError;

const DEFAULT_SCHEDULE_HOURS: &str = "8,9,10,11,12,13,14,15,16";

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
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `.env` templates with `KEY=` do not
    // masquerade as configured credentials.
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

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("CAMPAIGN_ENV", "development"));

    let bind_addr = parse_addr("CAMPAIGN_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CAMPAIGN_LOG_LEVEL", "info");
    let brand_path = PathBuf::from(or_default("CAMPAIGN_BRAND_PATH", "./config/brand.yaml"));
    let state_path = PathBuf::from(or_default("CAMPAIGN_STATE_PATH", "./schedule-state.json"));

    let google_api_key = optional("GOOGLE_API_KEY");
    let google_base_url = or_default(
        "CAMPAIGN_GOOGLE_BASE_URL",
        "https://generativelanguage.googleapis.com/v1beta",
    );
    let text_model = or_default("CAMPAIGN_TEXT_MODEL", "gemini-2.5-flash");
    let image_model = or_default("CAMPAIGN_IMAGE_MODEL", "imagen-4.0-generate-001");

    let credentials = PlatformCredentials {
        page_access_token: optional("FB_PAGE_ACCESS_TOKEN"),
        page_id: optional("FB_PAGE_ID"),
        ig_user_id: optional("IG_USER_ID"),
    };
    let graph_base_url = or_default("CAMPAIGN_GRAPH_BASE_URL", "https://graph.facebook.com/v19.0");
    let user_agent = or_default("CAMPAIGN_USER_AGENT", "campaign/0.1 (social-automation)");

    let schedule_hours = parse_schedule_hours(
        "CAMPAIGN_SCHEDULE_HOURS",
        &or_default("CAMPAIGN_SCHEDULE_HOURS", DEFAULT_SCHEDULE_HOURS),
    )?;

    let schedule_zone = {
        let var = "CAMPAIGN_SCHEDULE_TZ";
        or_default(var, "local")
            .parse::<ScheduleZone>()
            .map_err(|reason| invalid(var, reason))?
    };

    let test_interval_secs = parse_u64("CAMPAIGN_TEST_INTERVAL_SECS", "300")?;
    if test_interval_secs == 0 {
        return Err(invalid(
            "CAMPAIGN_TEST_INTERVAL_SECS",
            "interval must be greater than zero".to_string(),
        ));
    }

    let founder_probability = {
        let var = "CAMPAIGN_FOUNDER_PROBABILITY";
        let raw = or_default(var, "0.5");
        let p = raw
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !(0.0..=1.0).contains(&p) {
            return Err(invalid(var, format!("{p} is outside 0.0..=1.0")));
        }
        p
    };

    let ig_poll_interval_secs = parse_u64("CAMPAIGN_IG_POLL_INTERVAL_SECS", "3")?;
    let ig_poll_max_attempts = parse_u32("CAMPAIGN_IG_POLL_MAX_ATTEMPTS", "10")?;
    if ig_poll_max_attempts == 0 {
        return Err(invalid(
            "CAMPAIGN_IG_POLL_MAX_ATTEMPTS",
            "at least one status poll is required".to_string(),
        ));
    }

    let api_keys: Vec<String> = or_default("CAMPAIGN_API_KEYS", "")
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    let rate_limit_per_minute = parse_u32("CAMPAIGN_RATE_LIMIT_PER_MINUTE", "60")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "CAMPAIGN_RATE_LIMIT_PER_MINUTE",
            "limit must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        brand_path,
        state_path,
        google_api_key,
        google_base_url,
        text_model,
        image_model,
        credentials,
        graph_base_url,
        user_agent,
        schedule_hours,
        schedule_zone,
        test_interval_secs,
        founder_probability,
        ig_poll_interval_secs,
        ig_poll_max_attempts,
        api_keys,
        rate_limit_per_minute,
    })
}

/// Parse a comma-separated list of hours-of-day (`0..=23`).
///
/// Duplicates are collapsed and the result is sorted.
fn parse_schedule_hours(var: &str, raw: &str) -> Result<Vec<u8>, ConfigError> {
    let mut hours = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let hour = part.parse::<u8>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("'{part}': {e}"),
        })?;
        if hour > 23 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("hour {hour} is outside 0..=23"),
            });
        }
        hours.push(hour);
    }

    hours.sort_unstable();
    hours.dedup();

    if hours.is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "at least one hour is required".to_string(),
        });
    }
    Ok(hours)
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

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
