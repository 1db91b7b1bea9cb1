use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::schedule::ScheduleZone;

#[derive(Debug, Clone, PartialEq, Eq)]
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

/// App-level social platform credentials.
///
/// Every field is optional at load time; publishers check for what they need
/// when a publish call starts and fail with a configuration error otherwise.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PlatformCredentials {
    /// Long-lived token, exchanged for a page token before each publish.
    pub page_access_token: Option<String>,
    pub page_id: Option<String>,
    /// Instagram business account id.
    pub ig_user_id: Option<String>,
}

impl std::fmt::Debug for PlatformCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformCredentials")
            .field(
                "page_access_token",
                &self.page_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("page_id", &self.page_id)
            .field("ig_user_id", &self.ig_user_id)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub brand_path: PathBuf,
    pub state_path: PathBuf,
    pub google_api_key: Option<String>,
    pub google_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub credentials: PlatformCredentials,
    pub graph_base_url: String,
    pub user_agent: String,
    pub schedule_hours: Vec<u8>,
    pub schedule_zone: ScheduleZone,
    pub test_interval_secs: u64,
    pub founder_probability: f64,
    pub ig_poll_interval_secs: u64,
    pub ig_poll_max_attempts: u32,
    /// Bearer tokens accepted by the HTTP surface. Empty disables auth in
    /// development; the server refuses to start without keys elsewhere.
    pub api_keys: Vec<String>,
    /// Requests each API key may make per minute.
    pub rate_limit_per_minute: u32,
}

impl AppConfig {
    #[must_use]
    pub fn test_interval(&self) -> Duration {
        Duration::from_secs(self.test_interval_secs)
    }

    #[must_use]
    pub fn ig_poll_interval(&self) -> Duration {
        Duration::from_secs(self.ig_poll_interval_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("brand_path", &self.brand_path)
            .field("state_path", &self.state_path)
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("google_base_url", &self.google_base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("credentials", &self.credentials)
            .field("graph_base_url", &self.graph_base_url)
            .field("user_agent", &self.user_agent)
            .field("schedule_hours", &self.schedule_hours)
            .field("schedule_zone", &self.schedule_zone)
            .field("test_interval_secs", &self.test_interval_secs)
            .field("founder_probability", &self.founder_probability)
            .field("ig_poll_interval_secs", &self.ig_poll_interval_secs)
            .field("ig_poll_max_attempts", &self.ig_poll_max_attempts)
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .finish()
    }
}
