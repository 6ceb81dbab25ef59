use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

pub const DEFAULT_COLLECTION: &str = "waitlist";
pub const DEFAULT_DEADLINE: &str = "2026-01-30T00:00:00Z";
pub const DEFAULT_SPONSOR_BASE_URL: &str = "https://wdclabs.com";

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub landing: LandingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let store = StoreConfig {
            base_url: non_empty_var("WAITLIST_STORE_URL"),
            api_key: non_empty_var("WAITLIST_STORE_KEY"),
            collection: non_empty_var("WAITLIST_COLLECTION")
                .unwrap_or_else(|| DEFAULT_COLLECTION.to_string()),
            timeout: Duration::from_secs(parse_u64_var("WAITLIST_STORE_TIMEOUT_SECS", 10)?),
        };

        let deadline_raw =
            env::var("COUNTDOWN_DEADLINE").unwrap_or_else(|_| DEFAULT_DEADLINE.to_string());
        let landing = LandingConfig {
            countdown_deadline: parse_deadline(&deadline_raw)?,
            success_dismiss: Duration::from_millis(parse_u64_var("SUCCESS_DISMISS_MS", 2500)?),
            sponsor_base_url: non_empty_var("SPONSOR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SPONSOR_BASE_URL.to_string()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            store,
            landing,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_u64_var(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match non_empty_var(key) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        None => Ok(default),
    }
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DDTHH:MM:SS`, which is read as UTC.
pub fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, ConfigError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| ConfigError::InvalidDeadline {
            value: raw.to_string(),
        })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where waitlist records are written.
///
/// When either the URL or the key is missing the service keeps records in
/// memory instead of talking to the hosted store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub collection: String,
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn remote(&self) -> Option<(&str, &str)> {
        match (&self.base_url, &self.api_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

/// Landing page knobs: cohort deadline, success auto-dismiss, sponsor links.
#[derive(Debug, Clone)]
pub struct LandingConfig {
    pub countdown_deadline: DateTime<Utc>,
    pub success_dismiss: Duration,
    pub sponsor_base_url: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    InvalidDeadline { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
            ConfigError::InvalidDeadline { value } => write!(
                f,
                "COUNTDOWN_DEADLINE '{value}' must be RFC 3339 or YYYY-MM-DDTHH:MM:SS"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidDeadline { .. } => None,
        }
    }
}
