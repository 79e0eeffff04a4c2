//! Runtime settings, read once at startup from `APP_*` variables and an optional `.env` file.

use std::env;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::appointment::confirmation::DEFAULT_REFERENCE_PREFIX;
use crate::workflows::appointment::lookup::DEFAULT_LOOKUP_LATENCY;
use crate::workflows::appointment::schedule::{
    DEFAULT_BOOKING_HORIZON_DAYS, MAX_BOOKING_HORIZON_DAYS,
};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            environment: var("APP_ENV")
                .map(|value| AppEnvironment::parse(&value))
                .unwrap_or_default(),
            server: ServerConfig::from_env()?,
            telemetry: TelemetryConfig::from_env(),
            booking: BookingConfig::from_env()?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let port = match var("APP_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
        })
    }

    /// `localhost` is accepted as an alias for the IPv4 loopback address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.host
                .parse::<IpAddr>()
                .map_err(|source| ConfigError::InvalidHost {
                    host: self.host.clone(),
                    source,
                })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Directive list for the tracing filter. Blank defers to `RUST_LOG`.
    pub log_level: String,
}

impl TelemetryConfig {
    fn from_env() -> Self {
        Self {
            log_level: var("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

/// Knobs for the booking flow itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfig {
    pub horizon_days: u32,
    pub lookup_latency: Duration,
    pub reference_prefix: String,
    /// Replaces the bundled office table when set.
    pub offices_csv: Option<PathBuf>,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_BOOKING_HORIZON_DAYS,
            lookup_latency: DEFAULT_LOOKUP_LATENCY,
            reference_prefix: DEFAULT_REFERENCE_PREFIX.to_string(),
            offices_csv: None,
        }
    }
}

impl BookingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let horizon_days = match var("APP_BOOKING_HORIZON_DAYS") {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| (1..=MAX_BOOKING_HORIZON_DAYS).contains(days))
                .ok_or(ConfigError::InvalidHorizon { value })?,
            None => defaults.horizon_days,
        };

        let lookup_latency = match var("APP_LOOKUP_LATENCY_MS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidLatency { value })?,
            None => defaults.lookup_latency,
        };

        Ok(Self {
            horizon_days,
            lookup_latency,
            reference_prefix: non_blank("APP_REFERENCE_PREFIX")
                .unwrap_or(defaults.reference_prefix),
            offices_csv: non_blank("APP_OFFICES_CSV").map(PathBuf::from),
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn non_blank(key: &str) -> Option<String> {
    var(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a port number between 0 and 65535, got '{value}'")]
    InvalidPort { value: String },
    #[error("APP_HOST '{host}' is neither localhost nor an IPv4/IPv6 address")]
    InvalidHost {
        host: String,
        #[source]
        source: AddrParseError,
    },
    #[error(
        "APP_BOOKING_HORIZON_DAYS must be a whole number of days between 1 and {MAX_BOOKING_HORIZON_DAYS}, got '{value}'"
    )]
    InvalidHorizon { value: String },
    #[error("APP_LOOKUP_LATENCY_MS must be a whole number of milliseconds, got '{value}'")]
    InvalidLatency { value: String },
}
