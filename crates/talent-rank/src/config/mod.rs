use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub dashboard: DashboardConfig,
    pub session: SessionConfig,
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

        let defaults = DashboardConfig::default();
        let upload_delay = parse_var::<u64>("TALENT_RANK_UPLOAD_DELAY_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.upload_delay);
        let notice_duration = parse_var::<u64>("TALENT_RANK_NOTICE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.notice_duration);
        let min_applicants =
            parse_var::<usize>("TALENT_RANK_MIN_APPLICANTS")?.unwrap_or(defaults.min_applicants);
        let max_applicants =
            parse_var::<usize>("TALENT_RANK_MAX_APPLICANTS")?.unwrap_or(defaults.max_applicants);
        if min_applicants == 0 || min_applicants > max_applicants {
            return Err(ConfigError::InvalidApplicantRange {
                min: min_applicants,
                max: max_applicants,
            });
        }

        let dashboard = DashboardConfig {
            upload_delay,
            notice_duration,
            min_applicants,
            max_applicants,
            dropped_rows: parse_var::<u32>("TALENT_RANK_DROPPED_ROWS")?,
            seed: parse_var::<u64>("TALENT_RANK_SEED")?,
        };

        let session_dir = env::var("TALENT_RANK_SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".talent-rank"));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            dashboard,
            session: SessionConfig { dir: session_dir },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(None),
    }
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the durable session slot lives.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub dir: PathBuf,
}

/// Timing and sizing knobs for the dashboard controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Simulated processing latency before an upload resolves.
    pub upload_delay: Duration,
    /// How long a notification stays visible.
    pub notice_duration: Duration,
    pub min_applicants: usize,
    pub max_applicants: usize,
    /// Rows reported as dropped; `None` follows the validation log length.
    pub dropped_rows: Option<u32>,
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            upload_delay: Duration::from_millis(2000),
            notice_duration: Duration::from_millis(3000),
            min_applicants: 50,
            max_applicants: 200,
            dropped_rows: None,
            seed: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    InvalidApplicantRange { min: usize, max: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a non-negative integer (got '{value}')")
            }
            ConfigError::InvalidApplicantRange { min, max } => write!(
                f,
                "applicant range {min}..={max} is invalid: minimum must be positive and not exceed maximum"
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
            | ConfigError::InvalidApplicantRange { .. } => None,
        }
    }
}
