use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::forms::{FormKind, SubmissionFailurePolicy};

pub const DEFAULT_CRM_ENDPOINT: &str = "https://api.hsforms.com";
pub const DEFAULT_PORTAL_ID: &str = "244430724";
pub const DEFAULT_COHORT_FORM_ID: &str = "4d4e2afd-64de-4ed9-bd9b-57b6162ad4d0";
pub const DEFAULT_BENCH_FORM_ID: &str = "2e3b1eeb-c6b9-47fe-b3a2-80123e82f4b0";

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
    pub intake: IntakeConfig,
    pub crm: CrmConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");
        let log_format = LogFormat::parse(&var_or("APP_LOG_FORMAT", "compact"))?;

        let public_url = var_or("APP_PUBLIC_URL", &format!("http://{host}:{port}"));
        let failure_policy = {
            let raw = var_or("CRM_FAILURE_POLICY", "retry");
            SubmissionFailurePolicy::parse(&raw)
                .ok_or(ConfigError::InvalidFailurePolicy { value: raw })?
        };

        let session_idle_ttl_secs = var_or("INTAKE_SESSION_TTL_SECS", "1800")
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidSessionTtl)?;

        let cohort = var_or("CRM_FORM_COHORT", DEFAULT_COHORT_FORM_ID);
        let crm = CrmConfig {
            endpoint: var_or("CRM_ENDPOINT", DEFAULT_CRM_ENDPOINT),
            portal_id: var_or("CRM_PORTAL_ID", DEFAULT_PORTAL_ID),
            forms: CrmFormIds {
                network: var_or("CRM_FORM_NETWORK", &cohort),
                bench: var_or("CRM_FORM_BENCH", DEFAULT_BENCH_FORM_ID),
                cohort,
            },
            timeout_secs: var_or("CRM_TIMEOUT_SECS", "10")
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            intake: IntakeConfig {
                public_url,
                failure_policy,
                session_idle_ttl_secs,
            },
            crm,
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidLogFormat {
                value: other.to_string(),
            }),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Session behavior shared by every form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeConfig {
    /// Base URL the forms are served from; reported to the CRM as the page URI.
    pub public_url: String,
    pub failure_policy: SubmissionFailurePolicy,
    /// Open sessions untouched for this long are dropped from the registry.
    pub session_idle_ttl_secs: u64,
}

impl IntakeConfig {
    pub fn page_uri(&self, form: FormKind) -> String {
        format!("{}/{}", self.public_url.trim_end_matches('/'), form.slug())
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            public_url: "http://127.0.0.1:3000".to_string(),
            failure_policy: SubmissionFailurePolicy::Retry,
            session_idle_ttl_secs: 1800,
        }
    }
}

/// HubSpot forms-integration endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmConfig {
    pub endpoint: String,
    pub portal_id: String,
    pub forms: CrmFormIds,
    pub timeout_secs: u64,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CRM_ENDPOINT.to_string(),
            portal_id: DEFAULT_PORTAL_ID.to_string(),
            forms: CrmFormIds::default(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmFormIds {
    pub cohort: String,
    pub network: String,
    pub bench: String,
}

impl CrmFormIds {
    pub fn for_form(&self, form: FormKind) -> &str {
        match form {
            FormKind::Cohort => &self.cohort,
            FormKind::Network => &self.network,
            FormKind::Bench => &self.bench,
        }
    }
}

impl Default for CrmFormIds {
    fn default() -> Self {
        Self {
            cohort: DEFAULT_COHORT_FORM_ID.to_string(),
            // Network submissions share the cohort form until a dedicated one exists.
            network: DEFAULT_COHORT_FORM_ID.to_string(),
            bench: DEFAULT_BENCH_FORM_ID.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat { value: String },
    InvalidFailurePolicy { value: String },
    InvalidTimeout,
    InvalidSessionTtl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat { value } => {
                write!(f, "APP_LOG_FORMAT must be `compact` or `json`, got '{value}'")
            }
            ConfigError::InvalidFailurePolicy { value } => {
                write!(
                    f,
                    "CRM_FAILURE_POLICY must be `retry` or `acknowledge`, got '{value}'"
                )
            }
            ConfigError::InvalidTimeout => {
                write!(f, "CRM_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidSessionTtl => {
                write!(f, "INTAKE_SESSION_TTL_SECS must be a positive number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat { .. }
            | ConfigError::InvalidFailurePolicy { .. }
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidSessionTtl => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "APP_PUBLIC_URL",
            "CRM_ENDPOINT",
            "CRM_PORTAL_ID",
            "CRM_FORM_COHORT",
            "CRM_FORM_NETWORK",
            "CRM_FORM_BENCH",
            "CRM_TIMEOUT_SECS",
            "CRM_FAILURE_POLICY",
            "INTAKE_SESSION_TTL_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.intake.public_url, "http://127.0.0.1:3000");
        assert_eq!(config.intake.failure_policy, SubmissionFailurePolicy::Retry);
        assert_eq!(config.intake.session_idle_ttl_secs, 1800);
        assert_eq!(config.crm, CrmConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn network_form_falls_back_to_cohort_form() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CRM_FORM_COHORT", "cohort-form");
        env::set_var("CRM_FORM_BENCH", "bench-form");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.crm.forms.for_form(FormKind::Cohort), "cohort-form");
        assert_eq!(config.crm.forms.for_form(FormKind::Network), "cohort-form");
        assert_eq!(config.crm.forms.for_form(FormKind::Bench), "bench-form");
        reset_env();
    }

    #[test]
    fn reads_failure_policy_and_log_format() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CRM_FAILURE_POLICY", "Acknowledge");
        env::set_var("APP_LOG_FORMAT", "json");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(
            config.intake.failure_policy,
            SubmissionFailurePolicy::Acknowledge
        );
        assert_eq!(config.telemetry.format, LogFormat::Json);
        reset_env();
    }

    #[test]
    fn rejects_unknown_failure_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CRM_FAILURE_POLICY", "ignore");
        let error = AppConfig::load().expect_err("policy must be rejected");
        assert!(matches!(error, ConfigError::InvalidFailurePolicy { .. }));
        reset_env();
    }

    #[test]
    fn rejects_zero_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CRM_TIMEOUT_SECS", "0");
        let error = AppConfig::load().expect_err("timeout must be positive");
        assert!(matches!(error, ConfigError::InvalidTimeout));
        reset_env();
    }

    #[test]
    fn reads_session_ttl_and_rejects_zero() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("INTAKE_SESSION_TTL_SECS", "600");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.intake.session_idle_ttl_secs, 600);

        env::set_var("INTAKE_SESSION_TTL_SECS", "0");
        let error = AppConfig::load().expect_err("ttl must be positive");
        assert!(matches!(error, ConfigError::InvalidSessionTtl));
        reset_env();
    }

    #[test]
    fn page_uri_joins_base_and_slug() {
        let intake = IntakeConfig {
            public_url: "https://apply.example.com/".to_string(),
            ..IntakeConfig::default()
        };
        assert_eq!(
            intake.page_uri(FormKind::Bench),
            "https://apply.example.com/bench"
        );
    }
}
