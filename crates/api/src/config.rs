use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    /// Email transport configuration
    #[serde(default)]
    pub email: EmailConfig,
    /// Scheduled expiry scan configuration
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Email transport configuration for expiry notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Whether email sending is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Email provider: smtp, sendgrid, or console (for development)
    #[serde(default = "default_email_provider")]
    pub provider: String,

    /// SMTP server host (for smtp provider)
    #[serde(default)]
    pub smtp_host: String,

    /// SMTP server port (for smtp provider)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username (for smtp provider)
    #[serde(default)]
    pub smtp_username: String,

    /// SMTP password (for smtp provider)
    #[serde(default)]
    pub smtp_password: String,

    /// Whether to use STARTTLS for SMTP (default: true)
    #[serde(default = "default_smtp_tls")]
    pub smtp_use_tls: bool,

    /// SendGrid API key (for sendgrid provider)
    #[serde(default)]
    pub sendgrid_api_key: String,

    /// Sender email address (From header)
    #[serde(default = "default_sender_email")]
    pub sender_email: String,

    /// Sender name (From header)
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_email_provider(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            smtp_use_tls: default_smtp_tls(),
            sendgrid_api_key: String::new(),
            sender_email: default_sender_email(),
            sender_name: default_sender_name(),
        }
    }
}

/// Scheduled expiry scan configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Whether the scheduled scan job runs (the HTTP trigger always works)
    #[serde(default = "default_scan_enabled")]
    pub enabled: bool,

    /// Interval between scan passes (default: daily)
    #[serde(default = "default_scan_interval_minutes")]
    pub interval_minutes: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: default_scan_enabled(),
            interval_minutes: default_scan_interval_minutes(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "json".into()
}
fn default_email_provider() -> String {
    // Console logging for development
    "console".into()
}
fn default_smtp_port() -> u16 {
    // TLS submission port
    587
}
fn default_smtp_tls() -> bool {
    true
}
fn default_sender_email() -> String {
    "noreply@licenseportal.app".into()
}
fn default_sender_name() -> String {
    "License Portal".into()
}
fn default_scan_enabled() -> bool {
    true
}
fn default_scan_interval_minutes() -> u64 {
    // Daily
    1440
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with LP__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let sources = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("LP").separator("__"))
            .build()?;

        let config: Self = sources.try_deserialize()?;
        config
            .validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "database.url".to_string(),
            ));
        }

        match self.email.provider.as_str() {
            "console" | "smtp" | "sendgrid" => {}
            other => {
                return Err(ConfigValidationError::InvalidValue(format!(
                    "email.provider: unknown provider '{other}'"
                )))
            }
        }

        if self.email.enabled && self.email.provider == "smtp" && self.email.smtp_host.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "email.smtp_host".to_string(),
            ));
        }

        if self.email.enabled
            && self.email.provider == "sendgrid"
            && self.email.sendgrid_api_key.is_empty()
        {
            return Err(ConfigValidationError::MissingRequired(
                "email.sendgrid_api_key".to_string(),
            ));
        }

        Ok(())
    }

    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
