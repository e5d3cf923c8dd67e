use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Deployment environment: development, test or production
    #[serde(default = "default_environment")]
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Who may create and edit dishes, events and guest lists
    #[serde(default)]
    pub hosts: HostsConfig,
    /// Identity token verification
    pub jwt: JwtAuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Origin of the web app, used to build guest links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
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

impl DatabaseConfig {
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Requests per minute per client on guest routes; 0 disables the limit
    #[serde(default = "default_guest_rate_limit")]
    pub guest_rate_limit_per_minute: u32,

    /// Enables `GET /api/v1/auth/test-login`. Refused in production.
    #[serde(default)]
    pub test_login_enabled: bool,

    #[serde(default)]
    pub hsts_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            guest_rate_limit_per_minute: default_guest_rate_limit(),
            test_login_enabled: false,
            hsts_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostsConfig {
    /// Emails allowed to mutate dishes, events and guests (case-insensitive)
    #[serde(default)]
    pub allowed_emails: Vec<String>,

    /// Lets every signed-in user mutate. Test environments only.
    #[serde(default)]
    pub allow_all_hosts: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// Identity provider's RSA public key in PEM format
    pub public_key: String,

    /// RSA private key in PEM format, only needed to mint test-login tokens
    #[serde(default)]
    pub private_key: String,

    /// Lifetime of minted tokens in seconds (default: 3600 = 1 hour)
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: i64,

    /// Leeway in seconds for clock skew tolerance (default: 30)
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

// Default value functions
fn default_environment() -> String {
    "development".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_guest_rate_limit() -> u32 {
    60
}
fn default_token_expiry() -> i64 {
    3600
}
fn default_jwt_leeway() -> u64 {
    30
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
    /// 3. Environment variables with DH__ prefix
    ///
    /// `DH__HOSTS__ALLOWED_EMAILS` and `DH__SECURITY__CORS_ORIGINS` are
    /// comma-separated lists.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("DH")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("hosts.allowed_emails")
                    .with_list_parse_key("security.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides, without
    /// touching config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            environment = "test"

            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            public_base_url = "http://localhost:3000"

            [database]
            url = ""
            max_connections = 20
            min_connections = 2
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []
            guest_rate_limit_per_minute = 60
            test_login_enabled = false

            [hosts]
            allowed_emails = []
            allow_all_hosts = false

            [jwt]
            public_key = "test-public-key"
            token_expiry_secs = 3600
            leeway_secs = 30
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "DH__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.jwt.public_key.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "DH__JWT__PUBLIC_KEY environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.is_production() && self.hosts.allow_all_hosts {
            return Err(ConfigValidationError::InvalidValue(
                "hosts.allow_all_hosts cannot be enabled in production".to_string(),
            ));
        }

        if self.is_production() && self.security.test_login_enabled {
            return Err(ConfigValidationError::InvalidValue(
                "security.test_login_enabled cannot be enabled in production".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Base URL for guest links, without a trailing slash.
    pub fn public_base_url(&self) -> &str {
        self.server.public_base_url.trim_end_matches('/')
    }
}
