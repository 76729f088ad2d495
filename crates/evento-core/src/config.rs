use anyhow::Result;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

/// Upper bound for `auth.session_ttl_hours` (one year).
pub const MAX_SESSION_TTL_HOURS: u32 = 24 * 366;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Name of the cookie carrying the session token.
    pub session_cookie: String,
    /// Session lifetime, at most [`MAX_SESSION_TTL_HOURS`].
    pub session_ttl_hours: u32,
    pub secure_cookies: bool,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

/// Superuser account ensured at startup.
#[derive(Clone, Deserialize)]
pub struct BootstrapAdminConfig {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdminConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Number of events per page on the event list.
    pub page_size: u16,
    /// Present a missing event the same way as a denied one.
    pub conceal_missing_events: bool,
}

impl Settings {
    /// ## Summary
    /// Returns a configuration builder pre-populated with every default.
    ///
    /// ## Errors
    /// Returns an error if a default value cannot be set.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "debug")?
            .set_default("auth.session_cookie", crate::constants::DEFAULT_SESSION_COOKIE)?
            .set_default("auth.session_ttl_hours", 336)?
            .set_default("auth.secure_cookies", false)?
            .set_default("app.page_size", 10)?
            .set_default("app.conceal_missing_events", true)?)
    }

    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `config.toml` values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::defaults()?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env file
            .add_source(
                config::Environment::with_prefix("EVENTO")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?
            .validated()?)
    }

    /// ## Summary
    /// Rejects values that deserialize but cannot be used.
    ///
    /// ## Errors
    /// Returns an error if the session lifetime is zero or above
    /// [`MAX_SESSION_TTL_HOURS`].
    pub fn validated(self) -> Result<Self> {
        let ttl = self.auth.session_ttl_hours;
        if ttl == 0 || ttl > MAX_SESSION_TTL_HOURS {
            anyhow::bail!(
                "auth.session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {ttl}"
            );
        }
        Ok(self)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
