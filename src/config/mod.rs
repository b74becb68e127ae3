use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Shared password for every account in the demo directory.
    pub demo_password: String,
    pub session_duration_hours: i64,
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Controls the store resynchronization heuristic.
///
/// The resync loop re-reads every collection from the key-value store at a
/// fixed interval so that writes made by another process sharing the same
/// database are picked up even if no notification reached us. It gives no
/// ordering or consistency guarantee; concurrent writers still race with
/// last-writer-wins semantics.
#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    /// Seconds between resync passes. `0` disables the loop.
    pub resync_interval_secs: u64,
    /// Buffered change notices per subscriber before it starts lagging.
    pub channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            resync_interval_secs: 5,
            channel_capacity: 64,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Pick up a .env file if present; missing is fine
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.url", "sqlite://clubhouse.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.demo_password", "password123")?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("auth.secure_cookies", false)?
            .set_default("sync.resync_interval_secs", 5)?
            .set_default("sync.channel_capacity", 64)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with CLUBHOUSE__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("CLUBHOUSE").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "sqlite://clubhouse.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                demo_password: "password123".to_string(),
                session_duration_hours: 24,
                secure_cookies: false,
            },
            sync: SyncConfig::default(),
        }
    }
}
