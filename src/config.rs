use anyhow::{Context, Result, ensure};
use std::{env, str::FromStr, sync::OnceLock, time::Duration};

/// Application configuration loaded and validated at startup
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Peer device (Pico W) configuration
    pub peer: PeerConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct PeerConfig {
    pub host: String,
    pub port: u16,
    pub max_retries: u32,
    pub timeout: Duration,
    pub retry_delay: Duration,
}

impl AppConfig {
    /// Get or load the application configuration
    ///
    /// Returns a reference to the cached configuration. On first call, it loads
    /// and validates all configuration from environment variables. Subsequent
    /// calls return the cached instance.
    ///
    /// # Panics
    /// Panics if configuration loading fails. Call [`AppConfig::load`] first
    /// to report a readable error instead.
    pub fn get() -> &'static Self {
        static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();
        APP_CONFIG
            .get_or_init(|| Self::load().expect("failed to load application configuration"))
    }

    /// Load and validate all configuration from environment variables
    pub fn load() -> Result<Self> {
        Ok(Self {
            server: ServerConfig::load()?,
            peer: PeerConfig::load()?,
        })
    }
}

impl ServerConfig {
    fn load() -> Result<Self> {
        let host = env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_or("BIND_PORT", 5000)?;

        Ok(Self { host, port })
    }
}

impl PeerConfig {
    pub const DEFAULT_HOST: &str = "172.20.10.5";
    pub const DEFAULT_PORT: u16 = 80;
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

    fn load() -> Result<Self> {
        let host = env::var("PICO_IP").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string());
        let port = env_or("PICO_PORT", Self::DEFAULT_PORT)?;
        let max_retries = env_or("PICO_MAX_RETRIES", Self::DEFAULT_MAX_RETRIES)?;
        let timeout_secs = env_or("PICO_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT_SECS)?;
        let retry_delay_ms = env_or("PICO_RETRY_DELAY_MS", Self::DEFAULT_RETRY_DELAY_MS)?;

        let config = Self {
            host,
            port,
            max_retries,
            timeout: Duration::from_secs(timeout_secs),
            retry_delay: Duration::from_millis(retry_delay_ms),
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.host.is_empty(), "peer host must not be empty");
        ensure!(self.max_retries >= 1, "PICO_MAX_RETRIES must be at least 1");
        ensure!(!self.timeout.is_zero(), "PICO_TIMEOUT_SECS must be at least 1");
        Ok(())
    }

    /// Status endpoint exposed by the peer firmware
    pub fn nfc_url(&self) -> String {
        format!("http://{}:{}/api/nfc", self.host, self.port)
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            retry_delay: Duration::from_millis(Self::DEFAULT_RETRY_DELAY_MS),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("failed to parse {key}: invalid format")),
        None => Ok(default),
    }
}
