//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Exchange rate source configuration.
    #[serde(default)]
    pub rates: RatesConfig,
    /// Ledger behaviour switches.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Exchange rate source configuration.
///
/// Both URLs must serve the same document shape; the fallback is only
/// consulted when the primary fails or times out.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Primary quote endpoint.
    #[serde(default = "default_primary_url")]
    pub primary_url: String,
    /// Fallback quote endpoint with an identical response shape.
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum number of resolved rates kept in memory.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Lifetime of an in-memory rate entry in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            fallback_url: default_fallback_url(),
            timeout_secs: default_timeout_secs(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_primary_url() -> String {
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1".to_string()
}

fn default_fallback_url() -> String {
    "https://latest.currency-api.pages.dev/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cache_capacity() -> u64 {
    10_000
}

fn default_cache_ttl_secs() -> u64 {
    86_400 // 1 day
}

/// How tagged postings apply their tag allocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationMode {
    /// Post first, then allocate in a second atomic scope.
    #[default]
    Sequential,
    /// Post and allocate inside one atomic scope.
    Atomic,
}

/// Ledger behaviour switches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    /// Allocation mode used by tagged postings.
    #[serde(default)]
    pub allocation_mode: AllocationMode,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LEDGERLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        let config = temp_env::with_vars(
            [
                ("LEDGERLY__SERVER__PORT", Some("9090")),
                ("LEDGERLY__DATABASE__URL", Some("postgres://localhost/ledgerly")),
            ],
            AppConfig::load,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.url, "postgres://localhost/ledgerly");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.rates.timeout_secs, 10);
        assert_eq!(config.ledger.allocation_mode, AllocationMode::Sequential);
    }

    #[test]
    fn test_load_overrides_rates_and_mode() {
        let config = temp_env::with_vars(
            [
                ("LEDGERLY__SERVER__HOST", Some("127.0.0.1")),
                ("LEDGERLY__DATABASE__URL", Some("postgres://localhost/ledgerly")),
                ("LEDGERLY__RATES__PRIMARY_URL", Some("http://rates.local/v1")),
                ("LEDGERLY__RATES__TIMEOUT_SECS", Some("3")),
                ("LEDGERLY__LEDGER__ALLOCATION_MODE", Some("atomic")),
            ],
            AppConfig::load,
        )
        .unwrap();

        assert_eq!(config.rates.primary_url, "http://rates.local/v1");
        assert_eq!(config.rates.timeout_secs, 3);
        assert_eq!(config.ledger.allocation_mode, AllocationMode::Atomic);
    }

    #[test]
    fn test_load_requires_database_url() {
        let result = temp_env::with_vars(
            [
                ("LEDGERLY__SERVER__PORT", Some("9090")),
                ("LEDGERLY__DATABASE__URL", None::<&str>),
            ],
            AppConfig::load,
        );
        assert!(result.is_err());
    }
}
