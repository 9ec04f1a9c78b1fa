use tracing::warn;
use crate::tally_board::FallbackPolicy;

pub const DATABASE_URL_KEY: &str = "DATABASE_URL";
pub const TALLY_FALLBACK_KEY: &str = "TALLY_FALLBACK";
pub const DB_MAX_CONNECTIONS_KEY: &str = "DB_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` runs the app degraded, with empty read-only views.
    pub database_url: Option<String>,
    pub tally_fallback: FallbackPolicy,
    pub max_connections: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            tally_fallback: FallbackPolicy::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl AppConfig {
    /// Builds the config from a key lookup such as the Shuttle secret store.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_KEY).filter(|url| {
            let present = !url.trim().is_empty();
            if !present {
                warn!("{} is empty - treating the database as unconfigured", DATABASE_URL_KEY);
            }
            present
        });

        let tally_fallback = match lookup(TALLY_FALLBACK_KEY) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::InvalidValue {
                key: TALLY_FALLBACK_KEY,
                reason,
            })?,
            None => FallbackPolicy::default(),
        };

        let max_connections = match lookup(DB_MAX_CONNECTIONS_KEY) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidValue {
                    key: DB_MAX_CONNECTIONS_KEY,
                    reason: format!("expected a positive integer, got {:?}", raw),
                }),
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self { database_url, tally_fallback, max_connections })
    }
}
