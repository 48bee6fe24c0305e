use std::{env, str::FromStr, time::Duration};

use authbridge_auth::parse_list;

/// Where accounts are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStore {
    Memory,
    Sqlite,
}

impl FromStr for AccountStore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "inmemory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown account store: {}", other)),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Account storage backend (default: sqlite)
    pub account_store: AccountStore,
    /// Path to SQLite database file (default: "authbridge.db")
    pub sqlite_path: String,
    /// SQLite URL for shared auth flow storage (only with `flows-sqlite`)
    pub flow_sqlite_url: Option<String>,
    /// Redis URL for shared auth flow storage (only with `flows-redis`)
    pub redis_url: Option<String>,
    /// Prefix the auth routes are mounted under (default: "/auth")
    pub route_prefix: String,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_allowed_origins: Vec<String>,
    /// Request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ACCOUNT_STORE` - `memory` or `sqlite` (default: sqlite)
    /// - `SQLITE_PATH` - SQLite database path (default: "authbridge.db")
    /// - `FLOW_SQLITE_URL` - sqlx URL for auth flows, e.g. `sqlite://flows.db?mode=rwc`
    /// - `REDIS_URL` - Redis URL for auth flows
    /// - `AUTH_ROUTE_PREFIX` - auth route prefix (default: "/auth")
    /// - `CORS_ALLOWED_ORIGINS` - comma separated origins (default: none)
    /// - `REQUEST_TIMEOUT_SECS` - request timeout (default: 10)
    pub fn from_env() -> Self {
        Self {
            account_store: account_store(env::var("ACCOUNT_STORE").ok().as_deref()),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "authbridge.db".to_string()),
            flow_sqlite_url: env::var("FLOW_SQLITE_URL").ok(),
            redis_url: env::var("REDIS_URL").ok(),
            route_prefix: env::var("AUTH_ROUTE_PREFIX")
                .map(|p| normalize_prefix(&p))
                .unwrap_or_else(|_| "/auth".to_string()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Get request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Same values `from_env` produces with no variables set.
impl Default for Config {
    fn default() -> Self {
        Self {
            account_store: AccountStore::Sqlite,
            sqlite_path: "authbridge.db".to_string(),
            flow_sqlite_url: None,
            redis_url: None,
            route_prefix: "/auth".to_string(),
            cors_allowed_origins: Vec::new(),
            request_timeout_seconds: 10,
        }
    }
}

/// Parses `ACCOUNT_STORE`, warning and falling back to SQLite on unknown values.
fn account_store(raw: Option<&str>) -> AccountStore {
    match raw.map(str::parse::<AccountStore>) {
        None => AccountStore::Sqlite,
        Some(Ok(store)) => store,
        Some(Err(e)) => {
            tracing::warn!("{}, falling back to sqlite", e);
            AccountStore::Sqlite
        }
    }
}

/// Ensure a leading slash and no trailing slash. `/` and empty mean no prefix.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timeout_conversion() {
        let config = Config {
            request_timeout_seconds: 30,
            ..Config::default()
        };

        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("auth"), "/auth");
        assert_eq!(normalize_prefix("/api/auth/"), "/api/auth");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
    }

    #[test]
    fn test_account_store_defaults_to_sqlite() {
        assert_eq!(account_store(None), AccountStore::Sqlite);
        assert_eq!(account_store(Some("memory")), AccountStore::Memory);
        assert_eq!(account_store(Some("dynamodb")), AccountStore::Sqlite);
        assert_eq!(Config::default().account_store, AccountStore::Sqlite);
    }

    #[test]
    fn test_account_store_parse() {
        assert_eq!("memory".parse::<AccountStore>(), Ok(AccountStore::Memory));
        assert_eq!("SQLite".parse::<AccountStore>(), Ok(AccountStore::Sqlite));
        assert!("dynamodb".parse::<AccountStore>().is_err());
    }
}
