use std::sync::Arc;

use anyhow::Result;
use authbridge_auth::{AuthConfig, AuthState, InMemoryFlowStore};
use authbridge_core::auth::AuthFlowRepository;
use authbridge_core::storage::AccountRepository;

use crate::config::{AccountStore, Config};
use crate::storage::InMemoryRepository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub config: Config,
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

impl AppState {
    /// Wires storage backends and social providers from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage backend cannot be opened or a social
    /// provider fails to initialize.
    pub async fn from_config(config: Config, auth_config: AuthConfig) -> Result<Self> {
        let accounts = account_repository(&config).await?;
        let flows = flow_store(&config, &auth_config).await?;

        let auth = AuthState::new(accounts, flows, auth_config)
            .with_configured_providers()
            .await?;

        Ok(Self { auth, config })
    }

    /// In-memory storage for everything and no social providers.
    #[cfg(test)]
    pub fn in_memory(config: Config, auth_config: AuthConfig) -> Self {
        let auth = AuthState::new(
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryFlowStore::new(auth_config.flow_ttl)),
            auth_config,
        );
        Self { auth, config }
    }
}

/// Opens the account repository selected by `ACCOUNT_STORE`.
pub async fn account_repository(config: &Config) -> Result<Arc<dyn AccountRepository>> {
    match config.account_store {
        AccountStore::Memory => {
            tracing::warn!("Using in-memory account storage, accounts are lost on restart");
            Ok(Arc::new(InMemoryRepository::new()))
        }
        #[cfg(feature = "sqlite")]
        AccountStore::Sqlite => {
            tracing::info!(path = %config.sqlite_path, "Opening SQLite account storage");
            let repo = crate::storage::SqliteRepository::new(&config.sqlite_path).await?;
            Ok(Arc::new(repo))
        }
        #[cfg(not(feature = "sqlite"))]
        AccountStore::Sqlite => {
            anyhow::bail!("SQLite account storage requires the `sqlite` feature")
        }
    }
}

/// Picks the flow store: Redis, then SQLite, then process memory.
async fn flow_store(
    config: &Config,
    auth_config: &AuthConfig,
) -> Result<Arc<dyn AuthFlowRepository>> {
    #[cfg(feature = "flows-redis")]
    if let Some(url) = &config.redis_url {
        use fred::prelude::{Builder, ClientLike, Config as RedisConfig};

        let redis_config = RedisConfig::from_url(url)?;
        let pool = Builder::from_config(redis_config).build_pool(4)?;
        pool.init().await?;
        tracing::info!("Using Redis auth flow storage");
        return Ok(Arc::new(authbridge_auth::RedisFlowStore::new(
            pool,
            auth_config.flow_ttl,
        )));
    }

    #[cfg(feature = "flows-sqlite")]
    if let Some(url) = &config.flow_sqlite_url {
        let pool = sqlx::sqlite::SqlitePoolOptions::new().connect(url).await?;
        let store = authbridge_auth::SqliteFlowStore::new(pool, auth_config.flow_ttl);
        store.migrate().await?;
        tracing::info!("Using SQLite auth flow storage");
        return Ok(Arc::new(store));
    }

    if config.redis_url.is_some() || config.flow_sqlite_url.is_some() {
        tracing::warn!("Shared flow storage configured but not compiled in, using memory");
    }

    Ok(Arc::new(InMemoryFlowStore::new(auth_config.flow_ttl)))
}
