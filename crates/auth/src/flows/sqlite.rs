//! SQLite auth flow storage.

use async_trait::async_trait;
use authbridge_core::auth::{AuthError, AuthFlowRepository, AuthFlowState, OidcProvider, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use std::time::Duration;

type FlowRow = (String, String, String, String);

/// SQLite-backed flow store, shared by every instance pointed at the same file.
///
/// Flows older than the TTL are deleted whenever a new flow is stored.
pub struct SqliteFlowStore {
    pool: SqlitePool,
    flow_ttl: Duration,
}

impl SqliteFlowStore {
    /// # Arguments
    ///
    /// * `pool` - SQLite connection pool
    /// * `flow_ttl` - how long a started login may wait for its callback
    pub fn new(pool: SqlitePool, flow_ttl: Duration) -> Self {
        Self { pool, flow_ttl }
    }

    /// Creates the `auth_flows` table if it does not exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS auth_flows (
                state TEXT PRIMARY KEY,
                pkce_verifier TEXT NOT NULL,
                provider TEXT NOT NULL,
                redirect_uri TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }
}

/// Fixed-width UTC timestamps, so `created_at` compares correctly as text.
fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn storage(e: sqlx::Error) -> AuthError {
    AuthError::Storage(e.to_string())
}

fn row_to_flow((pkce_verifier, provider, redirect_uri, created_at): FlowRow) -> Result<AuthFlowState> {
    let provider = provider
        .parse::<OidcProvider>()
        .map_err(|p| AuthError::Storage(format!("Unknown provider: {}", p)))?;

    Ok(AuthFlowState {
        pkce_verifier,
        provider,
        redirect_uri,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .with_timezone(&Utc),
    })
}

#[async_trait]
impl AuthFlowRepository for SqliteFlowStore {
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()> {
        let cutoff = chrono::Duration::from_std(self.flow_ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_sub_signed(ttl));

        if let Some(cutoff) = cutoff {
            sqlx::query("DELETE FROM auth_flows WHERE created_at <= ?")
                .bind(format_timestamp(&cutoff))
                .execute(&self.pool)
                .await
                .map_err(storage)?;
        }

        sqlx::query(
            "INSERT OR REPLACE INTO auth_flows (state, pkce_verifier, provider, redirect_uri, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(state)
        .bind(&flow.pkce_verifier)
        .bind(flow.provider.to_string())
        .bind(&flow.redirect_uri)
        .bind(format_timestamp(&flow.created_at))
        .execute(&self.pool)
        .await
        .map_err(storage)?;

        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>> {
        // SELECT and DELETE share a transaction so a state is redeemed once.
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let row = sqlx::query_as::<_, FlowRow>(
            "SELECT pkce_verifier, provider, redirect_uri, created_at FROM auth_flows WHERE state = ?",
        )
        .bind(state)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;

        if row.is_some() {
            sqlx::query("DELETE FROM auth_flows WHERE state = ?")
                .bind(state)
                .execute(&mut *tx)
                .await
                .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;

        row.map(row_to_flow).transpose()
    }
}
