//! Redis auth flow storage.

use async_trait::async_trait;
use authbridge_core::auth::{AuthError, AuthFlowRepository, AuthFlowState, Result};
use fred::prelude::*;
use std::time::Duration;

/// Redis-backed flow store. Redis expires flows on its own after the TTL.
pub struct RedisFlowStore {
    pool: Pool,
    flow_ttl: Duration,
}

impl RedisFlowStore {
    /// # Arguments
    ///
    /// * `pool` - Redis connection pool
    /// * `flow_ttl` - how long a started login may wait for its callback
    pub fn new(pool: Pool, flow_ttl: Duration) -> Self {
        Self { pool, flow_ttl }
    }

    fn flow_key(state: &str) -> String {
        format!("auth_flow:{}", state)
    }
}

fn storage(e: impl std::fmt::Display) -> AuthError {
    AuthError::Storage(e.to_string())
}

#[async_trait]
impl AuthFlowRepository for RedisFlowStore {
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()> {
        let value = serde_json::to_string(flow).map_err(storage)?;

        self.pool
            .set::<(), _, _>(
                Self::flow_key(state),
                value,
                Some(Expiration::EX(
                    i64::try_from(self.flow_ttl.as_secs()).unwrap_or(i64::MAX),
                )),
                None,
                false,
            )
            .await
            .map_err(storage)?;

        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>> {
        // GETDEL makes redemption atomic across instances.
        let value: Option<String> = self
            .pool
            .getdel(Self::flow_key(state))
            .await
            .map_err(storage)?;

        value
            .map(|json| serde_json::from_str(&json).map_err(storage))
            .transpose()
    }
}
