//! In-memory auth flow storage.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use authbridge_core::auth::{is_flow_expired, AuthFlowRepository, AuthFlowState, Result};

/// In-memory flow store for single-instance deployments and tests.
///
/// Flows live in a HashMap wrapped in `Arc<RwLock<_>>`. Expired flows are
/// swept whenever a new flow is stored.
#[derive(Debug, Clone)]
pub struct InMemoryFlowStore {
    flows: Arc<RwLock<HashMap<String, AuthFlowState>>>,
    ttl: chrono::Duration,
}

impl Default for InMemoryFlowStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}

impl InMemoryFlowStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            flows: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Number of flows currently held, expired or not.
    #[cfg(test)]
    async fn len(&self) -> usize {
        self.flows.read().await.len()
    }
}

#[async_trait]
impl AuthFlowRepository for InMemoryFlowStore {
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()> {
        let now = Utc::now();
        let mut flows = self.flows.write().await;
        flows.retain(|_, f| !is_flow_expired(f, now, self.ttl));
        flows.insert(state.to_string(), flow.clone());
        Ok(())
    }

    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>> {
        let mut flows = self.flows.write().await;
        Ok(flows
            .remove(state)
            .filter(|f| !is_flow_expired(f, Utc::now(), self.ttl)))
    }
}
