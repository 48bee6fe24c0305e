//! Application state for auth.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::FromRef;
use authbridge_core::auth::{AuthFlowRepository, OidcProvider, OidcProviderClient};
use authbridge_core::storage::AccountRepository;

use crate::accounts::AccountManager;
use crate::config::AuthConfig;
use crate::cookies::CookieBridge;
use crate::error::AuthError;
use crate::providers::{AppleProvider, GoogleProvider, MockProvider};
use crate::tokens::TokenService;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub accounts: AccountManager,
    pub tokens: TokenService,
    pub cookies: CookieBridge,
    pub flows: Arc<dyn AuthFlowRepository>,
    pub config: AuthConfig,
    providers: HashMap<OidcProvider, Arc<dyn OidcProviderClient>>,
}

impl AuthState {
    /// Creates the state with no social providers registered.
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        flows: Arc<dyn AuthFlowRepository>,
        config: AuthConfig,
    ) -> Self {
        let accounts = AccountManager::new(accounts);
        let tokens = TokenService::new(&config, accounts.clone());
        let cookies = CookieBridge::new(config.cookies.clone());

        Self {
            accounts,
            tokens,
            cookies,
            flows,
            config,
            providers: HashMap::new(),
        }
    }

    /// Registers a provider client, replacing any client for the same provider.
    pub fn with_provider(mut self, client: Arc<dyn OidcProviderClient>) -> Self {
        self.providers.insert(client.provider(), client);
        self
    }

    /// Registers the providers enabled in the configuration.
    ///
    /// With `mock_idp_url` set, Google and Apple are both served by
    /// [`MockProvider`] and no discovery request is made.
    ///
    /// # Errors
    ///
    /// Returns an error if provider initialization fails (e.g., OIDC discovery).
    pub async fn with_configured_providers(self) -> Result<Self, AuthError> {
        if let Some(url) = self.config.mock_idp_url.clone() {
            tracing::warn!("Using mock social providers at {}", url);
            return Ok(self
                .with_provider(Arc::new(MockProvider::new(OidcProvider::Google, url.clone())))
                .with_provider(Arc::new(MockProvider::new(OidcProvider::Apple, url))));
        }

        let mut state = self;

        if let Some(cfg) = state.config.google.clone() {
            state = state.with_provider(Arc::new(GoogleProvider::new(&cfg).await?));
        }

        if let Some(cfg) = state.config.apple.clone() {
            state = state.with_provider(Arc::new(AppleProvider::new(&cfg).await?));
        }

        Ok(state)
    }

    /// Gets the provider client for the given OIDC provider.
    ///
    /// # Errors
    ///
    /// Returns `ProviderNotConfigured` if the provider is not enabled.
    pub fn get_provider(
        &self,
        provider: OidcProvider,
    ) -> Result<Arc<dyn OidcProviderClient>, AuthError> {
        self.providers
            .get(&provider)
            .cloned()
            .ok_or_else(|| AuthError::ProviderNotConfigured(provider.to_string()))
    }
}

/// Allows AuthState to be extracted from a parent state.
impl<S> FromRef<S> for AuthState
where
    S: AsRef<AuthState>,
{
    fn from_ref(state: &S) -> Self {
        state.as_ref().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::InMemoryFlowStore;
    use crate::test_support::MemoryAccounts;
    use url::Url;

    fn state(config: AuthConfig) -> AuthState {
        AuthState::new(
            Arc::new(MemoryAccounts::default()),
            Arc::new(InMemoryFlowStore::default()),
            config,
        )
    }

    #[test]
    fn unregistered_provider_is_not_configured() {
        let err = state(AuthConfig::new("k"))
            .get_provider(OidcProvider::Google)
            .err()
            .unwrap();
        assert!(matches!(err, AuthError::ProviderNotConfigured(p) if p == "google"));
    }

    #[tokio::test]
    async fn mock_idp_url_registers_both_providers() {
        let mut config = AuthConfig::new("k");
        config.mock_idp_url = Some(Url::parse("http://localhost:3001/").unwrap());

        let state = state(config).with_configured_providers().await.unwrap();
        for provider in [OidcProvider::Google, OidcProvider::Apple] {
            assert_eq!(state.get_provider(provider).unwrap().provider(), provider);
        }
    }
}
