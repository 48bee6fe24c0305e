//! Google sign-in.

use async_trait::async_trait;
use authbridge_core::auth::{OidcClaims, OidcProvider, OidcProviderClient, Result};
use url::Url;

use super::oidc::DiscoveredClient;
use crate::config::ProviderConfig;

const ISSUER: &str = "https://accounts.google.com";
const SCOPES: &[&str] = &["openid", "email", "profile"];

/// Google OIDC provider.
pub struct GoogleProvider {
    client: DiscoveredClient,
}

impl GoogleProvider {
    /// Create a new Google provider by discovering the OIDC metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails (network error or invalid metadata).
    pub async fn new(config: &ProviderConfig) -> Result<Self> {
        let client = DiscoveredClient::discover(
            OidcProvider::Google,
            ISSUER,
            &config.client_id,
            config.client_secret.as_deref(),
        )
        .await?;

        Ok(Self { client })
    }
}

#[async_trait]
impl OidcProviderClient for GoogleProvider {
    async fn authorization_url(
        &self,
        state: &str,
        pkce_challenge: &str,
        redirect_uri: &Url,
    ) -> Result<Url> {
        self.client
            .authorize(state, pkce_challenge, redirect_uri, SCOPES, &[])
    }

    async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
        redirect_uri: &Url,
    ) -> Result<OidcClaims> {
        self.client
            .exchange(code, pkce_verifier, redirect_uri, None)
            .await
    }

    fn provider(&self) -> OidcProvider {
        OidcProvider::Google
    }
}
