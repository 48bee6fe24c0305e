//! Mock OIDC provider for development and tests.
//!
//! Authorization codes are URL-safe base64 encoded JSON objects carrying the
//! identity the provider should report, e.g.
//! `{"sub": "123", "email": "ada@example.com", "name": "Ada Lovelace"}`.

use async_trait::async_trait;
use authbridge_core::auth::{AuthError, OidcClaims, OidcProvider, OidcProviderClient, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use url::Url;

/// Identity embedded in a mock authorization code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockIdentity {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Provider that never leaves the process: codes decode to claims directly.
pub struct MockProvider {
    provider: OidcProvider,
    mock_idp_url: Url,
}

impl MockProvider {
    /// # Arguments
    /// * `provider` - The provider to impersonate (Google or Apple)
    /// * `mock_idp_url` - Base URL authorization URLs point at
    pub fn new(provider: OidcProvider, mock_idp_url: Url) -> Self {
        Self {
            provider,
            mock_idp_url,
        }
    }

    /// Encode an identity as an authorization code this provider accepts.
    pub fn code_for(identity: &MockIdentity) -> String {
        // Serializing a struct of strings cannot fail.
        let json = serde_json::to_vec(identity).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }
}

#[async_trait]
impl OidcProviderClient for MockProvider {
    async fn authorization_url(
        &self,
        state: &str,
        pkce_challenge: &str,
        redirect_uri: &Url,
    ) -> Result<Url> {
        let mut url = self
            .mock_idp_url
            .join(&format!("{}/authorize", self.provider))
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("state", state)
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("code_challenge", pkce_challenge)
            .append_pair("code_challenge_method", "S256");

        Ok(url)
    }

    async fn exchange_code(
        &self,
        code: &str,
        _pkce_verifier: &str,
        _redirect_uri: &Url,
    ) -> Result<OidcClaims> {
        let decoded = URL_SAFE_NO_PAD
            .decode(code)
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let identity: MockIdentity =
            serde_json::from_slice(&decoded).map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        Ok(OidcClaims {
            subject: identity.sub,
            email: identity.email,
            name: identity.name,
            provider: self.provider,
        })
    }

    fn provider(&self) -> OidcProvider {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(kind: OidcProvider) -> MockProvider {
        MockProvider::new(kind, Url::parse("http://localhost:3001/").unwrap())
    }

    fn redirect() -> Url {
        Url::parse("http://localhost:3000/auth/callback").unwrap()
    }

    #[tokio::test]
    async fn test_authorization_url_google() {
        let url = provider(OidcProvider::Google)
            .authorization_url("test-state", "test-challenge", &redirect())
            .await
            .unwrap();

        assert_eq!(url.path(), "/google/authorize");
        let query = url.query().unwrap();
        assert!(query.contains("state=test-state"));
        assert!(query.contains("code_challenge=test-challenge"));
        assert!(query.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));
    }

    #[tokio::test]
    async fn test_authorization_url_apple() {
        let url = provider(OidcProvider::Apple)
            .authorization_url("test-state", "test-challenge", &redirect())
            .await
            .unwrap();

        assert_eq!(url.path(), "/apple/authorize");
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let code = MockProvider::code_for(&MockIdentity {
            sub: "mock-google-1".to_string(),
            email: Some("test@example.com".to_string()),
            name: Some("Test User".to_string()),
        });

        let claims = provider(OidcProvider::Google)
            .exchange_code(&code, "verifier", &redirect())
            .await
            .unwrap();

        assert_eq!(claims.email, Some("test@example.com".to_string()));
        assert_eq!(claims.name, Some("Test User".to_string()));
        assert_eq!(claims.subject, "mock-google-1");
        assert_eq!(claims.provider, OidcProvider::Google);
    }

    #[tokio::test]
    async fn test_exchange_code_invalid() {
        let result = provider(OidcProvider::Google)
            .exchange_code("!!not-base64!!", "verifier", &redirect())
            .await;
        assert!(matches!(result, Err(AuthError::CodeExchange(_))));
    }
}
