use async_trait::async_trait;
use url::Url;

use super::{AuthError, AuthFlowState, OidcClaims, OidcProvider};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over OIDC identity providers.
#[async_trait]
pub trait OidcProviderClient: Send + Sync {
    /// Generate the authorization URL the user agent is sent to.
    async fn authorization_url(
        &self,
        state: &str,
        pkce_challenge: &str,
        redirect_uri: &Url,
    ) -> Result<Url>;

    /// Exchange authorization code for claims.
    ///
    /// `redirect_uri` must be the same URI the flow was started with.
    async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
        redirect_uri: &Url,
    ) -> Result<OidcClaims>;

    /// Which provider this client represents.
    fn provider(&self) -> OidcProvider;
}

/// Storage for in-flight social login flows, keyed by the `state` parameter.
#[async_trait]
pub trait AuthFlowRepository: Send + Sync {
    /// Store PKCE verifier and redirect URI for a flow (short TTL).
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()>;

    /// Retrieve and delete auth flow state. A state can be taken once.
    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>>;
}
