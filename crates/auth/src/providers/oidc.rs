//! Discovery-based OIDC client shared by the Google and Apple providers.

use std::borrow::Cow;

use authbridge_core::auth::{generate_state, AuthError, OidcClaims, OidcProvider, Result};
use openidconnect::{
    core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata},
    reqwest, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet,
    EndpointNotSet, EndpointSet, IssuerUrl, Nonce, PkceCodeVerifier, RedirectUrl, Scope,
    TokenResponse,
};
use url::Url;

/// Client shape produced by `from_provider_metadata`: the authorization
/// endpoint always comes from discovery, token and userinfo endpoints may.
type DiscoveredCoreClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

pub(super) struct DiscoveredClient {
    provider: OidcProvider,
    client: DiscoveredCoreClient,
    http_client: reqwest::Client,
}

impl DiscoveredClient {
    /// Fetch the issuer's metadata and build a client for it.
    pub(super) async fn discover(
        provider: OidcProvider,
        issuer: &str,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Self> {
        let issuer_url =
            IssuerUrl::new(issuer.to_string()).map_err(|e| AuthError::Provider(e.to_string()))?;

        // Token endpoints must not be followed through redirects.
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        let metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| AuthError::Provider(format!("{} discovery failed: {}", provider, e)))?;

        let client = CoreClient::from_provider_metadata(
            metadata,
            ClientId::new(client_id.to_string()),
            client_secret.map(|s| ClientSecret::new(s.to_string())),
        );

        tracing::info!("Discovered OIDC metadata for {}", provider);

        Ok(Self {
            provider,
            client,
            http_client,
        })
    }

    /// Build the authorization URL for a flow with a precomputed S256 challenge.
    pub(super) fn authorize(
        &self,
        state: &str,
        pkce_challenge: &str,
        redirect_uri: &Url,
        scopes: &[&str],
        extra: &[(&'static str, &'static str)],
    ) -> Result<Url> {
        let state = state.to_string();

        let mut request = self
            .client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                move || CsrfToken::new(state),
                || Nonce::new(generate_state()),
            )
            .set_redirect_uri(Cow::Owned(redirect_url(redirect_uri)))
            .add_extra_param("code_challenge", pkce_challenge.to_string())
            .add_extra_param("code_challenge_method", "S256");

        for scope in scopes {
            request = request.add_scope(Scope::new(scope.to_string()));
        }
        for (name, value) in extra {
            request = request.add_extra_param(*name, *value);
        }

        let (url, _csrf, _nonce) = request.url();
        Ok(url)
    }

    /// Redeem an authorization code and read the ID token claims.
    pub(super) async fn exchange(
        &self,
        code: &str,
        pkce_verifier: &str,
        redirect_uri: &Url,
        client_secret: Option<String>,
    ) -> Result<OidcClaims> {
        let mut request = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .set_redirect_uri(Cow::Owned(redirect_url(redirect_uri)));

        if let Some(secret) = client_secret {
            request = request.add_extra_param("client_secret", secret);
        }

        let token_response = request
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| AuthError::CodeExchange("no ID token in response".to_string()))?;

        // Nonce is not persisted with the flow; PKCE binds the code instead.
        let claims = id_token
            .claims(&self.client.id_token_verifier(), |_: Option<&Nonce>| Ok(()))
            .map_err(|e| AuthError::CodeExchange(format!("invalid ID token: {}", e)))?;

        Ok(OidcClaims {
            subject: claims.subject().to_string(),
            email: claims.email().map(|e| e.to_string()),
            name: claims
                .name()
                .and_then(|n| n.get(None))
                .map(|n| n.to_string()),
            provider: self.provider,
        })
    }
}

fn redirect_url(uri: &Url) -> RedirectUrl {
    RedirectUrl::from_url(uri.clone())
}
