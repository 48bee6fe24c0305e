//! Sign in with Apple.
//!
//! Apple takes no static client secret. Each token request carries a short
//! ES256 JWT signed with the team's private key instead.

use async_trait::async_trait;
use authbridge_core::auth::{AuthError, OidcClaims, OidcProvider, OidcProviderClient, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use url::Url;

use super::oidc::DiscoveredClient;
use crate::config::AppleConfig;

const ISSUER: &str = "https://appleid.apple.com";
const SCOPES: &[&str] = &["openid", "email", "name"];

/// Apple OIDC provider.
pub struct AppleProvider {
    client: DiscoveredClient,
    config: AppleConfig,
}

impl AppleProvider {
    /// Create a new Apple provider by discovering the OIDC metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails or the private key is not a valid
    /// EC PEM key.
    pub async fn new(config: &AppleConfig) -> Result<Self> {
        // Fail at startup rather than on the first login.
        client_secret(config, Utc::now())?;

        let client =
            DiscoveredClient::discover(OidcProvider::Apple, ISSUER, &config.client_id, None)
                .await?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

#[derive(Serialize)]
struct ClientSecretClaims<'a> {
    iss: &'a str,
    iat: i64,
    exp: i64,
    aud: &'static str,
    sub: &'a str,
}

/// Sign the client secret JWT Apple expects on token requests.
///
/// See: <https://developer.apple.com/documentation/sign_in_with_apple/generate_and_validate_tokens>
fn client_secret(config: &AppleConfig, now: DateTime<Utc>) -> Result<String> {
    let claims = ClientSecretClaims {
        iss: &config.team_id,
        iat: now.timestamp(),
        exp: (now + Duration::minutes(5)).timestamp(),
        aud: ISSUER,
        sub: &config.client_id,
    };

    let mut header = Header::new(Algorithm::ES256);
    header.kid = Some(config.key_id.clone());

    let key = EncodingKey::from_ec_pem(config.private_key.as_bytes())
        .map_err(|e| AuthError::Provider(format!("Invalid Apple private key: {}", e)))?;

    encode(&header, &claims, &key)
        .map_err(|e| AuthError::Provider(format!("Failed to sign Apple JWT: {}", e)))
}

#[async_trait]
impl OidcProviderClient for AppleProvider {
    async fn authorization_url(
        &self,
        state: &str,
        pkce_challenge: &str,
        redirect_uri: &Url,
    ) -> Result<Url> {
        // Apple only returns the name scope through a form POST.
        self.client.authorize(
            state,
            pkce_challenge,
            redirect_uri,
            SCOPES,
            &[("response_mode", "form_post")],
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
        redirect_uri: &Url,
    ) -> Result<OidcClaims> {
        let secret = client_secret(&self.config, Utc::now())?;
        self.client
            .exchange(code, pkce_verifier, redirect_uri, Some(secret))
            .await
    }

    fn provider(&self) -> OidcProvider {
        OidcProvider::Apple
    }
}
