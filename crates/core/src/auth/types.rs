use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported OIDC providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OidcProvider {
    Google,
    Apple,
}

impl std::fmt::Display for OidcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Apple => write!(f, "apple"),
        }
    }
}

impl std::str::FromStr for OidcProvider {
    type Err = String;

    /// Accepts the short names and the social-auth backend names
    /// (`google-oauth2`, `apple-id`) used in `/o/{provider}/` paths.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" | "google-oauth2" => Ok(Self::Google),
            "apple" | "apple-id" => Ok(Self::Apple),
            other => Err(other.to_string()),
        }
    }
}

/// Provider-agnostic claims extracted from OIDC ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OidcClaims {
    /// Provider's unique user identifier.
    pub subject: String,
    /// User's email address.
    pub email: Option<String>,
    /// User's display name.
    pub name: Option<String>,
    /// Which provider issued these claims.
    pub provider: OidcProvider,
}

/// PKCE and redirect data stored between initiating and completing a social login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFlowState {
    pub pkce_verifier: String,
    pub provider: OidcProvider,
    /// Redirect URI the flow was started with; the code exchange must reuse it.
    pub redirect_uri: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parses_backend_aliases() {
        assert_eq!("google".parse::<OidcProvider>(), Ok(OidcProvider::Google));
        assert_eq!("google-oauth2".parse::<OidcProvider>(), Ok(OidcProvider::Google));
        assert_eq!("apple".parse::<OidcProvider>(), Ok(OidcProvider::Apple));
        assert_eq!("apple-id".parse::<OidcProvider>(), Ok(OidcProvider::Apple));
    }

    #[test]
    fn provider_rejects_unknown_names() {
        assert_eq!(
            "facebook".parse::<OidcProvider>(),
            Err("facebook".to_string())
        );
    }

    #[test]
    fn provider_display_round_trips() {
        for provider in [OidcProvider::Google, OidcProvider::Apple] {
            assert_eq!(provider.to_string().parse::<OidcProvider>(), Ok(provider));
        }
    }
}
