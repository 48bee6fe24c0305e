use std::time::Duration;

use axum_extra::extract::cookie::SameSite;
use url::Url;

use crate::error::AuthError;

/// Upper bound for every configured lifetime (token TTLs, cookie max-age, flow TTL).
pub const MAX_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Configuration for a single OIDC provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: Option<String>,
}

/// Apple-specific configuration (uses signed JWT for client secret).
#[derive(Debug, Clone)]
pub struct AppleConfig {
    pub client_id: String,
    pub team_id: String,
    pub key_id: String,
    pub private_key: String, // PEM-encoded ES256 private key
}

/// Attributes applied to every `access` and `refresh` cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct CookieConfig {
    pub access_name: String,
    pub refresh_name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            access_name: "access".to_string(),
            refresh_name: "refresh".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            access_max_age: Duration::from_secs(5 * 60),
            refresh_max_age: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl CookieConfig {
    /// Load cookie attributes from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_COOKIE_ACCESS_MAX_AGE`: access cookie max-age in seconds (default: 300)
    /// - `AUTH_COOKIE_REFRESH_MAX_AGE`: refresh cookie max-age in seconds (default: 86400)
    /// - `AUTH_COOKIE_PATH`: cookie path (default: `/`)
    /// - `AUTH_COOKIE_DOMAIN`: cookie domain (default: unset, host-only)
    /// - `AUTH_COOKIE_SECURE`: set the Secure flag (default: true)
    /// - `AUTH_COOKIE_HTTP_ONLY`: set the HttpOnly flag (default: true)
    /// - `AUTH_COOKIE_SAMESITE`: `strict`, `lax` or `none` (default: lax)
    ///
    /// # Errors
    ///
    /// Returns an error if `AUTH_COOKIE_SAMESITE` holds an unknown policy or a
    /// max-age is not a number of seconds up to [`MAX_LIFETIME`].
    pub fn from_env() -> Result<Self, AuthError> {
        let defaults = Self::default();

        let same_site = match std::env::var("AUTH_COOKIE_SAMESITE") {
            Ok(value) => parse_same_site(&value).ok_or_else(|| {
                AuthError::Config(format!("invalid AUTH_COOKIE_SAMESITE: {}", value))
            })?,
            Err(_) => defaults.same_site,
        };

        Ok(Self {
            access_max_age: env_secs("AUTH_COOKIE_ACCESS_MAX_AGE")?
                .unwrap_or(defaults.access_max_age),
            refresh_max_age: env_secs("AUTH_COOKIE_REFRESH_MAX_AGE")?
                .unwrap_or(defaults.refresh_max_age),
            path: std::env::var("AUTH_COOKIE_PATH").unwrap_or(defaults.path),
            domain: std::env::var("AUTH_COOKIE_DOMAIN")
                .ok()
                .filter(|d| !d.is_empty()),
            secure: env_flag("AUTH_COOKIE_SECURE").unwrap_or(defaults.secure),
            http_only: env_flag("AUTH_COOKIE_HTTP_ONLY").unwrap_or(defaults.http_only),
            same_site,
            ..defaults
        })
    }
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC key used to sign and verify JWTs.
    pub signing_key: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    /// How long a started social login may take before its state is discarded.
    pub flow_ttl: Duration,
    pub cookies: CookieConfig,
    /// Redirect URIs a social login may be started with.
    pub allowed_redirect_uris: Vec<String>,
    pub google: Option<ProviderConfig>,
    pub apple: Option<AppleConfig>,
    /// When set, Google and Apple are served by mock providers pointing here.
    pub mock_idp_url: Option<Url>,
}

impl AuthConfig {
    /// Configuration with default lifetimes and cookie attributes and no providers.
    pub fn new(signing_key: impl Into<String>) -> Self {
        Self {
            signing_key: signing_key.into(),
            access_ttl: Duration::from_secs(5 * 60),
            refresh_ttl: Duration::from_secs(24 * 60 * 60),
            flow_ttl: Duration::from_secs(10 * 60),
            cookies: CookieConfig::default(),
            allowed_redirect_uris: Vec::new(),
            google: None,
            apple: None,
            mock_idp_url: None,
        }
    }

    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH_SIGNING_KEY`: JWT signing key (required)
    /// - `AUTH_ACCESS_TTL_SECS`: access token lifetime (default: 300)
    /// - `AUTH_REFRESH_TTL_SECS`: refresh token lifetime (default: 86400)
    /// - `AUTH_ALLOWED_REDIRECT_URIS`: comma separated social login redirect URIs
    /// - `GOOGLE_CLIENT_ID`: Google OAuth client ID (optional, enables Google auth)
    /// - `GOOGLE_CLIENT_SECRET`: Google OAuth client secret (required if Google enabled)
    /// - `APPLE_CLIENT_ID`: Apple OAuth client ID (optional, enables Apple auth)
    /// - `APPLE_TEAM_ID`: Apple developer team ID (required if Apple enabled)
    /// - `APPLE_KEY_ID`: Apple key ID (required if Apple enabled)
    /// - `APPLE_PRIVATE_KEY`: Apple ES256 private key PEM (required if Apple enabled)
    /// - `MOCK_IDP_URL`: serve both providers from a mock IdP (development only)
    /// - cookie attributes, see [`CookieConfig::from_env`]
    ///
    /// # Errors
    ///
    /// Returns an error if the signing key is missing, a provider is
    /// partially configured (e.g., client ID without secret) or a TTL exceeds
    /// [`MAX_LIFETIME`].
    pub fn from_env() -> Result<Self, AuthError> {
        let signing_key = std::env::var("AUTH_SIGNING_KEY")
            .map_err(|_| AuthError::Config("AUTH_SIGNING_KEY must be set".to_string()))?;

        let defaults = Self::new(signing_key);

        let google = match std::env::var("GOOGLE_CLIENT_ID") {
            Ok(client_id) => Some(ProviderConfig {
                client_id,
                client_secret: Some(required("GOOGLE_CLIENT_SECRET")?),
            }),
            Err(_) => None,
        };

        let apple = match std::env::var("APPLE_CLIENT_ID") {
            Ok(client_id) => Some(AppleConfig {
                client_id,
                team_id: required("APPLE_TEAM_ID")?,
                key_id: required("APPLE_KEY_ID")?,
                private_key: required("APPLE_PRIVATE_KEY")?,
            }),
            Err(_) => None,
        };

        let mock_idp_url = match std::env::var("MOCK_IDP_URL") {
            Ok(raw) => Some(
                raw.parse::<Url>()
                    .map_err(|e| AuthError::Config(format!("invalid MOCK_IDP_URL: {}", e)))?,
            ),
            Err(_) => None,
        };

        let allowed_redirect_uris = std::env::var("AUTH_ALLOWED_REDIRECT_URIS")
            .map(|v| parse_list(&v))
            .unwrap_or_default();

        Ok(Self {
            access_ttl: env_secs("AUTH_ACCESS_TTL_SECS")?.unwrap_or(defaults.access_ttl),
            refresh_ttl: env_secs("AUTH_REFRESH_TTL_SECS")?.unwrap_or(defaults.refresh_ttl),
            cookies: CookieConfig::from_env()?,
            allowed_redirect_uris,
            google,
            apple,
            mock_idp_url,
            ..defaults
        })
    }
}

fn required(name: &str) -> Result<String, AuthError> {
    std::env::var(name).map_err(|_| AuthError::Config(format!("{} must be set", name)))
}

fn env_secs(name: &str) -> Result<Option<Duration>, AuthError> {
    let Ok(raw) = std::env::var(name) else {
        return Ok(None);
    };
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| AuthError::Config(format!("invalid {}: {}", name, raw)))?;
    bounded(name, Duration::from_secs(secs)).map(Some)
}

fn bounded(name: &str, lifetime: Duration) -> Result<Duration, AuthError> {
    if lifetime > MAX_LIFETIME {
        return Err(AuthError::Config(format!(
            "{} exceeds the maximum of {} seconds",
            name,
            MAX_LIFETIME.as_secs()
        )));
    }
    Ok(lifetime)
}

/// Converts a configured lifetime for date arithmetic.
///
/// Fails with `Config` above [`MAX_LIFETIME`], so adding the result to the
/// current time cannot overflow.
pub(crate) fn chrono_lifetime(lifetime: Duration) -> Result<chrono::Duration, AuthError> {
    let lifetime = bounded("lifetime", lifetime)?;
    chrono::Duration::from_std(lifetime).map_err(|e| AuthError::Config(e.to_string()))
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| v == "true" || v == "1")
}

/// Parse a same-site policy name, case-insensitively.
pub fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

/// Split a comma separated list, dropping empty items.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_defaults_match_token_lifetimes() {
        let cookies = CookieConfig::default();
        let config = AuthConfig::new("key");
        assert_eq!(cookies.access_max_age, config.access_ttl);
        assert_eq!(cookies.refresh_max_age, config.refresh_ttl);
        assert_eq!(cookies.access_name, "access");
        assert_eq!(cookies.refresh_name, "refresh");
    }

    #[test]
    fn lifetimes_above_maximum_are_rejected() {
        assert!(chrono_lifetime(Duration::from_secs(u64::MAX / 2)).is_err());
        assert!(matches!(
            bounded("AUTH_ACCESS_TTL_SECS", MAX_LIFETIME + Duration::from_secs(1)),
            Err(AuthError::Config(msg)) if msg.starts_with("AUTH_ACCESS_TTL_SECS")
        ));
        assert_eq!(
            chrono_lifetime(Duration::from_secs(300)).unwrap(),
            chrono::Duration::minutes(5)
        );
    }

    #[test]
    fn env_secs_rejects_out_of_range_and_garbage() {
        std::env::set_var("AUTHBRIDGE_CONFIG_TEST_HUGE_TTL", u64::MAX.to_string());
        assert!(env_secs("AUTHBRIDGE_CONFIG_TEST_HUGE_TTL").is_err());

        std::env::set_var("AUTHBRIDGE_CONFIG_TEST_BAD_TTL", "five minutes");
        assert!(env_secs("AUTHBRIDGE_CONFIG_TEST_BAD_TTL").is_err());

        std::env::set_var("AUTHBRIDGE_CONFIG_TEST_TTL", "60");
        assert_eq!(
            env_secs("AUTHBRIDGE_CONFIG_TEST_TTL").unwrap(),
            Some(Duration::from_secs(60))
        );
        assert_eq!(env_secs("AUTHBRIDGE_CONFIG_TEST_UNSET").unwrap(), None);
    }

    #[test]
    fn parse_same_site_is_case_insensitive() {
        assert_eq!(parse_same_site("Strict"), Some(SameSite::Strict));
        assert_eq!(parse_same_site("LAX"), Some(SameSite::Lax));
        assert_eq!(parse_same_site("none"), Some(SameSite::None));
        assert_eq!(parse_same_site("sometimes"), None);
    }

    #[test]
    fn parse_list_trims_and_drops_empty_items() {
        assert_eq!(
            parse_list(" http://a/cb, ,http://b/cb ,"),
            vec!["http://a/cb".to_string(), "http://b/cb".to_string()]
        );
        assert!(parse_list("").is_empty());
    }
}
