//! Mirroring issued tokens into `access` and `refresh` cookies.

use std::future::Future;

use authbridge_core::token::{AccessToken, TokenPair};
use axum::{http::StatusCode, Json};
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::config::CookieConfig;
use crate::error::AuthError;

/// A response payload that carries token values to be mirrored into cookies.
pub trait TokenPayload {
    fn access(&self) -> Option<&str>;

    fn refresh(&self) -> Option<&str> {
        None
    }
}

impl TokenPayload for TokenPair {
    fn access(&self) -> Option<&str> {
        Some(&self.access)
    }

    fn refresh(&self) -> Option<&str> {
        Some(&self.refresh)
    }
}

impl TokenPayload for AccessToken {
    fn access(&self) -> Option<&str> {
        Some(&self.access)
    }
}

/// Builds, reads and clears the token cookies with one set of attributes.
#[derive(Debug, Clone)]
pub struct CookieBridge {
    config: CookieConfig,
}

impl CookieBridge {
    pub fn new(config: CookieConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    pub fn access_cookie(&self, value: impl Into<String>) -> Cookie<'static> {
        self.build(
            self.config.access_name.clone(),
            value.into(),
            self.config.access_max_age,
        )
    }

    pub fn refresh_cookie(&self, value: impl Into<String>) -> Cookie<'static> {
        self.build(
            self.config.refresh_name.clone(),
            value.into(),
            self.config.refresh_max_age,
        )
    }

    fn build(&self, name: String, value: String, max_age: std::time::Duration) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value))
            .path(self.config.path.clone())
            .http_only(self.config.http_only)
            .secure(self.config.secure)
            .same_site(self.config.same_site)
            .max_age(time::Duration::try_from(max_age).unwrap_or(time::Duration::MAX));

        if let Some(domain) = &self.config.domain {
            builder = builder.domain(domain.clone());
        }

        builder.build()
    }

    /// A cookie that expires `name` on the configured path and domain.
    pub fn removal(&self, name: &str) -> Cookie<'static> {
        let mut builder = Cookie::build((name.to_string(), "")).path(self.config.path.clone());

        if let Some(domain) = &self.config.domain {
            builder = builder.domain(domain.clone());
        }

        let mut cookie = builder.build();
        cookie.make_removal();
        cookie
    }

    /// Write the payload's token values into the jar.
    pub fn store<T: TokenPayload>(&self, jar: CookieJar, payload: &T) -> CookieJar {
        let jar = match payload.access() {
            Some(access) => jar.add(self.access_cookie(access)),
            None => jar,
        };

        match payload.refresh() {
            Some(refresh) => jar.add(self.refresh_cookie(refresh)),
            None => jar,
        }
    }

    /// Run a token operation and mirror its tokens into cookies.
    ///
    /// On success the payload is returned as JSON with `status` and the jar
    /// carries the new cookies. On failure the error is returned unchanged and
    /// no cookie is written.
    pub async fn mirror<T, F>(
        &self,
        jar: CookieJar,
        status: StatusCode,
        operation: F,
    ) -> Result<(StatusCode, CookieJar, Json<T>), AuthError>
    where
        T: TokenPayload + Serialize,
        F: Future<Output = Result<T, AuthError>>,
    {
        let payload = operation.await?;
        let jar = self.store(jar, &payload);
        Ok((status, jar, Json(payload)))
    }

    /// Expire both token cookies, whether or not the client sent them.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.removal(&self.config.access_name))
            .add(self.removal(&self.config.refresh_name))
    }

    /// Read a non-empty incoming cookie value.
    pub fn incoming(&self, jar: &CookieJar, name: &str) -> Option<String> {
        jar.get(name)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn incoming_access(&self, jar: &CookieJar) -> Option<String> {
        self.incoming(jar, &self.config.access_name)
    }

    pub fn incoming_refresh(&self, jar: &CookieJar) -> Option<String> {
        self.incoming(jar, &self.config.refresh_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authbridge_core::auth::AuthError as CoreError;
    use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
    use axum::response::IntoResponse;
    use axum_extra::extract::cookie::SameSite;

    fn bridge() -> CookieBridge {
        CookieBridge::new(CookieConfig::default())
    }

    fn set_cookies(response: axum::response::Response) -> Vec<String> {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn access_cookie_carries_configured_attributes() {
        let cookie = bridge().access_cookie("abc");
        assert_eq!(cookie.name(), "access");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(300)));
    }

    #[test]
    fn refresh_cookie_uses_refresh_lifetime_and_domain() {
        let bridge = CookieBridge::new(CookieConfig {
            domain: Some("example.com".to_string()),
            same_site: SameSite::Strict,
            ..CookieConfig::default()
        });
        let cookie = bridge.refresh_cookie("r");
        assert_eq!(cookie.name(), "refresh");
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(86400)));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn oversized_max_age_saturates() {
        let bridge = CookieBridge::new(CookieConfig {
            access_max_age: std::time::Duration::from_secs(u64::MAX),
            ..CookieConfig::default()
        });
        let max_age = bridge.access_cookie("abc").max_age().unwrap();
        assert!(max_age.is_positive());
    }

    #[tokio::test]
    async fn mirror_sets_both_cookies_for_pair() {
        let pair = TokenPair {
            access: "a1".to_string(),
            refresh: "r1".to_string(),
        };
        let response = bridge()
            .mirror(CookieJar::new(), StatusCode::OK, async { Ok::<_, AuthError>(pair) })
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookies(response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("access=a1")));
        assert!(cookies.iter().any(|c| c.starts_with("refresh=r1")));
    }

    #[tokio::test]
    async fn mirror_sets_only_access_for_access_token() {
        let token = AccessToken {
            access: "a2".to_string(),
        };
        let response = bridge()
            .mirror(CookieJar::new(), StatusCode::OK, async { Ok::<_, AuthError>(token) })
            .await
            .into_response();

        let cookies = set_cookies(response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("access=a2"));
    }

    #[tokio::test]
    async fn mirror_leaves_cookies_untouched_on_failure() {
        let result = bridge()
            .mirror::<TokenPair, _>(CookieJar::new(), StatusCode::OK, async {
                Err(AuthError::from(CoreError::InvalidCredentials))
            })
            .await;

        let response = result.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(response).is_empty());
    }

    #[test]
    fn clear_expires_both_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("access=a; refresh=r"),
        );
        let jar = bridge().clear(CookieJar::from_headers(&headers));

        let cookies = set_cookies((jar, StatusCode::NO_CONTENT).into_response());
        assert_eq!(cookies.len(), 2);
        for cookie in cookies {
            assert!(cookie.contains("Max-Age=0"));
            assert!(cookie.contains("Path=/"));
        }
    }

    #[test]
    fn clear_without_prior_cookies_still_emits_removals() {
        let jar = bridge().clear(CookieJar::new());
        let cookies = set_cookies((jar, StatusCode::NO_CONTENT).into_response());
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn incoming_ignores_empty_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("access=; refresh=r9"),
        );
        let jar = CookieJar::from_headers(&headers);
        let bridge = bridge();

        assert_eq!(bridge.incoming_access(&jar), None);
        assert_eq!(bridge.incoming_refresh(&jar), Some("r9".to_string()));
    }
}
