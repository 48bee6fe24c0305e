//! Axum extractors for authentication.

use authbridge_core::account::Account;
use authbridge_core::auth::AuthError as CoreError;
use authbridge_core::token::TokenKind;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;

use crate::error::AuthError;
use crate::AuthState;

/// Accepted `Authorization` schemes, matched case-insensitively.
const SCHEMES: [&str; 2] = ["Bearer", "JWT"];

/// Token from an `Authorization` value using one of [`SCHEMES`].
fn scheme_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    SCHEMES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(scheme))
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

/// Extractor for an authenticated, active account. Returns 401 otherwise.
///
/// The access token is read from the `Authorization` header first (API and
/// mobile clients) and from the access cookie second (browsers).
pub struct CurrentAccount(pub Account);

impl<S> FromRequestParts<S> for CurrentAccount
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let header_token = match parts.headers.get(AUTHORIZATION) {
            Some(value) => {
                let value = value
                    .to_str()
                    .map_err(|_| CoreError::InvalidToken("invalid authorization header".into()))?;
                scheme_token(value).map(str::to_string)
            }
            None => None,
        };

        let token = match header_token {
            Some(token) => token,
            None => auth_state
                .cookies
                .incoming_access(&CookieJar::from_headers(&parts.headers))
                .ok_or_else(|| {
                    CoreError::InvalidToken(
                        "authentication credentials were not provided".to_string(),
                    )
                })?,
        };

        let claims = auth_state.tokens.decode(&token, Some(TokenKind::Access))?;

        match auth_state.accounts.get(claims.user_id).await? {
            Some(account) if account.is_active => Ok(CurrentAccount(account)),
            _ => Err(CoreError::InvalidToken("account not found or inactive".to_string()).into()),
        }
    }
}
