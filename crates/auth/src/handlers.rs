//! HTTP handlers for auth routes.

use authbridge_core::account::{AccountView, NewAccount};
use authbridge_core::auth::{
    generate_state, is_flow_expired, validate_redirect_uri, AuthError as CoreError, AuthFlowState,
    OidcProvider,
};
use authbridge_core::token::{AccessToken, TokenPair};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use openidconnect::PkceCodeChallenge;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::config::chrono_lifetime;
use crate::cookies::TokenPayload;
use crate::error::AuthError;
use crate::extractors::CurrentAccount;
use crate::AuthState;

/// Body of `POST /jwt/create/`.
#[derive(Deserialize, Default)]
pub struct CredentialsBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /jwt/refresh/` when no refresh cookie is sent.
#[derive(Deserialize, Default)]
pub struct RefreshBody {
    pub refresh: Option<String>,
}

/// Body of `POST /jwt/verify/` when no access cookie is sent.
#[derive(Deserialize, Default)]
pub struct VerifyBody {
    pub token: Option<String>,
}

/// Query parameters for starting a social login.
#[derive(Deserialize)]
pub struct AuthorizeQuery {
    pub redirect_uri: Option<String>,
}

/// Provider callback parameters, from the query string or a JSON body.
#[derive(Deserialize, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[derive(Serialize)]
pub struct AuthorizationUrl {
    pub authorization_url: String,
}

/// Result of a completed social login.
#[derive(Debug, Serialize)]
pub struct SocialLogin {
    pub access: String,
    pub refresh: String,
    /// Email of the logged-in account.
    pub user: String,
}

impl TokenPayload for SocialLogin {
    fn access(&self) -> Option<&str> {
        Some(&self.access)
    }

    fn refresh(&self) -> Option<&str> {
        Some(&self.refresh)
    }
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /o/{provider}/` - Start a social login, returns the authorization URL
/// - `POST /o/{provider}/` - Complete a social login, sets both cookies
/// - `POST /jwt/create/` - Log in with email and password, sets both cookies
/// - `POST /jwt/refresh/` - Mint an access token, sets the access cookie
/// - `POST /jwt/verify/` - Check a token
/// - `POST /logout/` - Clear both cookies
/// - `POST /users/` - Register an account
/// - `GET /users/me/` - Get the current account
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route(
            "/o/{provider}/",
            get(social_authorize).post(social_login),
        )
        .route("/jwt/create/", post(create_tokens))
        .route("/jwt/refresh/", post(refresh_token))
        .route("/jwt/verify/", post(verify_token))
        .route("/logout/", post(logout))
        .route("/users/", post(register))
        .route("/users/me/", get(me))
}

/// Parse an optional JSON body. An empty body yields the default value.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, AuthError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| CoreError::Validation(format!("malformed request body: {}", e)).into())
}

fn required(value: Option<String>, field: &str) -> Result<String, AuthError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::Validation(format!("{}: This field is required.", field)).into())
}

fn parse_provider(name: &str) -> Result<OidcProvider, AuthError> {
    name.parse::<OidcProvider>()
        .map_err(AuthError::ProviderNotConfigured)
}

async fn create_tokens(
    State(state): State<AuthState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<impl IntoResponse, AuthError> {
    let credentials: CredentialsBody = parse_body(&body)?;
    let email = required(credentials.email, "email")?;
    let password = required(credentials.password, "password")?;

    state
        .cookies
        .mirror(jar, StatusCode::OK, async {
            let account = state.accounts.authenticate(&email, &password).await?;
            state.tokens.issue_pair(&account)
        })
        .await
}

async fn refresh_token(
    State(state): State<AuthState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<impl IntoResponse, AuthError> {
    let token = match state.cookies.incoming_refresh(&jar) {
        Some(token) => token,
        None => required(parse_body::<RefreshBody>(&body)?.refresh, "refresh")?,
    };

    state
        .cookies
        .mirror::<AccessToken, _>(jar, StatusCode::OK, state.tokens.refresh(&token))
        .await
}

async fn verify_token(
    State(state): State<AuthState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<StatusCode, AuthError> {
    let token = match state.cookies.incoming_access(&jar) {
        Some(token) => token,
        None => required(parse_body::<VerifyBody>(&body)?.token, "token")?,
    };

    state.tokens.verify(&token)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn logout(State(state): State<AuthState>, jar: CookieJar) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, state.cookies.clear(jar))
}

async fn social_authorize(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Json<AuthorizationUrl>, AuthError> {
    let provider = parse_provider(&provider)?;
    let client = state.get_provider(provider)?;

    let redirect_uri = query
        .redirect_uri
        .as_deref()
        .and_then(|uri| validate_redirect_uri(uri, &state.config.allowed_redirect_uris))
        .ok_or_else(|| {
            CoreError::Validation("redirect_uri must be in the allowed list".to_string())
        })?;
    let redirect_url = Url::parse(redirect_uri)
        .map_err(|e| CoreError::Validation(format!("invalid redirect_uri: {}", e)))?;

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_state = generate_state();

    let flow = AuthFlowState {
        pkce_verifier: pkce_verifier.secret().to_string(),
        provider,
        redirect_uri: redirect_uri.to_string(),
        created_at: Utc::now(),
    };
    state.flows.store_auth_flow(&csrf_state, &flow).await?;

    let url = client
        .authorization_url(&csrf_state, pkce_challenge.as_str(), &redirect_url)
        .await?;

    tracing::debug!(%provider, "Started social login");
    Ok(Json(AuthorizationUrl {
        authorization_url: url.to_string(),
    }))
}

async fn social_login(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackParams>,
    jar: CookieJar,
    body: Bytes,
) -> Result<impl IntoResponse, AuthError> {
    let provider = parse_provider(&provider)?;
    let client = state.get_provider(provider)?;

    let params = match (&query.code, &query.state) {
        (Some(_), Some(_)) => query,
        _ => parse_body::<CallbackParams>(&body)?,
    };
    let code = required(params.code, "code")?;
    let csrf_state = required(params.state, "state")?;

    state
        .cookies
        .mirror(jar, StatusCode::CREATED, async {
            let flow = state
                .flows
                .take_auth_flow(&csrf_state)
                .await?
                .ok_or(CoreError::InvalidState)?;

            let ttl = chrono_lifetime(state.config.flow_ttl)?;
            if flow.provider != provider || is_flow_expired(&flow, Utc::now(), ttl) {
                return Err(AuthError::from(CoreError::InvalidState));
            }

            let redirect_uri = Url::parse(&flow.redirect_uri)
                .map_err(|e| CoreError::Storage(format!("stored redirect_uri: {}", e)))?;
            let claims = client
                .exchange_code(&code, &flow.pkce_verifier, &redirect_uri)
                .await?;

            let account = state.accounts.find_or_create_social(&claims).await?;
            let TokenPair { access, refresh } = state.tokens.issue_pair(&account)?;

            tracing::info!(account_id = %account.id, %provider, "Social login succeeded");
            Ok::<_, AuthError>(SocialLogin {
                access,
                refresh,
                user: account.email,
            })
        })
        .await
}

async fn register(
    State(state): State<AuthState>,
    body: Bytes,
) -> Result<(StatusCode, Json<AccountView>), AuthError> {
    let input: NewAccount = serde_json::from_slice(&body)
        .map_err(|e| CoreError::Validation(format!("malformed request body: {}", e)))?;
    if input.password.as_deref().is_none_or(str::is_empty) {
        return Err(CoreError::Validation("password: This field is required.".to_string()).into());
    }
    // Social accounts may have no name; registered accounts may not.
    for (field, value) in [("first_name", &input.first_name), ("last_name", &input.last_name)] {
        if value.trim().is_empty() {
            return Err(
                CoreError::Validation(format!("{}: This field is required.", field)).into(),
            );
        }
    }

    let account = state.accounts.create_account(input).await?;
    Ok((StatusCode::CREATED, Json(AccountView::from(&account))))
}

async fn me(CurrentAccount(account): CurrentAccount) -> Json<AccountView> {
    Json(AccountView::from(&account))
}
