use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Auth errors for the authbridge_auth crate.
///
/// This wraps the core `AuthError` and adds crate-specific error variants
/// for failures that can't happen in the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (validation, credentials, tokens, etc.)
    #[error(transparent)]
    Core(#[from] authbridge_core::auth::AuthError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider not configured
    #[error("provider not configured: {0}")]
    ProviderNotConfigured(String),
}

impl From<authbridge_core::storage::RepositoryError> for AuthError {
    fn from(err: authbridge_core::storage::RepositoryError) -> Self {
        AuthError::Core(err.into())
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub code: &'static str,
}

impl AuthError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        use authbridge_core::auth::AuthError as CoreError;

        match self {
            AuthError::Core(core_err) => match core_err {
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid"),
                CoreError::Conflict(_) => (StatusCode::BAD_REQUEST, "conflict"),
                CoreError::InvalidState => (StatusCode::BAD_REQUEST, "invalid_state"),
                CoreError::MissingClaim(_) => (StatusCode::BAD_REQUEST, "missing_claim"),
                CoreError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "no_active_account"),
                CoreError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "token_not_valid"),
                CoreError::CodeExchange(_) | CoreError::Provider(_) => {
                    (StatusCode::BAD_GATEWAY, "provider_error")
                }
                CoreError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error"),
            },
            AuthError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "server_error"),
            AuthError::ProviderNotConfigured(_) => {
                (StatusCode::NOT_FOUND, "provider_not_configured")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let detail = match status {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Auth error: {}", self);
                "Internal server error".to_string()
            }
            StatusCode::BAD_GATEWAY => {
                tracing::error!("Provider error during auth: {}", self);
                "Authentication provider error".to_string()
            }
            StatusCode::NOT_FOUND => match &self {
                AuthError::ProviderNotConfigured(provider) => {
                    format!("Authentication provider '{}' is not configured", provider)
                }
                other => other.to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(ErrorBody { detail, code })).into_response()
    }
}
