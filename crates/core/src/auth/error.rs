use thiserror::Error;

use crate::storage::RepositoryError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("no active account found with the given credentials")]
    InvalidCredentials,

    #[error("token is invalid or expired: {0}")]
    InvalidToken(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid OIDC state parameter")]
    InvalidState,

    #[error("failed to exchange authorization code: {0}")]
    CodeExchange(String),

    #[error("missing required claim: {0}")]
    MissingClaim(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("provider error: {0}")]
    Provider(String),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::AlreadyExists { entity_type, id } => {
                AuthError::Conflict(format!("{} with this email already exists: {}", entity_type, id))
            }
            other => AuthError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn already_exists_becomes_conflict() {
        let err = AuthError::from(RepositoryError::AlreadyExists {
            entity_type: "Account",
            id: "a@example.com".to_string(),
        });
        assert_eq!(
            err,
            AuthError::Conflict("Account with this email already exists: a@example.com".to_string())
        );
    }

    #[test]
    fn other_repository_errors_become_storage() {
        let err = AuthError::from(RepositoryError::QueryFailed("disk I/O error".to_string()));
        assert!(matches!(err, AuthError::Storage(msg) if msg.contains("disk I/O error")));
    }

    #[test]
    fn invalid_credentials_message_does_not_leak_reason() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "no active account found with the given credentials"
        );
    }
}
