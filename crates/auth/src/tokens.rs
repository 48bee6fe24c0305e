//! JWT issuance and verification.

use std::time::Duration;

use authbridge_core::account::Account;
use authbridge_core::auth::AuthError as CoreError;
use authbridge_core::token::{AccessToken, Claims, TokenKind, TokenPair};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::accounts::AccountManager;
use crate::config::{chrono_lifetime, AuthConfig};
use crate::error::AuthError;

/// Signs and checks HS256 access and refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    accounts: AccountManager,
}

impl TokenService {
    pub fn new(config: &AuthConfig, accounts: AccountManager) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.signing_key.as_bytes()),
            decoding: DecodingKey::from_secret(config.signing_key.as_bytes()),
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
            accounts,
        }
    }

    /// Issue an access and refresh token for an authenticated account.
    pub fn issue_pair(&self, account: &Account) -> Result<TokenPair, AuthError> {
        let pair = TokenPair {
            access: self.issue(TokenKind::Access, account.id, self.access_ttl)?,
            refresh: self.issue(TokenKind::Refresh, account.id, self.refresh_ttl)?,
        };
        tracing::info!(account_id = %account.id, "issued token pair");
        Ok(pair)
    }

    pub fn issue_access(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue(TokenKind::Access, user_id, self.access_ttl)
    }

    fn issue(&self, kind: TokenKind, user_id: Uuid, ttl: Duration) -> Result<String, AuthError> {
        let claims = Claims::new(kind, user_id, Utc::now(), chrono_lifetime(ttl)?);
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| CoreError::Storage(format!("failed to sign token: {}", e)).into())
    }

    /// Verify signature and expiry and, when `expected` is set, the token kind.
    pub fn decode(&self, token: &str, expected: Option<TokenKind>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::warn!("Rejected token: {}", e);
                CoreError::InvalidToken(e.to_string())
            })?
            .claims;

        match expected {
            Some(kind) if claims.token_type != kind => {
                tracing::warn!("Rejected {} token where {} was required", claims.token_type, kind);
                Err(CoreError::InvalidToken(format!("token has wrong type, expected {}", kind)).into())
            }
            _ => Ok(claims),
        }
    }

    /// Mint a new access token from a refresh token.
    ///
    /// The account must still exist and be active.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AuthError> {
        let claims = self.decode(refresh_token, Some(TokenKind::Refresh))?;

        match self.accounts.get(claims.user_id).await? {
            Some(account) if account.is_active => Ok(AccessToken {
                access: self.issue_access(account.id)?,
            }),
            _ => Err(CoreError::InvalidToken("account not found or inactive".to_string()).into()),
        }
    }

    /// Check that a token of either kind is valid.
    pub fn verify(&self, token: &str) -> Result<(), AuthError> {
        self.decode(token, None).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryAccounts;
    use authbridge_core::account::NewAccount;
    use std::sync::Arc;

    fn service() -> (TokenService, AccountManager) {
        let accounts = AccountManager::new(Arc::new(MemoryAccounts::default()));
        let service = TokenService::new(&AuthConfig::new("test-signing-key"), accounts.clone());
        (service, accounts)
    }

    async fn account(accounts: &AccountManager, email: &str) -> Account {
        accounts
            .create_account(NewAccount::new(email, "pw"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn issued_pair_decodes_to_matching_kinds() {
        let (tokens, accounts) = service();
        let account = account(&accounts, "a@example.com").await;
        let pair = tokens.issue_pair(&account).unwrap();

        let access = tokens.decode(&pair.access, Some(TokenKind::Access)).unwrap();
        let refresh = tokens.decode(&pair.refresh, Some(TokenKind::Refresh)).unwrap();
        assert_eq!(access.user_id, account.id);
        assert_eq!(refresh.user_id, account.id);
        assert_eq!(access.exp - access.iat, 300);
        assert_eq!(refresh.exp - refresh.iat, 86400);
    }

    #[tokio::test]
    async fn token_kinds_are_not_interchangeable() {
        let (tokens, accounts) = service();
        let account = account(&accounts, "a@example.com").await;
        let pair = tokens.issue_pair(&account).unwrap();

        assert!(tokens.decode(&pair.access, Some(TokenKind::Refresh)).is_err());
        assert!(tokens.decode(&pair.refresh, Some(TokenKind::Access)).is_err());
        assert!(tokens.refresh(&pair.access).await.is_err());
    }

    #[tokio::test]
    async fn refresh_issues_new_access_token() {
        let (tokens, accounts) = service();
        let account = account(&accounts, "a@example.com").await;
        let pair = tokens.issue_pair(&account).unwrap();

        let fresh = tokens.refresh(&pair.refresh).await.unwrap();
        let claims = tokens.decode(&fresh.access, Some(TokenKind::Access)).unwrap();
        assert_eq!(claims.user_id, account.id);
    }

    #[tokio::test]
    async fn refresh_rejects_unknown_account() {
        let (tokens, _) = service();
        let orphan = Account::new("ghost@example.com");
        let pair = tokens.issue_pair(&orphan).unwrap();

        let err = tokens.refresh(&pair.refresh).await.unwrap_err();
        assert!(matches!(err, AuthError::Core(CoreError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let (tokens, _) = service();
        let issued = Utc::now() - chrono::Duration::minutes(10);
        let claims = Claims::new(
            TokenKind::Access,
            Uuid::new_v4(),
            issued,
            chrono::Duration::minutes(5),
        );
        let token = tokens.sign(&claims).unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn oversized_lifetime_is_a_config_error() {
        let mut config = AuthConfig::new("test-signing-key");
        config.access_ttl = Duration::from_secs(u64::MAX / 2);
        let tokens = TokenService::new(
            &config,
            AccountManager::new(Arc::new(MemoryAccounts::default())),
        );

        let err = tokens.issue_access(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let (tokens, _) = service();
        let other = TokenService::new(
            &AuthConfig::new("another-key"),
            AccountManager::new(Arc::new(MemoryAccounts::default())),
        );
        let token = other.issue_access(Uuid::new_v4()).unwrap();

        assert!(tokens.verify(&token).is_err());
        assert!(tokens.verify("not.a.jwt").is_err());
    }
}
