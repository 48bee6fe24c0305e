//! Account provisioning and password authentication.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use authbridge_core::account::{canonical_email, split_full_name, Account, NewAccount};
use authbridge_core::auth::{AuthError as CoreError, OidcClaims};
use authbridge_core::storage::AccountRepository;
use uuid::Uuid;

use crate::error::AuthError;

/// Creates, loads and authenticates accounts.
///
/// The canonical email is the username: every address is canonicalized before
/// it is stored or looked up.
#[derive(Clone)]
pub struct AccountManager {
    repo: Arc<dyn AccountRepository>,
}

impl AccountManager {
    pub fn new(repo: Arc<dyn AccountRepository>) -> Self {
        Self { repo }
    }

    /// Creates an ordinary account.
    ///
    /// # Errors
    ///
    /// - `Validation` if the email is empty
    /// - `Conflict` if an account with the same canonical email exists
    /// - `Storage` if the repository fails
    pub async fn create_account(&self, input: NewAccount) -> Result<Account, AuthError> {
        let email = canonical_email(&input.email);
        if email.is_empty() {
            return Err(CoreError::Validation("Users must have an email address".to_string()).into());
        }

        if self.repo.get_account_by_email(&email).await?.is_some() {
            tracing::warn!("Rejected duplicate account for {}", email);
            return Err(CoreError::Conflict(format!(
                "account with this email already exists: {}",
                email
            ))
            .into());
        }

        let mut account = Account::new(email).with_names(input.first_name, input.last_name);
        account.is_active = input.is_active;
        if let Some(password) = input.password {
            account = account.with_password_hash(hash_password(&password)?);
        }

        self.repo.create_account(&account).await?;
        tracing::info!(account_id = %account.id, "account created");

        Ok(account)
    }

    /// Creates an account with the staff and superuser flags set.
    pub async fn create_admin_account(&self, input: NewAccount) -> Result<Account, AuthError> {
        let mut account = self.create_account(input).await?;
        account.promote();
        self.repo.update_account(&account).await?;
        tracing::info!(account_id = %account.id, "account promoted to administrator");

        Ok(account)
    }

    /// Checks an email and password pair.
    ///
    /// Unknown email, wrong password, unusable password and inactive account
    /// are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = canonical_email(email);

        let Some(account) = self.repo.get_account_by_email(&email).await? else {
            tracing::warn!("Login failed: unknown account");
            return Err(CoreError::InvalidCredentials.into());
        };

        let verified = account
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(password, hash));

        if !verified || !account.is_active {
            tracing::warn!(account_id = %account.id, "Login failed");
            return Err(CoreError::InvalidCredentials.into());
        }

        Ok(account)
    }

    /// Resolves the account for a completed social login, creating it on first use.
    ///
    /// # Errors
    ///
    /// - `MissingClaim` if the provider did not return an email
    /// - `InvalidCredentials` if the matching account is inactive
    pub async fn find_or_create_social(&self, claims: &OidcClaims) -> Result<Account, AuthError> {
        let email = claims
            .email
            .as_deref()
            .map(canonical_email)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| CoreError::MissingClaim("email".to_string()))?;

        if let Some(account) = self.repo.get_account_by_email(&email).await? {
            if !account.is_active {
                tracing::warn!(account_id = %account.id, "Social login for inactive account");
                return Err(CoreError::InvalidCredentials.into());
            }
            return Ok(account);
        }

        let (first_name, last_name) = claims
            .name
            .as_deref()
            .map(split_full_name)
            .unwrap_or_default();

        tracing::info!(provider = %claims.provider, "Creating account from social login");
        self.create_account(NewAccount::without_password(email).with_names(first_name, last_name))
            .await
    }

    /// Loads an account by id.
    pub async fn get(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        Ok(self.repo.get_account(id).await?)
    }
}

/// Hash a password with Argon2id and a random salt.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Storage(format!("password hashing failed: {}", e)))?
        .to_string())
}

/// Verify a password against a PHC hash. Malformed hashes never verify.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryAccounts;
    use authbridge_core::auth::OidcProvider;

    fn manager() -> (AccountManager, Arc<MemoryAccounts>) {
        let repo = Arc::new(MemoryAccounts::default());
        (AccountManager::new(repo.clone()), repo)
    }

    fn claims(email: Option<&str>, name: Option<&str>) -> OidcClaims {
        OidcClaims {
            subject: "sub-1".to_string(),
            email: email.map(String::from),
            name: name.map(String::from),
            provider: OidcProvider::Google,
        }
    }

    #[tokio::test]
    async fn create_account_canonicalizes_email_and_hashes_password() {
        let (manager, _) = manager();
        let account = manager
            .create_account(NewAccount::new("John@Example.COM", "s3cret").with_names("John", "Doe"))
            .await
            .unwrap();

        assert_eq!(account.email, "john@example.com");
        assert!(account.is_active);
        assert!(!account.is_staff);
        assert!(!account.is_superuser);
        let hash = account.password_hash.as_deref().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("s3cret"));
    }

    #[tokio::test]
    async fn create_account_rejects_empty_email() {
        let (manager, _) = manager();
        let err = manager
            .create_account(NewAccount::new("   ", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Core(CoreError::Validation(msg)) if msg == "Users must have an email address"
        ));
    }

    #[tokio::test]
    async fn create_account_without_password_is_unusable() {
        let (manager, _) = manager();
        let account = manager
            .create_account(NewAccount::without_password("a@example.com"))
            .await
            .unwrap();
        assert!(!account.has_usable_password());

        let err = manager.authenticate("a@example.com", "").await.unwrap_err();
        assert!(matches!(err, AuthError::Core(CoreError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn case_variant_email_is_a_conflict() {
        let (manager, _) = manager();
        manager
            .create_account(NewAccount::new("abc@gmail.com", "pw"))
            .await
            .unwrap();
        let err = manager
            .create_account(NewAccount::new("ABC@GMAIL.COM", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Core(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_admin_account_persists_both_flags() {
        let (manager, repo) = manager();
        let admin = manager
            .create_admin_account(NewAccount::new("root@example.com", "pw"))
            .await
            .unwrap();
        assert!(admin.is_staff && admin.is_superuser);

        let stored = repo.get_account(admin.id).await.unwrap().unwrap();
        assert!(stored.is_staff);
        assert!(stored.is_superuser);
    }

    #[tokio::test]
    async fn authenticate_ignores_email_case() {
        let (manager, _) = manager();
        let created = manager
            .create_account(NewAccount::new("Mixed@Example.com", "pw"))
            .await
            .unwrap();

        let found = manager.authenticate("MIXED@EXAMPLE.COM", "pw").await.unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn authenticate_failures_are_uniform() {
        let (manager, _) = manager();
        manager
            .create_account(NewAccount::new("a@example.com", "right"))
            .await
            .unwrap();
        manager
            .create_account(NewAccount::new("off@example.com", "pw").inactive())
            .await
            .unwrap();

        for (email, password) in [
            ("a@example.com", "wrong"),
            ("missing@example.com", "right"),
            ("off@example.com", "pw"),
        ] {
            let err = manager.authenticate(email, password).await.unwrap_err();
            assert_eq!(
                err.to_string(),
                "no active account found with the given credentials"
            );
        }
    }

    #[tokio::test]
    async fn social_login_creates_then_reuses_account() {
        let (manager, _) = manager();
        let first = manager
            .find_or_create_social(&claims(Some("Ada@Example.com"), Some("Ada Lovelace")))
            .await
            .unwrap();
        assert_eq!(first.email, "ada@example.com");
        assert_eq!(first.first_name, "Ada");
        assert_eq!(first.last_name, "Lovelace");
        assert!(!first.has_usable_password());

        let second = manager
            .find_or_create_social(&claims(Some("ada@example.com"), None))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
    }

    #[tokio::test]
    async fn social_login_requires_email() {
        let (manager, _) = manager();
        let err = manager
            .find_or_create_social(&claims(None, Some("No Mail")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Core(CoreError::MissingClaim(c)) if c == "email"));
    }

    #[tokio::test]
    async fn social_login_rejects_inactive_account() {
        let (manager, _) = manager();
        manager
            .create_account(NewAccount::new("off@example.com", "pw").inactive())
            .await
            .unwrap();
        let err = manager
            .find_or_create_social(&claims(Some("off@example.com"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Core(CoreError::InvalidCredentials)));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("pw", "not-a-phc-string"));
    }
}
