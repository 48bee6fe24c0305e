use async_trait::async_trait;
use uuid::Uuid;

use crate::account::Account;

use super::Result;

/// Repository for account operations.
///
/// Emails passed in and stored are expected to be canonical already; the
/// repository compares them byte for byte.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Gets an account by its ID.
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>>;

    /// Gets an account by its canonical email address.
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Creates a new account. Fails with `AlreadyExists` on a duplicate email.
    async fn create_account(&self, account: &Account) -> Result<()>;

    /// Updates an existing account. Fails with `NotFound` if it does not exist.
    async fn update_account(&self, account: &Account) -> Result<()>;
}
