//! In-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use authbridge_core::account::Account;
use authbridge_core::storage::{AccountRepository, RepositoryError, Result};

/// In-memory storage backend for development and testing.
///
/// Accounts are indexed by id and by email, each map wrapped in
/// `Arc<RwLock<_>>`. Data is lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
    emails: Arc<RwLock<HashMap<String, Uuid>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            emails: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryRepository {
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let emails = self.emails.read().await;
        let Some(id) = emails.get(email) else {
            return Ok(None);
        };
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).cloned())
    }

    async fn create_account(&self, account: &Account) -> Result<()> {
        // Lock order: emails, then accounts.
        let mut emails = self.emails.write().await;
        let mut accounts = self.accounts.write().await;

        if emails.contains_key(&account.email) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Account",
                id: account.email.clone(),
            });
        }
        if accounts.contains_key(&account.id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Account",
                id: account.id.to_string(),
            });
        }

        emails.insert(account.email.clone(), account.id);
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        let mut emails = self.emails.write().await;
        let mut accounts = self.accounts.write().await;

        let Some(existing) = accounts.get(&account.id) else {
            return Err(RepositoryError::NotFound {
                entity_type: "Account",
                id: account.id.to_string(),
            });
        };

        if existing.email != account.email {
            if emails.contains_key(&account.email) {
                return Err(RepositoryError::AlreadyExists {
                    entity_type: "Account",
                    id: account.email.clone(),
                });
            }
            emails.remove(&existing.email);
            emails.insert(account.email.clone(), account.id);
        }

        accounts.insert(account.id, account.clone());
        Ok(())
    }
}
