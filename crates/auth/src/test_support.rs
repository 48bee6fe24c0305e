//! Test doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use authbridge_core::account::Account;
use authbridge_core::storage::{AccountRepository, RepositoryError, Result};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Account store keyed by id.
#[derive(Default)]
pub struct MemoryAccounts {
    accounts: Arc<RwLock<HashMap<Uuid, Account>>>,
}

#[async_trait]
impl AccountRepository for MemoryAccounts {
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn create_account(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Account",
                id: account.email.clone(),
            });
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        if !accounts.contains_key(&account.id) {
            return Err(RepositoryError::NotFound {
                entity_type: "Account",
                id: account.id.to_string(),
            });
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }
}
