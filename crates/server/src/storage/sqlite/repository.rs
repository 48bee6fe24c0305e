//! SQLite repository implementation.
//!
//! Implements `AccountRepository` from `authbridge_core::storage` using SQLite.

use async_trait::async_trait;
use rusqlite::params;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use authbridge_core::account::Account;
use authbridge_core::storage::{AccountRepository, RepositoryError, Result};

use super::conversions::{format_datetime, row_to_account};
use super::error::map_tokio_rusqlite_error_with_id;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based account repository.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES).map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    async fn find_one(&self, query: &'static str, key: String) -> Result<Option<Account>> {
        let id = key.clone();

        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(query).map_err(wrap_err)?;
                match stmt.query_row([&key], row_to_account) {
                    Ok(account) => Ok(Some(account)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Account", id))
    }
}

#[async_trait]
impl AccountRepository for SqliteRepository {
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        self.find_one(schema::SELECT_ACCOUNT_BY_ID, id.to_string()).await
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        self.find_one(schema::SELECT_ACCOUNT_BY_EMAIL, email.to_string())
            .await
    }

    async fn create_account(&self, account: &Account) -> Result<()> {
        let account = account.clone();
        let email = account.email.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_ACCOUNT,
                    params![
                        account.id.to_string(),
                        account.email,
                        account.first_name,
                        account.last_name,
                        account.password_hash,
                        account.is_active,
                        account.is_staff,
                        account.is_superuser,
                        format_datetime(&account.created_at),
                        format_datetime(&account.updated_at),
                    ],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Account", email))
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        let account = account.clone();
        let id = account.id.to_string();

        let rows = self
            .conn
            .call(move |conn| {
                conn.execute(
                    schema::UPDATE_ACCOUNT,
                    params![
                        account.id.to_string(),
                        account.email,
                        account.first_name,
                        account.last_name,
                        account.password_hash,
                        account.is_active,
                        account.is_staff,
                        account.is_superuser,
                        format_datetime(&account.updated_at),
                    ],
                )
                .map_err(wrap_err)
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Account", id.clone()))?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity_type: "Account",
                id,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> SqliteRepository {
        SqliteRepository::new_in_memory()
            .await
            .expect("Failed to create in-memory repository")
    }

    #[tokio::test]
    async fn test_create_and_get_account() {
        let repo = setup().await;
        let account = Account::new("ada@example.com")
            .with_names("Ada", "Lovelace")
            .with_password_hash("$argon2id$v=19$stub");

        repo.create_account(&account).await.unwrap();

        let by_id = repo.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");
        assert_eq!(by_id.password_hash.as_deref(), Some("$argon2id$v=19$stub"));
        assert_eq!(by_id.created_at.timestamp(), account.created_at.timestamp());

        let by_email = repo.get_account_by_email("ada@example.com").await.unwrap();
        assert_eq!(by_email.map(|a| a.id), Some(account.id));
    }

    #[tokio::test]
    async fn test_get_missing_account() {
        let repo = setup().await;
        assert!(repo.get_account(Uuid::new_v4()).await.unwrap().is_none());
        assert!(repo
            .get_account_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_already_exists() {
        let repo = setup().await;
        repo.create_account(&Account::new("ada@example.com"))
            .await
            .unwrap();

        let result = repo.create_account(&Account::new("ada@example.com")).await;
        assert!(matches!(
            result,
            Err(RepositoryError::AlreadyExists { entity_type: "Account", id }) if id == "ada@example.com"
        ));
    }

    #[tokio::test]
    async fn test_update_account() {
        let repo = setup().await;
        let mut account = Account::new("ada@example.com");
        repo.create_account(&account).await.unwrap();

        account.promote();
        account.is_active = false;
        repo.update_account(&account).await.unwrap();

        let stored = repo.get_account(account.id).await.unwrap().unwrap();
        assert!(stored.is_staff);
        assert!(stored.is_superuser);
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_update_missing_account_is_not_found() {
        let repo = setup().await;
        let result = repo.update_account(&Account::new("ghost@example.com")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }
}
