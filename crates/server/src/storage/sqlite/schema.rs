//! SQLite schema and query definitions.

/// Creates the accounts table. Emails are stored canonicalized, so a plain
/// UNIQUE constraint enforces case-insensitive uniqueness.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY NOT NULL,
    email TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL DEFAULT '',
    last_name TEXT NOT NULL DEFAULT '',
    password_hash TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    is_staff INTEGER NOT NULL DEFAULT 0,
    is_superuser INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

pub const SELECT_ACCOUNT_BY_ID: &str = r#"
SELECT id, email, first_name, last_name, password_hash, is_active, is_staff, is_superuser, created_at, updated_at
FROM accounts
WHERE id = ?1
"#;

pub const SELECT_ACCOUNT_BY_EMAIL: &str = r#"
SELECT id, email, first_name, last_name, password_hash, is_active, is_staff, is_superuser, created_at, updated_at
FROM accounts
WHERE email = ?1
"#;

pub const INSERT_ACCOUNT: &str = r#"
INSERT INTO accounts (id, email, first_name, last_name, password_hash, is_active, is_staff, is_superuser, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
"#;

pub const UPDATE_ACCOUNT: &str = r#"
UPDATE accounts
SET email = ?2, first_name = ?3, last_name = ?4, password_hash = ?5,
    is_active = ?6, is_staff = ?7, is_superuser = ?8, updated_at = ?9
WHERE id = ?1
"#;
