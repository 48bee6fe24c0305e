//! Account provisioning and token cookie bridge for authbridge.
//!
//! This crate provides:
//! - An account manager with email canonicalization and Argon2 passwords
//! - JWT issuance, refresh and verification
//! - Handlers that mirror issued tokens into `access`/`refresh` cookies
//! - Social login with Google and Apple
//! - Auth flow storage (in-memory, SQLite or Redis via feature flags)
//! - Axum extractors for authentication

mod accounts;
mod config;
mod cookies;
mod error;
mod extractors;
mod flows;
mod handlers;
mod providers;
mod state;
#[cfg(test)]
mod test_support;
mod tokens;

pub use accounts::AccountManager;
pub use config::{parse_list, AppleConfig, AuthConfig, CookieConfig, ProviderConfig};
pub use cookies::{CookieBridge, TokenPayload};
pub use error::{AuthError, ErrorBody};
pub use extractors::CurrentAccount;
pub use flows::InMemoryFlowStore;
#[cfg(feature = "redis")]
pub use flows::RedisFlowStore;
#[cfg(feature = "sqlite")]
pub use flows::SqliteFlowStore;
pub use handlers::{auth_routes, SocialLogin};
pub use providers::{AppleProvider, GoogleProvider, MockIdentity, MockProvider};
pub use state::AuthState;
pub use tokens::TokenService;
