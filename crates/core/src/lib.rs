//! Functional core for authbridge.
//!
//! Pure types and functions shared by the auth crate and the server binary:
//! accounts and email normalization, token claims, OIDC flow types, error
//! enums and the storage traits implemented by the backends.

pub mod account;
pub mod auth;
pub mod storage;
pub mod token;
