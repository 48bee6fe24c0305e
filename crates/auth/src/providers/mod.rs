//! OIDC provider implementations.
//!
//! This module contains implementations of `OidcProviderClient` for:
//! - Google
//! - Apple (with JWT client secret generation)
//! - a mock provider for development and tests

mod apple;
mod google;
mod mock;
mod oidc;

pub use apple::AppleProvider;
pub use google::GoogleProvider;
pub use mock::{MockIdentity, MockProvider};
