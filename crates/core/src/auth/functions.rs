use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::AuthFlowState;

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    random_alphanumeric(32)
}

/// Generate a unique JWT identifier (`jti` claim).
pub fn generate_token_id() -> String {
    random_alphanumeric(32)
}

/// Check if a stored auth flow is older than its TTL.
///
/// A deadline past the representable range never expires.
pub fn is_flow_expired(flow: &AuthFlowState, now: DateTime<Utc>, ttl: Duration) -> bool {
    flow.created_at
        .checked_add_signed(ttl)
        .is_some_and(|deadline| deadline <= now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::OidcProvider;

    fn flow_created_at(created_at: DateTime<Utc>) -> AuthFlowState {
        AuthFlowState {
            pkce_verifier: "verifier".to_string(),
            provider: OidcProvider::Google,
            redirect_uri: "http://localhost:3000/auth/google".to_string(),
            created_at,
        }
    }

    #[test]
    fn generate_state_produces_32_char_alphanumeric() {
        let state = generate_state();
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generate_token_id_is_unique() {
        assert_ne!(generate_token_id(), generate_token_id());
    }

    #[test]
    fn fresh_flow_is_not_expired() {
        let now = Utc::now();
        let flow = flow_created_at(now - Duration::minutes(1));
        assert!(!is_flow_expired(&flow, now, Duration::minutes(10)));
    }

    #[test]
    fn old_flow_is_expired() {
        let now = Utc::now();
        let flow = flow_created_at(now - Duration::minutes(11));
        assert!(is_flow_expired(&flow, now, Duration::minutes(10)));
    }

    #[test]
    fn unbounded_ttl_never_expires() {
        let now = Utc::now();
        let flow = flow_created_at(now - Duration::days(365));
        assert!(!is_flow_expired(&flow, now, Duration::MAX));
    }

    #[test]
    fn flow_is_expired_at_exact_ttl() {
        let now = Utc::now();
        let flow = flow_created_at(now - Duration::minutes(10));
        assert!(is_flow_expired(&flow, now, Duration::minutes(10)));
    }
}
