mod error;
mod functions;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{generate_state, generate_token_id, is_flow_expired};
pub use traits::{AuthFlowRepository, OidcProviderClient, Result};
pub use types::{AuthFlowState, OidcClaims, OidcProvider};
pub use validation::validate_redirect_uri;
