mod types;

pub use types::{AccessToken, Claims, TokenKind, TokenPair};
