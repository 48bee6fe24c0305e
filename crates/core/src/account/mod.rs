mod email;
mod types;

pub use email::{canonical_email, normalize_email, split_full_name};
pub use types::{Account, AccountView, NewAccount};
