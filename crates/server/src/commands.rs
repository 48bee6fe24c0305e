//! Account provisioning subcommands.

use std::sync::Arc;

use anyhow::Result;
use authbridge_auth::AccountManager;
use authbridge_core::account::{Account, NewAccount};
use authbridge_core::storage::AccountRepository;
use clap::Args;

/// Arguments shared by `create-account` and `create-admin`.
#[derive(Args, Debug, Clone)]
pub struct AccountArgs {
    /// Email address, also the login identifier
    #[arg(long)]
    pub email: String,

    /// Initial password
    #[arg(long, env = "AUTHBRIDGE_PASSWORD")]
    pub password: String,

    #[arg(long, default_value = "")]
    pub first_name: String,

    #[arg(long, default_value = "")]
    pub last_name: String,
}

impl From<AccountArgs> for NewAccount {
    fn from(args: AccountArgs) -> Self {
        NewAccount::new(args.email, args.password).with_names(args.first_name, args.last_name)
    }
}

/// Provisions an account, optionally with staff and superuser flags.
pub async fn create_account(
    repo: Arc<dyn AccountRepository>,
    args: AccountArgs,
    admin: bool,
) -> Result<Account> {
    let manager = AccountManager::new(repo);
    let input = NewAccount::from(args);

    let account = if admin {
        manager.create_admin_account(input).await?
    } else {
        manager.create_account(input).await?
    };

    tracing::info!(account_id = %account.id, admin, "Provisioned account from CLI");
    Ok(account)
}
