/*
[INPUT]:  Unauthenticated sandbox client
[OUTPUT]: Freshly created sandbox user (username, password, account id)
[POS]:    HTTP layer - sandbox bootstrap used by ClientBuilder::build_sandbox
[UPDATE]: When the sandbox account endpoint changes
*/

use reqwest::Method;
use tracing::info;

use crate::http::{Client, Result};
use crate::types::SandboxAccount;

/// Endpoint creating a sandbox user
pub const SANDBOX_ACCOUNTS_PATH: &str = "/v1/accounts";

impl Client {
    /// Create a new sandbox user.
    ///
    /// POST /v1/accounts (empty body)
    pub(crate) async fn create_sandbox_account(&self) -> Result<SandboxAccount> {
        let account: SandboxAccount = self
            .request_and_decode::<_, &str, &str>(Method::POST, SANDBOX_ACCOUNTS_PATH, &[])
            .await?;

        info!(
            username = %account.username,
            account_id = account.account_id,
            "created sandbox account"
        );
        Ok(account)
    }
}
