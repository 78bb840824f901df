/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::envelope::{ApiError, ApiResponse};

/// Account created by `POST /v1/accounts` in the sandbox environment
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SandboxAccount {
    #[serde(flatten)]
    pub error: ApiError,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "accountId")]
    pub account_id: u64,
}

impl ApiResponse for SandboxAccount {
    fn api_error(&self) -> &ApiError {
        &self.error
    }
}

impl std::fmt::Debug for SandboxAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxAccount")
            .field("error", &self.error)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}
