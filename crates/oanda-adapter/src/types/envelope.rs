/*
[INPUT]:  JSON error envelope `{code, message, moreInfo}` present in every response
[OUTPUT]: ApiError value and the ApiResponse return-code check
[POS]:    Data layer - uniform business error detection
[UPDATE]: When the envelope shape changes
*/

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error details as returned by the OANDA servers.
///
/// Every response body carries these fields; a `code` of 0 (or an absent
/// code) means the call succeeded.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[error("ApiError{{Code: {code}, Message: {message}, MoreInfo: {more_info}}}")]
pub struct ApiError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "moreInfo")]
    pub more_info: String,
}

impl ApiError {
    pub fn is_error(&self) -> bool {
        self.code != 0
    }

    /// Turn a nonzero code into an error
    pub fn check(&self) -> Result<(), ApiError> {
        if self.is_error() {
            Err(self.clone())
        } else {
            Ok(())
        }
    }
}

/// A decoded response body that embeds the error envelope.
///
/// Implementors usually hold the envelope as a flattened field:
///
/// ```
/// use oanda_adapter::{ApiError, ApiResponse};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Instruments {
///     #[serde(flatten)]
///     error: ApiError,
///     #[serde(default)]
///     instruments: Vec<serde_json::Value>,
/// }
///
/// impl ApiResponse for Instruments {
///     fn api_error(&self) -> &ApiError {
///         &self.error
///     }
/// }
/// ```
pub trait ApiResponse: DeserializeOwned {
    fn api_error(&self) -> &ApiError;

    fn check_return_code(&self) -> Result<(), ApiError> {
        self.api_error().check()
    }
}

impl ApiResponse for ApiError {
    fn api_error(&self) -> &ApiError {
        self
    }
}
