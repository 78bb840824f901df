/*
[INPUT]:  Method, URL, optional form data, receiver type embedding ApiError
[OUTPUT]: Decoded response or typed error (transport / decode / API)
[POS]:    HTTP layer - the single decode-and-check path used by endpoints
[UPDATE]: When changing response decoding or error detection
*/

use reqwest::Method;
use serde::Deserialize;
use serde::de::Error as _;
use serde_json::Value;
use tracing::warn;

use crate::http::{Client, OandaError, Result};
use crate::types::ApiResponse;

impl Client {
    /// GET `url` and decode the body into `T`
    pub async fn get_and_decode<T: ApiResponse>(&self, url: &str) -> Result<T> {
        self.request_and_decode::<T, &str, &str>(Method::GET, url, &[])
            .await
    }

    /// Send `form` URL-encoded (no body when empty) and decode the body
    /// into `T`.
    ///
    /// OANDA reports business errors as a code inside a normal response
    /// body, so the decoded envelope is always checked.
    pub async fn request_and_decode<T, K, V>(
        &self,
        method: Method,
        url: &str,
        form: &[(K, V)],
    ) -> Result<T>
    where
        T: ApiResponse,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = self.build_request(method, url, encode_form(form))?;
        let response = self.execute(&request).await?;
        decode_response(response).await
    }
}

/// URL-encode form pairs, `None` if there are none
pub fn encode_form<K: AsRef<str>, V: AsRef<str>>(form: &[(K, V)]) -> Option<String> {
    if form.is_empty() {
        return None;
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(form)
        .finish();
    Some(encoded)
}

/// Decode a response body and check its embedded return code.
///
/// A body that is not valid JSON for `T` is a decode error when the status
/// was a success, and a status error otherwise.
pub async fn decode_response<T: ApiResponse>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let status_error = || OandaError::Status {
        status,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    };

    // Envelopes are objects; a bare array must not fill the fields positionally.
    let value = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) if value.is_object() => value,
        Ok(_) | Err(_) if !status.is_success() => return Err(status_error()),
        Ok(_) => return Err(serde_json::Error::custom("expected a JSON object").into()),
        Err(err) => return Err(err.into()),
    };

    let decoded = match T::deserialize(value) {
        Ok(decoded) => decoded,
        Err(_) if !status.is_success() => return Err(status_error()),
        Err(err) => return Err(err.into()),
    };

    if let Err(err) = decoded.check_return_code() {
        warn!(
            status = %status,
            code = err.code,
            message = %err.message,
            "server returned error code"
        );
        return Err(err.into());
    }

    if !status.is_success() {
        return Err(status_error());
    }

    Ok(decoded)
}
