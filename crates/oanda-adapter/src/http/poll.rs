/*
[INPUT]:  Prepared GET request and the client that built it
[OUTPUT]: Repeated responses, 304 short-circuit via ETag / If-None-Match
[POS]:    HTTP layer - long-polling helper for rate and price endpoints
[UPDATE]: When changing conditional request handling
*/

use reqwest::StatusCode;
use reqwest::header::{ETAG, HeaderValue, IF_NONE_MATCH};
use tracing::debug;

use crate::http::decode::decode_response;
use crate::http::{ApiRequest, Client, OandaError, Result};
use crate::types::ApiResponse;

/// Outcome of a single poll
#[derive(Debug)]
pub enum PollResponse {
    /// Fresh payload
    Modified(reqwest::Response),
    /// Server answered 304; nothing to decode
    NotModified,
}

impl PollResponse {
    pub fn is_modified(&self) -> bool {
        matches!(self, PollResponse::Modified(_))
    }
}

/// An HTTP request that is executed repeatedly.
///
/// The ETag of the last successful response is sent back as
/// `If-None-Match`, so unchanged resources come back as 304. `poll` takes
/// `&mut self`; one poll loop owns each instance.
#[derive(Debug)]
pub struct PollRequest {
    client: Client,
    request: ApiRequest,
    etag: Option<HeaderValue>,
}

impl PollRequest {
    pub fn new(client: Client, request: ApiRequest) -> Self {
        Self {
            client,
            request,
            etag: None,
        }
    }

    /// ETag captured from the most recent response
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_ref().and_then(|etag| etag.to_str().ok())
    }

    /// The request sent on the next poll.
    ///
    /// Pass a clone to [`Client::cancel`] to abort a poll in flight.
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Repeat the request.
    ///
    /// Errors leave the stored ETag untouched, so the next poll still sends
    /// the last known precondition.
    pub async fn poll(&mut self) -> Result<PollResponse> {
        let response = match self.client.execute(&self.request).await {
            Ok(response) => response,
            Err(OandaError::Cancelled) => {
                self.request.reset_cancellation();
                return Err(OandaError::Cancelled);
            }
            Err(err) => return Err(err),
        };

        if let Some(etag) = response.headers().get(ETAG).filter(|etag| !etag.is_empty()) {
            debug!(etag = ?etag, path = self.request.path(), "storing etag for next poll");
            self.request.set_header(IF_NONE_MATCH, etag.clone());
            self.etag = Some(etag.clone());
        }

        if response.status() == StatusCode::NOT_MODIFIED {
            return Ok(PollResponse::NotModified);
        }
        Ok(PollResponse::Modified(response))
    }

    /// Poll and decode; `None` when the resource is unchanged
    pub async fn poll_json<T: ApiResponse>(&mut self) -> Result<Option<T>> {
        match self.poll().await? {
            PollResponse::NotModified => Ok(None),
            PollResponse::Modified(response) => decode_response(response).await.map(Some),
        }
    }
}
