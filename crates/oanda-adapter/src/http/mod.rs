/*
[INPUT]:  HTTP client configuration, environment and credentials
[OUTPUT]: Decorated requests, typed API results, polling helpers
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding request concerns or changing client behavior
*/

pub mod client;
pub mod decode;
pub mod error;
pub mod modifier;
pub mod poll;
pub mod request;
pub mod sandbox;
pub mod transport;

pub use error::{OandaError, Result};
pub use request::ApiRequest;

pub use client::{Client, ClientBuilder, ClientConfig};
pub use decode::{decode_response, encode_form};
pub use modifier::{ContentType, RequestModifier, TokenAuthenticator, UsernameAuthenticator};
pub use poll::{PollRequest, PollResponse};
pub use transport::{HttpTransport, Transport};
