/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public OANDA adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod http;
pub mod types;

// Re-export commonly used types from http
pub use http::{
    ApiRequest,
    Client,
    ClientBuilder,
    ClientConfig,
    ContentType,
    HttpTransport,
    OandaError,
    PollRequest,
    PollResponse,
    RequestModifier,
    Result,
    TokenAuthenticator,
    Transport,
    UsernameAuthenticator,
};

// Re-export all types
pub use types::*;
