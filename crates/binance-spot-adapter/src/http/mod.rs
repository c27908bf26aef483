/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod clock;
pub mod error;
pub mod public;
pub mod signature;
pub mod trade;
pub mod user;

pub use clock::ServerClock;
pub use error::{BinanceError, Result};
pub use signature::Credential;

pub use client::{BinanceClient, ClientConfig, QueryParams};
