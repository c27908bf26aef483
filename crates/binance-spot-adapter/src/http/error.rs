/*
[INPUT]:  Error sources (transport, exchange rejections, parsing, auth)
[OUTPUT]: Structured error types with exchange code access
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use thiserror::Error;

/// Main error type for the adapter.
///
/// Every expected failure mode of a public operation is reported through
/// this enum; only programming errors may panic.
#[derive(Error, Debug)]
pub enum BinanceError {
    /// A signed or account operation was attempted without credentials
    #[error("API credentials not configured")]
    NotAuthenticated,

    /// Required parameters missing or mutually exclusive parameters misused
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The exchange rejected the request with a structured error body
    #[error("Exchange rejected request (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// Response body could not be parsed into the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Connection-level failure (DNS, timeout, reset), or an error response
    /// whose body did not parse as an exchange error
    #[error("Transport failure: {0}")]
    Transport(String),

    /// Streaming transport could not be established
    #[error("Failed to open socket: {0}")]
    SocketOpenFailed(String),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl BinanceError {
    /// Numeric error code: the exchange's code for rejections, `0` for
    /// transport-class failures where the server was never reached or did
    /// not answer in its error format.
    pub fn code(&self) -> i64 {
        match self {
            BinanceError::Rejected { code, .. } => *code,
            _ => 0,
        }
    }

    /// True for failures where the server was not reached or gave no
    /// structured rejection; useful for distinguishing "server said no"
    /// from "could not ask".
    pub fn is_transport(&self) -> bool {
        matches!(self, BinanceError::Transport(_) | BinanceError::SocketOpenFailed(_))
    }
}

impl From<reqwest::Error> for BinanceError {
    fn from(err: reqwest::Error) -> Self {
        BinanceError::Transport(err.to_string())
    }
}

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, BinanceError>;
