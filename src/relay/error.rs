use thiserror::Error;

/// Failures talking to a bundle relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("relay returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// JSON-RPC error object in the response.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("failed to sign relay request: {0}")]
    Auth(String),
}

pub type RelayResult<T> = Result<T, RelayError>;
