use thiserror::Error;

/// Response was valid JSON but did not satisfy the expected model shape.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("weather provider unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("weather provider timed out")]
    Timeout,

    #[error("weather provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("cannot parse weather provider response: {0}")]
    Parse(#[from] ParseError),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum GeocodingError {
    #[error("geocoding provider unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("geocoding provider timed out")]
    Timeout,

    #[error("geocoding provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("cannot parse geocoding response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("geocoding provider rejected the request ({status}): {message}")]
    Rejected { status: String, message: String },

    #[error("geocoding provider returned no results")]
    NoResults,
}

impl From<reqwest::Error> for GeocodingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeocodingError::Timeout
        } else {
            GeocodingError::Transport(err)
        }
    }
}

/// Outbound message could not be delivered to the messaging platform.
#[derive(Error, Debug)]
#[error("cannot deliver message: {0}")]
pub struct TransportError(pub String);

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
