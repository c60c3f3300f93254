use std::fmt;

/// Failure of a single request issued through a [`Transport`](super::client::Transport).
///
/// `Network` and `Server` are kept apart so callers can tell a connection
/// problem from a rejected request.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// No response was received (DNS, refused connection, timeout, broken body stream)
    Network(String),

    /// Non-2xx response. `body` is the raw response text, never parsed here.
    Server { status: u16, body: String },

    /// 2xx response whose body is not the JSON the caller expected
    Malformed { body: String, reason: String },

    /// Endpoint could not be resolved against the base URL
    InvalidEndpoint { endpoint: String, reason: String },

    /// Request body could not be assembled (bad MIME type on a file part)
    InvalidBody(String),
}

impl TransportError {
    pub fn is_network(&self) -> bool {
        matches!(self, TransportError::Network(_))
    }

    pub fn is_server(&self) -> bool {
        matches!(self, TransportError::Server { .. })
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => {
                write!(f, "Network error: {}", msg)
            }
            TransportError::Server { status, body } => {
                write!(f, "Server responded {}: {}", status, body)
            }
            TransportError::Malformed { reason, .. } => {
                write!(f, "Malformed response: {}", reason)
            }
            TransportError::InvalidEndpoint { endpoint, reason } => {
                write!(f, "Invalid endpoint '{}': {}", endpoint, reason)
            }
            TransportError::InvalidBody(msg) => {
                write!(f, "Could not build request body: {}", msg)
            }
        }
    }
}

impl std::error::Error for TransportError {}
