use std::fmt;

/// Client-side operation errors shared by the Gallery and Koken clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No auth token (Gallery) or session cookie (Koken) could be obtained
    AuthenticationFailed {
        service: &'static str,
        message: String,
    },
    /// A response body could not be decoded
    DecodeFailed {
        message: String,
    },
    /// A record field expected in a decoded response is absent
    MissingField {
        key: String,
    },
    /// A local file or remote resource does not exist
    NotFound {
        what: String,
    },
    /// Network, HTTP status or timeout failure
    NetworkError {
        message: String,
    },
    /// A URL could not be built from configuration or a response value
    InvalidUrl {
        url: String,
        message: String,
    },
    /// An operation was called before the state it depends on exists
    PreconditionFailed {
        message: String,
    },
    /// Local filesystem error other than a missing file
    Io {
        message: String,
    },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::AuthenticationFailed { service, message } => {
                write!(f, "{} authentication failed: {}", service, message)
            }
            ClientError::DecodeFailed { message } => {
                write!(f, "Failed to decode response: {}", message)
            }
            ClientError::MissingField { key } => {
                write!(f, "Missing field: {}", key)
            }
            ClientError::NotFound { what } => {
                write!(f, "Not found: {}", what)
            }
            ClientError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            ClientError::InvalidUrl { url, message } => {
                write!(f, "Invalid URL '{}': {}", url, message)
            }
            ClientError::PreconditionFailed { message } => {
                write!(f, "Precondition failed: {}", message)
            }
            ClientError::Io { message } => {
                write!(f, "I/O error: {}", message)
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("request timed out: {}", err)
        } else {
            err.to_string()
        };
        ClientError::NetworkError { message }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::DecodeFailed {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl {
            url: String::new(),
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ClientError::NotFound {
                what: err.to_string(),
            },
            _ => ClientError::Io {
                message: err.to_string(),
            },
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
