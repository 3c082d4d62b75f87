use std::fmt;
use std::time::Duration;

/// Everything that can go wrong between firing a request and holding a
/// usable reply. All variants end up as one non-fatal error toast.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Client misconfigured (unparseable base URL, base URL cannot hold a path).
    Config(String),
    /// Request never reached the server or the response never arrived.
    Network(String),
    /// Server answered with a non-2xx status.
    Http { status: u16, message: String },
    /// Server answered 2xx but the body carries an `error` field.
    Application(String),
    /// No response within the configured bound.
    Timeout(Duration),
    /// Body was not the JSON shape we expected.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            ApiError::Application(msg) => write!(f, "{msg}"),
            ApiError::Timeout(limit) => {
                write!(f, "request timed out after {}s", limit.as_secs())
            }
            ApiError::Parse(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
