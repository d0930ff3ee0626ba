//! Bridge error types.

/// Errors from bridge push/pull operations. All of these are transient from
/// the app's point of view: local state is never mutated on failure.
#[derive(Debug)]
pub enum BridgeError {
    /// No endpoint configured
    NotConfigured,
    /// Transport-level failure
    HttpError(String),
    /// Endpoint answered with a non-success status
    BadStatus(u16),
    /// Response body was not the expected tabular JSON
    BadResponse(String),
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::NotConfigured => {
                write!(f, "Bridge not configured. Add bridge.endpoint_url to config.")
            }
            BridgeError::HttpError(e) => write!(f, "Bridge request failed: {}", e),
            BridgeError::BadStatus(status) => {
                write!(f, "Bridge returned status {}", status)
            }
            BridgeError::BadResponse(e) => write!(f, "Unexpected bridge response: {}", e),
        }
    }
}

impl std::error::Error for BridgeError {}
