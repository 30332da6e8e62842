//! Error types for talking to the Scalynx service.

/// Message shown when the request never got a response.
pub const CONNECT_FAILURE_MESSAGE: &str = "Could not connect to the server.";

/// Failure of a single request to the remote service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable response: connection refused, timeout, DNS, body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered and reported an error
    #[error("{0}")]
    Application(String),
}

impl ApiError {
    /// Text for the shared error display.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Transport(_) => CONNECT_FAILURE_MESSAGE.to_string(),
            ApiError::Application(message) => message.clone(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_message_is_verbatim() {
        let err = ApiError::Application("Missing fields".to_string());
        assert_eq!(err.user_message(), "Missing fields");
        assert_eq!(err.to_string(), "Missing fields");
        assert!(!err.is_transport());
    }
}
