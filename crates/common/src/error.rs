//! Error types for Reflection Chat components

/// Common errors across Reflection Chat components
#[derive(Debug, Clone)]
pub enum ChatError {
    /// Missing or unusable startup configuration. Fatal: no session is
    /// offered until it is fixed.
    Config(String),
    /// One failed completion-API call (network, auth, provider rejection).
    /// Transient: the log keeps everything appended before the failure and
    /// the same action may be retried.
    Api(String),
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ChatError::Api(msg) => write!(f, "Completion API error: {}", msg),
        }
    }
}

impl std::error::Error for ChatError {}
