use thiserror::Error;

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request rejected by server: {0}")]
    Rejected(String),

    #[error("Message is empty")]
    EmptyMessage,

    #[error("No conversation is open")]
    NoActiveConversation,

    #[error("Authentication required")]
    AuthRequired,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ChatError {
    /// Transport, decoding and server-side rejections all count as network
    /// failures from the caller's point of view.
    pub fn is_network(&self) -> bool {
        matches!(self, ChatError::Network(_) | ChatError::Decode(_) | ChatError::Rejected(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ChatError::EmptyMessage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_network_failures() {
        assert!(ChatError::Rejected("db down".into()).is_network());
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(ChatError::from(bad_json).is_network());
        assert!(!ChatError::EmptyMessage.is_network());
        assert!(!ChatError::AuthRequired.is_network());
    }

    #[test]
    fn empty_message_is_validation() {
        assert!(ChatError::EmptyMessage.is_validation());
        assert!(!ChatError::NoActiveConversation.is_validation());
    }
}
