use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The URL is malformed or is not an aggregator redirect link.
    #[error("not a google news link: {0}")]
    Classification(String),

    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    #[error("missing data attributes at {endpoint}")]
    MissingDataAttributes { endpoint: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unexpected response structure: {0}")]
    UnexpectedStructure(String),
}

impl DecodeError {
    /// Only transport failures on the primary parameter endpoint fall back to
    /// the RSS endpoint.
    pub fn allows_fallback(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn transport(endpoint: &str, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timeout".to_string()
        } else if let Some(status) = err.status() {
            format!("http error {status}")
        } else {
            err.to_string()
        };
        Self::Transport {
            endpoint: endpoint.to_string(),
            message,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_allows_fallback() {
        let transport = DecodeError::Transport {
            endpoint: "https://news.google.com/articles/X".to_string(),
            message: "connection refused".to_string(),
        };
        let missing = DecodeError::MissingDataAttributes {
            endpoint: "https://news.google.com/articles/X".to_string(),
        };

        assert!(transport.allows_fallback());
        assert!(!missing.allows_fallback());
        assert!(!DecodeError::Parse("eof".to_string()).allows_fallback());
    }

    #[test]
    fn test_messages_name_the_stage() {
        let err = DecodeError::MissingDataAttributes {
            endpoint: "https://news.google.com/rss/articles/X".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "missing data attributes at https://news.google.com/rss/articles/X"
        );
    }
}
