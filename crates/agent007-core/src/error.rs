//! Error types for the agent client and tool-chain export.

use thiserror::Error;

/// Why a request to the agent endpoint did not produce a tool chain.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The request never completed (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status.
    #[error("Agent request failed with HTTP status {0}")]
    Status(u16),

    /// The body was not JSON or did not have the expected shape.
    #[error("Malformed agent response: {0}")]
    Malformed(String),
}

impl AgentError {
    /// Human-readable text for the conversation log
    pub fn describe(&self) -> String {
        let text = self.to_string();
        if text.trim().is_empty() {
            "Unknown error occurred".to_string()
        } else {
            text
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AgentError::Malformed(err.to_string())
        } else {
            AgentError::Transport(err.to_string())
        }
    }
}

/// Errors from copying or downloading a tool chain.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No message selected")]
    NothingSelected,

    #[error("Selected message has no tool chain")]
    NoToolChain,

    #[error("Failed to write tool chain: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize tool chain: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transport_error_reads_as_unknown() {
        assert_eq!(AgentError::Transport(String::new()).describe(), "Unknown error occurred");
        assert_eq!(
            AgentError::Transport("connection refused".into()).describe(),
            "connection refused"
        );
    }

    #[test]
    fn status_error_mentions_code() {
        assert!(AgentError::Status(503).describe().contains("503"));
    }
}
