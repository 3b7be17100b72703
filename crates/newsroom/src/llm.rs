//! Port for chat-style language model providers.
//!
//! The writer and editor stages speak to the model only through
//! [`LlmProvider`]. Infrastructure crates implement it for a concrete API; the
//! domain never sees HTTP details.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ModelName, RetryPolicy, TokenUsage};

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// Standing instructions for the model.
    System,
    /// Input from the caller.
    User,
    /// Earlier model output.
    Assistant,
}

/// One message in a chat completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who is speaking.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A single chat completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model to run.
    pub model: ModelName,
    /// Conversation so far, system message first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature; the newsroom stages use `0.0`.
    pub temperature: f32,
}

/// The provider's answer to a [`CompletionRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    /// Text of the first choice.
    pub text: String,
    /// Token usage reported for the call (zero if the provider omitted it).
    pub usage: TokenUsage,
}

/// Failures reported by an [`LlmProvider`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmError {
    /// The request never produced an HTTP response (connect error, timeout).
    #[error("request to the language model failed: {message}")]
    Transport {
        /// Transport error description.
        message: String,
        /// Whether the failure looked transient (connect/timeout).
        retryable: bool,
    },

    /// The provider answered with a non-success status.
    #[error("language model returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Provider error message, or the raw body when it was not JSON.
        message: String,
        /// Delay requested by a `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// The response body could not be decoded.
    #[error("could not decode the language model response: {message}")]
    Decode {
        /// Decoder error description.
        message: String,
    },

    /// The response decoded but carried no text.
    #[error("the language model returned no content")]
    EmptyResponse,
}

impl LlmError {
    /// Classifies the failure for logging.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            LlmError::Transport { retryable: true, .. } => RetryPolicy::Retryable { after: None },
            LlmError::Http {
                status,
                retry_after,
                ..
            } if *status == 429 || (500..600).contains(status) => RetryPolicy::Retryable {
                after: *retry_after,
            },
            _ => RetryPolicy::NonRetryable,
        }
    }
}

/// A chat completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Runs one completion. Implementations must not retry internally.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limits_and_server_errors_are_transient() {
        let limited = LlmError::Http {
            status: 429,
            message: "slow down".into(),
            retry_after: Some(Duration::from_secs(3)),
        };
        assert_eq!(
            limited.retry_policy(),
            RetryPolicy::Retryable {
                after: Some(Duration::from_secs(3))
            }
        );

        let unavailable = LlmError::Http {
            status: 503,
            message: String::new(),
            retry_after: None,
        };
        assert!(unavailable.retry_policy().is_retryable());
    }

    #[test]
    fn client_errors_are_permanent() {
        let unauthorized = LlmError::Http {
            status: 401,
            message: "bad key".into(),
            retry_after: None,
        };
        assert_eq!(unauthorized.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(LlmError::EmptyResponse.retry_policy(), RetryPolicy::NonRetryable);
        assert_eq!(
            LlmError::Transport {
                message: "dns".into(),
                retryable: false
            }
            .retry_policy(),
            RetryPolicy::NonRetryable
        );
    }
}
