//! Top-level error and retry-policy types for the newsroom domain.
//!
//! [`NewsdeskError`] covers conditions the session state machine reports back to
//! the user, plus start-up configuration failures. Component-level errors
//! (validation, generation, LLM provider, click log, reference fetching) are
//! defined in their respective modules. Validation and generation failures are
//! wrapped here; click-log and fetch failures are only ever logged.
//!
//! [`RetryPolicy`] is a cross-cutting concern: infrastructure errors describe
//! whether they are transient so that logs carry that classification. The core
//! itself never retries; every external call is single-shot.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::article::ValidationError;
use crate::generation::GenerationError;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is transient and, if so, after what delay a
/// caller could try again.
///
/// - `Retryable` errors: transport timeouts, rate-limit and 5xx responses.
/// - `NonRetryable` errors: authentication failures, malformed requests,
///   undecodable responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt, derived from a
        /// `Retry-After` header when the provider sends one.
        after: Option<Duration>,
    },
    /// Retrying will not help.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, RetryPolicy::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Desk-level errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the newsdesk to a user or to the process entry point.
///
/// The `Display` text of the user-facing variants is shown verbatim in the
/// page's notice area, so keep it short and addressed to the reader.
#[derive(Debug, Error)]
pub enum NewsdeskError {
    /// The submitted username/password pair did not match the configured one.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// An action that requires a login was attempted while logged out.
    #[error("Please log in first.")]
    NotLoggedIn,

    /// A second article was requested while one is still being generated.
    #[error("An article is already being generated. Please wait for it to finish.")]
    GenerationInProgress,

    /// The article form failed validation; nothing was submitted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The generation service failed to produce an article.
    #[error("Article generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Process configuration is invalid; the server never starts with it.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_facing_messages_are_stable() {
        assert_eq!(
            NewsdeskError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
        assert_eq!(
            NewsdeskError::from(ValidationError::EmptyTopic).to_string(),
            ValidationError::EmptyTopic.to_string()
        );
    }

    #[test]
    fn retry_policy_classification() {
        assert!(RetryPolicy::Retryable { after: None }.is_retryable());
        assert!(!RetryPolicy::NonRetryable.is_retryable());
    }
}
