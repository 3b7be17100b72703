//! Port for the article generation service.
//!
//! [`GenerationGateway`] is the only way the desk obtains article text. It
//! receives the assembled [`Instruction`] and returns markdown, making exactly
//! one attempt per call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{ArticleText, Instruction, LlmError, RetryPolicy};

/// Stage of the writer/editor pipeline that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Drafts the article from the instruction and sources.
    Writer,
    /// Refines the writer's draft into the final article.
    Editor,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Writer => f.write_str("writer"),
            Stage::Editor => f.write_str("editor"),
        }
    }
}

/// Why a generation call produced no article.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// A model call failed.
    #[error("the {stage} could not complete: {source}")]
    Llm {
        /// Stage whose call failed.
        stage: Stage,
        /// Provider error.
        #[source]
        source: LlmError,
    },

    /// The pipeline finished but the final text was blank.
    #[error("the {stage} returned an empty article")]
    EmptyArticle {
        /// Stage whose output was blank.
        stage: Stage,
    },

    /// The call was cancelled before it finished (e.g. process shutdown).
    #[error("generation was cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Classifies the failure for logging.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            GenerationError::Llm { source, .. } => source.retry_policy(),
            GenerationError::EmptyArticle { .. } | GenerationError::Cancelled => {
                RetryPolicy::NonRetryable
            }
        }
    }
}

/// The external collaborator that turns an instruction into article markdown.
///
/// A call may take arbitrarily long. Implementations should return
/// [`GenerationError::Cancelled`] promptly once `cancel` fires.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Produces one article for `instruction`. Single attempt, no streaming.
    async fn generate(
        &self,
        instruction: &Instruction,
        cancel: CancellationToken,
    ) -> Result<ArticleText, GenerationError>;
}
