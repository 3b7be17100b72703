//! Two-stage writer → editor generation pipeline.
//!
//! [`EditorialPipeline`] implements [`GenerationGateway`] on top of an
//! [`LlmProvider`] and a [`SourceFetcher`]:
//!
//! 1. every reference link in the instruction is read (failures are noted, not
//!    fatal);
//! 2. the writer drafts the article;
//! 3. the editor refines the draft into the final markdown.
//!
//! Each model call is made once. Nothing here retries.

use std::sync::Arc;

use async_trait::async_trait;
use newsroom::{
    ArticleText, ChatMessage, CompletionRequest, GenerationError, GenerationGateway, Instruction, LlmProvider,
    ModelName, ReferenceLink, SourceFetcher, Stage, Timestamp, TokenUsage,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use crate::prompts::{editor_messages, writer_messages, SourceMaterial};

/// Sampling temperature used by both stages.
const TEMPERATURE: f32 = 0.0;

/// Writer/editor pipeline backed by a chat completion provider.
pub struct EditorialPipeline {
    provider: Arc<dyn LlmProvider>,
    fetcher: Arc<dyn SourceFetcher>,
    model: ModelName,
}

impl EditorialPipeline {
    /// Creates a pipeline that runs both stages on `model`.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        fetcher: Arc<dyn SourceFetcher>,
        model: ModelName,
    ) -> Self {
        Self {
            provider,
            fetcher,
            model,
        }
    }

    async fn gather_sources(&self, links: &[ReferenceLink]) -> Vec<SourceMaterial> {
        let mut sources = Vec::with_capacity(links.len());
        for link in links {
            match self.fetcher.fetch(link).await {
                Ok(doc) => {
                    debug!(%link, chars = doc.text.chars().count(), "reference read");
                    sources.push(SourceMaterial::Read(doc));
                }
                Err(err) => {
                    warn!(%link, error = %err, "reference could not be read");
                    sources.push(SourceMaterial::Unavailable(err));
                }
            }
        }
        sources
    }

    async fn run_stage(
        &self,
        stage: Stage,
        messages: Vec<ChatMessage>,
    ) -> Result<(String, TokenUsage), GenerationError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: TEMPERATURE,
        };

        let completion = self.provider.complete(request).await.map_err(|source| {
            GenerationError::Llm {
                stage,
                source,
            }
        })?;

        info!(
            %stage,
            prompt_tokens = completion.usage.prompt.as_u64(),
            completion_tokens = completion.usage.completion.as_u64(),
            "stage complete"
        );

        if completion.text.trim().is_empty() {
            return Err(GenerationError::EmptyArticle { stage });
        }
        Ok((completion.text, completion.usage))
    }

    async fn run(&self, instruction: &Instruction) -> Result<ArticleText, GenerationError> {
        let sources = self.gather_sources(instruction.references()).await;

        let (draft, writer_usage) = self
            .run_stage(Stage::Writer, writer_messages(instruction, &sources))
            .await?;

        let (article, editor_usage) = self
            .run_stage(
                Stage::Editor,
                editor_messages(instruction, &draft, Timestamp::now()),
            )
            .await?;

        let mut total = writer_usage;
        total += editor_usage;
        info!(total_tokens = total.total().as_u64(), "article generated");

        ArticleText::new(article).ok_or(GenerationError::EmptyArticle {
            stage: Stage::Editor,
        })
    }
}

#[async_trait]
impl GenerationGateway for EditorialPipeline {
    async fn generate(
        &self,
        instruction: &Instruction,
        cancel: CancellationToken,
    ) -> Result<ArticleText, GenerationError> {
        let span = tracing::info_span!(
            "editorial_pipeline",
            model = %self.model,
            references = instruction.references().len()
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            result = self.run(instruction).instrument(span) => result,
        }
    }
}
