//! Newsdesk LLM provider and reference-fetching infrastructure adapters.
//!
//! Implements the [`newsroom::LlmProvider`] trait for OpenAI's Chat Completions
//! API and the [`newsroom::SourceFetcher`] trait over plain HTTP. Additional
//! providers are added as new `impl` blocks in this crate without any changes
//! to the `newsroom` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response parsing
//! and `Retry-After` header handling live here. The [`newsroom`] crate sees only
//! [`newsroom::LlmProvider`] and [`newsroom::SourceFetcher`]. Nothing in this
//! crate retries.

pub mod openai;
pub mod sources;

pub use openai::{OpenAiConfigError, OpenAiProvider, DEFAULT_OPENAI_MODEL};
pub use sources::{extract_text, HttpSourceFetcher, MAX_SOURCE_BYTES, MAX_SOURCE_CHARS};
