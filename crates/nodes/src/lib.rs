//! Newsdesk orchestration: the writer/editor pipeline and the session controller.
//!
//! This crate provides [`EditorialPipeline`], the two-stage writer → editor
//! implementation of [`newsroom::GenerationGateway`], and [`Newsdesk`], which
//! hosts sessions, applies events to them, and executes the effects the state
//! machine requests.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Nodes sequence calls between business logic in the
//! [`newsroom`] crate and infrastructure traits (LLM provider, source fetcher,
//! click log). They contain no domain rules of their own.

pub mod desk;
pub mod editorial;
pub mod prompts;

pub use desk::{Newsdesk, SESSION_IDLE_TTL};
pub use editorial::EditorialPipeline;
