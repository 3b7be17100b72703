//! Core domain for the newsdesk.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and error type used throughout the workspace, together with the
//! session state machine and the port traits infrastructure crates implement.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`SessionId`, `GenerationTicket`, etc.) |
//! | [`types`] | Value types (`WordLimit`, `ClickCount`, `ArticleText`, etc.) |
//! | [`errors`] | Desk-level error and retry-policy types |
//! | [`credentials`] | The login gate |
//! | [`article`] | Form validation and instruction assembly |
//! | [`session`] | Session state machine and render descriptor |
//! | [`generation`] | `GenerationGateway` port |
//! | [`llm`] | `LlmProvider` port |
//! | [`sources`] | `SourceFetcher` port |
//! | [`click_log`] | `ClickLog` port |

pub mod article;
pub mod click_log;
pub mod credentials;
pub mod errors;
pub mod generation;
pub mod identifiers;
pub mod llm;
pub mod session;
pub mod sources;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use article::{
    ArticleForm, ArticleRequest, Instruction, ValidationError, MAX_LINKS, NO_LINKS_PLACEHOLDER,
};
pub use click_log::{ClickLog, ClickLogEntry, ClickLogError};
pub use credentials::CredentialChecker;
pub use errors::{NewsdeskError, RetryPolicy};
pub use generation::{GenerationError, GenerationGateway, Stage};
pub use identifiers::{GenerationTicket, ModelName, ReferenceLink, SessionId};
pub use llm::{ChatMessage, ChatRole, Completion, CompletionRequest, LlmError, LlmProvider};
pub use session::{
    Effect, Notice, NoticeLevel, ResultPane, Session, SessionEvent, SessionPhase, Transition,
    View, LOGIN_SUCCESS_MESSAGE,
};
pub use sources::{FetchError, SourceDocument, SourceFetcher};
pub use types::{ArticleText, ClickCount, Timestamp, TokenCount, TokenUsage, WordLimit};
