//! Port for reading reference links.
//!
//! The writer is given the visible text of every reference link. A link that
//! cannot be read is reported as [`FetchError`] and the writer is told so; it
//! never fails the whole request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ReferenceLink;

/// Extracted text of one reference link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Link the text was read from.
    pub link: ReferenceLink,
    /// Visible text, already trimmed to the fetcher's size budget.
    pub text: String,
}

/// Why a reference link could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The link is not an absolute http(s) URL.
    #[error("'{link}' is not an http(s) URL")]
    UnsupportedLink {
        /// Offending link.
        link: String,
    },

    /// The request failed before a response arrived.
    #[error("could not reach '{link}': {message}")]
    Transport {
        /// Link being fetched.
        link: String,
        /// Transport error description.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("'{link}' answered HTTP {status}")]
    Status {
        /// Link being fetched.
        link: String,
        /// HTTP status code.
        status: u16,
    },

    /// The page had no readable text.
    #[error("'{link}' contained no readable text")]
    Empty {
        /// Link being fetched.
        link: String,
    },
}

/// Reads the text behind a reference link.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetches and extracts `link`. Single attempt.
    async fn fetch(&self, link: &ReferenceLink) -> Result<SourceDocument, FetchError>;
}
