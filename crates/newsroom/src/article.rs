//! Article form validation and instruction assembly.
//!
//! [`ArticleForm`] is the raw form state exactly as the user left it.
//! [`ArticleForm::build`] validates it into an immutable [`ArticleRequest`],
//! which renders the single [`Instruction`] string sent to the generation
//! service.
//!
//! The instruction layout is a compatibility contract with the writer/editor
//! prompts and must not change:
//!
//! ```text
//! Topic: <topic>
//! Reference Links:
//! <link 1>
//! <link 2>
//! Word Limit:<n>
//! ```
//!
//! When no links are supplied the link lines are replaced by
//! [`NO_LINKS_PLACEHOLDER`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ReferenceLink, WordLimit};

/// Upper bound on the number of reference link slots.
pub const MAX_LINKS: usize = 5;

/// Text used in place of the link list when the user supplies none.
pub const NO_LINKS_PLACEHOLDER: &str = "No reference links provided.";

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Reasons an [`ArticleForm`] cannot be turned into an [`ArticleRequest`].
///
/// All variants are recovered locally: the message is shown inline and no
/// request is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// The topic is empty or whitespace only.
    #[error("Please provide a topic to write an article on.")]
    EmptyTopic,

    /// Reference links were requested but at least one slot is blank.
    #[error("Please fill in all {requested} reference link fields.")]
    IncompleteLinks {
        /// Number of link slots the user asked for.
        requested: usize,
    },

    /// Reference links were requested with a slot count outside `1..=5`.
    #[error("Between 1 and 5 reference links can be provided, not {requested}.")]
    LinkCount {
        /// Number of link slots the user asked for.
        requested: usize,
    },

    /// The word limit is outside `[250, 1500]` or off the 50-word grid.
    #[error("The word limit must be between 250 and 1500 in steps of 50, not {words}.")]
    WordLimit {
        /// The rejected value.
        words: u32,
    },
}

// ---------------------------------------------------------------------------
// Form state
// ---------------------------------------------------------------------------

/// The main form's field values as last submitted.
///
/// `links` holds exactly the requested slots (`num_links` of them) in order;
/// it is ignored when `wants_links` is `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleForm {
    /// Free-text topic of the article.
    pub topic: String,
    /// Requested length in words.
    pub word_limit: u32,
    /// Whether the user chose to provide reference links.
    pub wants_links: bool,
    /// One entry per requested link slot.
    pub links: Vec<String>,
}

impl Default for ArticleForm {
    fn default() -> Self {
        Self {
            topic: String::new(),
            word_limit: WordLimit::default().as_u32(),
            wants_links: false,
            links: Vec::new(),
        }
    }
}

impl ArticleForm {
    /// Validates the form and freezes it into an [`ArticleRequest`].
    ///
    /// Checks run in form order: topic, then links, then word limit, and the
    /// first failure is returned.
    pub fn build(&self) -> Result<ArticleRequest, ValidationError> {
        if self.topic.trim().is_empty() {
            return Err(ValidationError::EmptyTopic);
        }

        let links = if self.wants_links {
            let requested = self.links.len();
            if requested == 0 || requested > MAX_LINKS {
                return Err(ValidationError::LinkCount { requested });
            }
            self.links
                .iter()
                .map(|raw| ReferenceLink::new(raw.as_str()))
                .collect::<Option<Vec<_>>>()
                .ok_or(ValidationError::IncompleteLinks { requested })?
        } else {
            Vec::new()
        };

        let word_limit = WordLimit::new(self.word_limit).ok_or(ValidationError::WordLimit {
            words: self.word_limit,
        })?;

        Ok(ArticleRequest {
            topic: self.topic.clone(),
            links,
            word_limit,
        })
    }
}

// ---------------------------------------------------------------------------
// Validated request
// ---------------------------------------------------------------------------

/// A validated article request. Built fresh per submit and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRequest {
    topic: String,
    links: Vec<ReferenceLink>,
    word_limit: WordLimit,
}

impl ArticleRequest {
    /// The topic exactly as entered.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Reference links in the order they were entered.
    pub fn links(&self) -> &[ReferenceLink] {
        &self.links
    }

    /// Requested article length.
    pub fn word_limit(&self) -> WordLimit {
        self.word_limit
    }

    /// Renders the instruction string for the generation service.
    pub fn instruction(&self) -> Instruction {
        let links_text = if self.links.is_empty() {
            NO_LINKS_PLACEHOLDER.to_string()
        } else {
            self.links
                .iter()
                .map(ReferenceLink::as_str)
                .collect::<Vec<_>>()
                .join("\n")
        };

        Instruction {
            text: format!(
                "Topic: {}\nReference Links:\n{}\nWord Limit:{}",
                self.topic, links_text, self.word_limit
            ),
            references: self.links.clone(),
        }
    }
}

/// The formatted text block sent to the generation service.
///
/// Carries the reference links alongside the text so that a gateway which
/// reads sources does not have to parse them back out of the string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    text: String,
    references: Vec<ReferenceLink>,
}

impl Instruction {
    /// The instruction string.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Reference links embedded in the instruction.
    pub fn references(&self) -> &[ReferenceLink] {
        &self.references
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(topic: &str) -> ArticleForm {
        ArticleForm {
            topic: topic.to_string(),
            ..ArticleForm::default()
        }
    }

    #[test]
    fn blank_topics_are_rejected() {
        for topic in ["", " ", "\t", "\n  \r\n"] {
            assert_eq!(form(topic).build(), Err(ValidationError::EmptyTopic), "{topic:?}");
        }
    }

    #[test]
    fn every_requested_link_slot_must_be_filled() {
        for requested in 1..=MAX_LINKS {
            let filled: Vec<String> = (0..requested).map(|i| format!("http://{i}")).collect();
            let mut f = ArticleForm {
                wants_links: true,
                links: filled.clone(),
                ..form("Topic")
            };
            assert!(f.build().is_ok(), "all {requested} filled");

            for blank in 0..requested {
                f.links = filled.clone();
                f.links[blank] = if blank % 2 == 0 { String::new() } else { "  ".into() };
                assert_eq!(
                    f.build(),
                    Err(ValidationError::IncompleteLinks { requested }),
                    "slot {blank} of {requested} blank"
                );
            }
        }
    }

    #[test]
    fn link_slot_count_is_bounded() {
        let none = ArticleForm {
            wants_links: true,
            ..form("Topic")
        };
        assert_eq!(none.build(), Err(ValidationError::LinkCount { requested: 0 }));

        let six = ArticleForm {
            wants_links: true,
            links: vec!["http://x".into(); 6],
            ..form("Topic")
        };
        assert_eq!(six.build(), Err(ValidationError::LinkCount { requested: 6 }));
    }

    #[test]
    fn links_are_ignored_when_not_wanted() {
        let f = ArticleForm {
            wants_links: false,
            links: vec![String::new()],
            ..form("Topic")
        };
        let request = f.build().unwrap();
        assert!(request.links().is_empty());
    }

    #[test]
    fn topic_is_checked_before_links() {
        let f = ArticleForm {
            wants_links: true,
            links: vec![String::new()],
            ..form(" ")
        };
        assert_eq!(f.build(), Err(ValidationError::EmptyTopic));
    }

    #[test]
    fn off_grid_word_limit_is_rejected() {
        let f = ArticleForm {
            word_limit: 260,
            ..form("Topic")
        };
        assert_eq!(f.build(), Err(ValidationError::WordLimit { words: 260 }));
    }

    #[test]
    fn instruction_lines_are_in_contract_order() {
        let f = ArticleForm {
            topic: "Emergence of AI".into(),
            word_limit: 500,
            wants_links: true,
            links: vec!["http://a".into(), "http://b".into()],
        };
        let instruction = f.build().unwrap().instruction();
        let lines: Vec<&str> = instruction.as_str().lines().collect();
        assert_eq!(
            lines,
            vec![
                "Topic: Emergence of AI",
                "Reference Links:",
                "http://a",
                "http://b",
                "Word Limit:500",
            ]
        );
        assert_eq!(instruction.references().len(), 2);
    }

    #[test]
    fn instruction_uses_placeholder_without_links() {
        let f = ArticleForm {
            word_limit: 300,
            ..form("Test")
        };
        assert_eq!(
            f.build().unwrap().instruction().as_str(),
            "Topic: Test\nReference Links:\nNo reference links provided.\nWord Limit:300"
        );
    }

    #[test]
    fn instruction_is_deterministic() {
        let f = ArticleForm {
            wants_links: true,
            links: vec!["http://a".into()],
            ..form("Same")
        };
        assert_eq!(f.build().unwrap().instruction(), f.build().unwrap().instruction());
    }
}
