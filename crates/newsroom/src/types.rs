//! Shared value types for the newsroom domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (e.g. word limits lie on a fixed grid,
//! article text is never blank) and participate in domain computations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Token usage
// ---------------------------------------------------------------------------

/// Number of tokens consumed in an LLM API call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenCount(u64);

impl TokenCount {
    /// Creates a [`TokenCount`] from a raw integer.
    pub fn new(count: u64) -> Self {
        Self(count)
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TokenCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add for TokenCount {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for TokenCount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

// ---------------------------------------------------------------------------

/// Prompt and completion token counts reported by the provider for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by the prompt (system + user messages).
    pub prompt: TokenCount,
    /// Tokens produced in the completion.
    pub completion: TokenCount,
}

impl TokenUsage {
    /// Total tokens billed for the call.
    pub fn total(self) -> TokenCount {
        self.prompt + self.completion
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt += rhs.prompt;
        self.completion += rhs.completion;
    }
}

// ---------------------------------------------------------------------------
// Article parameters
// ---------------------------------------------------------------------------

/// Requested article length in words.
///
/// Valid values lie in `[250, 1500]` on a step of 50, matching the form slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WordLimit(u32);

impl WordLimit {
    /// Smallest accepted limit.
    pub const MIN: u32 = 250;
    /// Largest accepted limit.
    pub const MAX: u32 = 1500;
    /// Slider granularity.
    pub const STEP: u32 = 50;

    /// Creates a [`WordLimit`], returning `None` if `words` is outside
    /// `[MIN, MAX]` or not on the `STEP` grid.
    #[must_use]
    pub fn new(words: u32) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&words) && (words - Self::MIN) % Self::STEP == 0 {
            Some(Self(words))
        } else {
            None
        }
    }

    /// Returns the limit as a plain word count.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for WordLimit {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl std::fmt::Display for WordLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Number of accepted "Generate Article" submissions in the current login.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClickCount(u32);

impl ClickCount {
    /// A fresh counter, as set on login.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Creates a [`ClickCount`] from a raw integer.
    pub fn new(count: u32) -> Self {
        Self(count)
    }

    /// Returns the counter incremented by one.
    #[must_use]
    pub fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the underlying integer value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ClickCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------

/// Markdown article text returned by the generation service.
///
/// Never blank: a provider answer with no visible text is a generation
/// failure, not an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleText(String);

impl ArticleText {
    /// Wraps `text`, returning `None` if it is empty or whitespace only.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let t = text.into();
        if t.trim().is_empty() {
            None
        } else {
            Some(Self(t))
        }
    }

    /// Returns the markdown source.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArticleText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Human-readable form used inside prompts, e.g. `"2024-05-01 09:30 UTC"`.
    pub fn to_prompt_string(self) -> String {
        self.0.format("%Y-%m-%d %H:%M UTC").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn word_limit_accepts_only_the_slider_grid() {
        assert_eq!(WordLimit::new(250).map(WordLimit::as_u32), Some(250));
        assert_eq!(WordLimit::new(1500).map(WordLimit::as_u32), Some(1500));
        assert_eq!(WordLimit::new(500).map(WordLimit::as_u32), Some(500));
        assert!(WordLimit::new(200).is_none());
        assert!(WordLimit::new(1550).is_none());
        assert!(WordLimit::new(275).is_none());
        assert_eq!(WordLimit::default().as_u32(), WordLimit::MIN);
    }

    #[test]
    fn article_text_rejects_blank_output() {
        assert!(ArticleText::new("").is_none());
        assert!(ArticleText::new(" \n ").is_none());
        assert_eq!(ArticleText::new("# Title").unwrap().as_str(), "# Title");
    }

    #[test]
    fn click_count_increments_from_zero() {
        let c = ClickCount::zero().incremented().incremented();
        assert_eq!(c.as_u32(), 2);
    }

    #[test]
    fn token_usage_totals() {
        let mut usage = TokenUsage {
            prompt: TokenCount::new(10),
            completion: TokenCount::new(5),
        };
        usage += TokenUsage {
            prompt: TokenCount::new(1),
            completion: TokenCount::new(2),
        };
        assert_eq!(usage.total().as_u64(), 18);
    }

    #[test]
    fn timestamp_displays_as_rfc3339() {
        let ts = Timestamp::from_utc(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap());
        assert_eq!(ts.to_string(), "2024-05-01T09:30:00+00:00");
        assert_eq!(ts.to_prompt_string(), "2024-05-01 09:30 UTC");
    }
}
