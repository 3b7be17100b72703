//! HTTP reference fetcher.
//!
//! Downloads each reference link and reduces the page to its visible text:
//! scripts, styles, comments and tags are removed, common entities decoded, and
//! whitespace collapsed. At most [`MAX_SOURCE_BYTES`] of the body are
//! downloaded, and the extracted text is cut to [`MAX_SOURCE_CHARS`] so a
//! single long page cannot crowd the writer's context.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use newsroom::{FetchError, ReferenceLink, SourceDocument, SourceFetcher};
use regex::Regex;
use reqwest::{Client, Url};
use tracing::debug;

/// Character budget for one source's extracted text.
pub const MAX_SOURCE_CHARS: usize = 12_000;

/// Download budget for one reference page. The rest of the body is not read.
pub const MAX_SOURCE_BYTES: usize = 2 * 1024 * 1024;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);
const USER_AGENT: &str = concat!("newsdesk/", env!("CARGO_PKG_VERSION"));

static HIDDEN_BLOCKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<noscript\b.*?</noscript\s*>|<!--.*?-->")
        .expect("hidden block pattern is valid")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// [`SourceFetcher`] that reads links over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSourceFetcher {
    client: Client,
}

impl HttpSourceFetcher {
    /// Creates a fetcher with its own HTTP client.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, link: &ReferenceLink) -> Result<SourceDocument, FetchError> {
        let url = parse_http_url(link)?;
        let transport = |err: reqwest::Error| FetchError::Transport {
            link: link.to_string(),
            message: err.to_string(),
        };

        let mut response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                link: link.to_string(),
                status: status.as_u16(),
            });
        }

        let expected = response
            .content_length()
            .map_or(0, |len| len.min(MAX_SOURCE_BYTES as u64) as usize);
        let mut body = Vec::with_capacity(expected);
        while let Some(chunk) = response.chunk().await.map_err(transport)? {
            if !append_capped(&mut body, &chunk, MAX_SOURCE_BYTES) {
                debug!(%link, limit = MAX_SOURCE_BYTES, "reference body truncated");
                break;
            }
        }
        debug!(%link, bytes = body.len(), "reference downloaded");

        let text = extract_text(&String::from_utf8_lossy(&body));
        if text.is_empty() {
            return Err(FetchError::Empty {
                link: link.to_string(),
            });
        }

        Ok(SourceDocument {
            link: link.clone(),
            text: truncate_chars(&text, MAX_SOURCE_CHARS),
        })
    }
}

/// Appends as much of `chunk` as fits in `budget`. Returns `false` once the
/// budget is exhausted and the rest of the body should be skipped.
fn append_capped(buf: &mut Vec<u8>, chunk: &[u8], budget: usize) -> bool {
    let room = budget.saturating_sub(buf.len());
    buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    chunk.len() <= room
}

fn parse_http_url(link: &ReferenceLink) -> Result<Url, FetchError> {
    let unsupported = || FetchError::UnsupportedLink {
        link: link.to_string(),
    };
    let url = Url::parse(link.as_str().trim()).map_err(|_| unsupported())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(unsupported()),
    }
}

/// Reduces an HTML (or plain text) document to its visible text.
pub fn extract_text(document: &str) -> String {
    let without_hidden = HIDDEN_BLOCKS_RE.replace_all(document, " ");
    let without_tags = TAG_RE.replace_all(&without_hidden, " ");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
