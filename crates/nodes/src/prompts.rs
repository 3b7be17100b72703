//! Writer and editor prompt text.
//!
//! Both stages run at temperature zero. The writer drafts from the instruction
//! and the extracted reference material; the editor receives the same
//! instruction plus the draft and returns the final markdown article.

use newsroom::{ChatMessage, FetchError, Instruction, SourceDocument, Timestamp};

const WRITER_DESCRIPTION: &str = "You are a senior writer with 20+ years of experience at the New York Times. \
Given a topic and a list of URLs, your goal is to write a high-quality NYT-worthy article on the topic \
using the information from the provided links.";

const WRITER_INSTRUCTIONS: &[&str] = &[
    "Write a high-quality NYT-worthy article on the given topic within the word limit. Do not exceed the given word limit.",
    "People involved and mentioned in the text, places, dates, numbers, amounts, quotes, etc. should be retained and must be mentioned in the final article.",
    "Write in proper headings/sections and subheadings/subsections.",
    "Ensure you provide a nuanced and balanced opinion, quoting facts where possible.",
    "Focus on clarity, coherence, and overall quality.",
    "Never make up facts or plagiarize. Always provide proper attribution.",
    "At the end of the article, create a sources list of each result you cited, with the article name, author, and link.",
];

/// Newsroom style rules the writer follows.
pub const ARTICLE_GUIDELINES: &[&str] = &[
    "Inverted Pyramid: the most fundamental, important information goes at the top, and less crucial information goes further down in the story.",
    "Lead: the start of a news story should present the most compelling information.",
    "Fact (not opinion) and attribution: state the actual facts, figures, dates and numbers and always provide proper attribution.",
    "Identification: use a person's full first name or both initials on first reference, and identify them in a way that is relevant to the article.",
    "Short paragraphs: keep paragraphs short for punchiness and appearance.",
    "Headlines: short and preferably snappy, drawn from information in the body rather than presenting new information.",
    "Conclusion: always end the article with a proper conclusion heading restating the premise.",
];

const EDITOR_DESCRIPTION: &str =
    "You are a senior NYT editor. Given a topic, your goal is to deliver a NYT-worthy article.";

const EDITOR_INSTRUCTIONS: &[&str] = &[
    "You receive the request (topic, URLs and word limit) together with the writer's draft.",
    "Edit, proofread, and refine the article to ensure it meets the high standards of the New York Times.",
    "The article should be extremely articulate and well-written.",
    "Focus on clarity, coherence, and overall quality.",
    "Ensure the article is engaging and informative.",
    "Keep every fact, figure, quote and attribution from the draft; do not introduce new claims.",
    "Respect the word limit in the request.",
    "Keep the sources list at the end of the draft unchanged.",
];

const NO_SOURCES_NOTE: &str = "No reference material was provided. Rely only on well-established, \
verifiable facts and do not invent quotes or figures.";

/// What the writer learns about one reference link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMaterial {
    /// The link was read.
    Read(SourceDocument),
    /// The link could not be read.
    Unavailable(FetchError),
}

fn numbered(lines: &[&str]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}. {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Messages for the writer stage.
pub fn writer_messages(instruction: &Instruction, sources: &[SourceMaterial]) -> Vec<ChatMessage> {
    let system = format!(
        "{WRITER_DESCRIPTION}\n\n## Instructions\n{}\n\n## Article guidelines\n{}",
        numbered(WRITER_INSTRUCTIONS),
        numbered(ARTICLE_GUIDELINES),
    );

    let material = if sources.is_empty() {
        NO_SOURCES_NOTE.to_string()
    } else {
        sources
            .iter()
            .enumerate()
            .map(|(i, source)| match source {
                SourceMaterial::Read(doc) => {
                    format!("### Source {}: {}\n{}", i + 1, doc.link, doc.text)
                }
                SourceMaterial::Unavailable(err) => {
                    format!("### Source {}\nThis source could not be retrieved ({err}). Do not cite it.", i + 1)
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("{instruction}\n\n## Reference material\n{material}")),
    ]
}

/// Messages for the editor stage.
pub fn editor_messages(instruction: &Instruction, draft: &str, now: Timestamp) -> Vec<ChatMessage> {
    let system = format!(
        "{EDITOR_DESCRIPTION}\n\n## Instructions\n{}\n\nThe current date and time is {}.\n\
         Use markdown to format your answer and return only the final article.",
        numbered(EDITOR_INSTRUCTIONS),
        now.to_prompt_string(),
    );

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("{instruction}\n\n## Draft from the writer\n{draft}")),
    ]
}
