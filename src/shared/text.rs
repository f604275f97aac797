//! Plain-text helpers for rich-text content (markdown or HTML).

use lazy_static::lazy_static;
use regex::Regex;

use crate::shared::constants::SUMMARY_MAX_CHARS;

lazy_static! {
    static ref FENCED_CODE: Regex = Regex::new(r"```[\s\S]*?```").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`[^`]*`").unwrap();
    static ref MD_IMAGE: Regex = Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap();
    static ref MD_LINK: Regex = Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap();
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref MD_MARKERS: Regex = Regex::new(r"[#*_~`]").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Strip markdown and HTML markup, keeping only readable text.
///
/// Images are removed before links so `![alt](src)` does not leave its alt text behind.
pub fn plain_text(content: &str) -> String {
    let text = FENCED_CODE.replace_all(content, "");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = MD_IMAGE.replace_all(&text, "");
    let text = MD_LINK.replace_all(&text, "$1");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = decode_common_entities(&text);
    let text = MD_MARKERS.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

fn decode_common_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Truncate to `max_chars` characters, appending "..." when shortened
pub fn summarize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated.trim_end())
}

/// Summary derived from rich-text content
pub fn content_summary(content: &str) -> String {
    summarize(&plain_text(content), SUMMARY_MAX_CHARS)
}
