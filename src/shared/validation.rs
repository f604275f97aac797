use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating username fields
    /// Letters (any script), digits, underscores, dots and hyphens; no whitespace
    /// - Valid: "john_doe", "user123", "li.wei", "张伟"
    /// - Invalid: "user name", "user@name", ""
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[\p{L}\p{N}_.\-]+$").unwrap();

    /// Comma separated list of skills, e.g. "rust, go,sql"
    static ref LIST_SEPARATOR: Regex = Regex::new(r"\s*,\s*").unwrap();
}

/// Split a comma separated query value into trimmed, non-empty items
pub fn split_list(value: &str) -> Vec<String> {
    LIST_SEPARATOR
        .split(value.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Escape `%`, `_` and `\` so user input can be embedded in an ILIKE pattern
pub fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
