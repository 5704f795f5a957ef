//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use regex::Regex;
use std::sync::OnceLock;

/// Split a comma-separated keyword field into trimmed, non-empty keywords
///
/// Order is preserved and duplicates are kept.
pub fn split_keywords(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(normalize_whitespace)
        .filter(|k| !k.is_empty())
        .collect()
}

/// Normalize whitespace in text
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").to_string()
}

/// Sanitize filename by removing invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    static INVALID_CHARS: OnceLock<Regex> = OnceLock::new();

    let re =
        INVALID_CHARS.get_or_init(|| Regex::new(r#"[<>:"/\\|?*]"#).expect("Invalid regex pattern"));

    re.replace_all(filename, "_").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keywords() {
        assert_eq!(
            split_keywords("python, java ,  javascript"),
            vec!["python", "java", "javascript"]
        );
        assert_eq!(split_keywords(" , ,"), Vec::<String>::new());
        assert_eq!(split_keywords("rust,rust"), vec!["rust", "rust"]);
        assert_eq!(split_keywords("machine   learning"), vec!["machine learning"]);
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("hello\n\nworld"), "hello world");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("c/c++"), "c_c++");
        assert_eq!(sanitize_filename("what?"), "what_");
        assert_eq!(sanitize_filename("python"), "python");
    }
}
