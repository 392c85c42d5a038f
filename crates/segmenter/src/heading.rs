//! Heading detection — finds section headings in plain text.
//!
//! Three patterns, tried in order per line; at most one fires:
//! 1. ALL CAPS lines with at least three words (level 1)
//! 2. Numbered headings like "1. Overview" or "2.3 Details" (level = dots)
//! 3. A line underlined with `===` (level 1) or `---` (level 2)

use regex_lite::Regex;
use std::sync::LazyLock;

static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?:\d+\.)+)\s+(.+)$").expect("static pattern"));

static UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(={3,}|-{3,})$").expect("static pattern"));

/// A detected document heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    /// 1 = top-level, 2 = subsection, ...
    pub level: usize,
    /// Line number of the heading text in the document
    pub line: usize,
}

/// Detect headings over the whole document.
pub fn detect_headings(text: &str) -> Vec<Heading> {
    let lines: Vec<&str> = text.lines().collect();
    let mut headings: Vec<Heading> = Vec::new();

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if is_all_caps_heading(line) {
            headings.push(Heading {
                text: line.to_string(),
                level: 1,
                line: i,
            });
            continue;
        }

        if let Some(caps) = NUMBERED.captures(line) {
            let level = caps[1].matches('.').count();
            headings.push(Heading {
                text: caps[2].to_string(),
                level,
                line: i,
            });
            continue;
        }

        if let Some(caps) = UNDERLINE.captures(line) {
            if i == 0 {
                continue;
            }
            let prev = lines[i - 1].trim();
            // Skip if the previous line already matched a pattern
            let already = headings.last().is_some_and(|h| h.line == i - 1);
            if !prev.is_empty() && !already {
                let level = if caps[1].starts_with('=') { 1 } else { 2 };
                headings.push(Heading {
                    text: prev.to_string(),
                    level,
                    line: i - 1,
                });
            }
        }
    }

    tracing::debug!(count = headings.len(), "Detected headings");
    headings
}

/// ALL CAPS heuristic: at least three whitespace-separated tokens, at
/// least one alphabetic character, and every alphabetic character
/// uppercase.
fn is_all_caps_heading(line: &str) -> bool {
    if line.split_whitespace().count() < 3 {
        return false;
    }
    let mut saw_alpha = false;
    for c in line.chars().filter(|c| c.is_alphabetic()) {
        saw_alpha = true;
        if !c.is_uppercase() {
            return false;
        }
    }
    saw_alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_caps_needs_three_words() {
        assert!(is_all_caps_heading("GETTING STARTED WITH RUST"));
        assert!(!is_all_caps_heading("INTRODUCTION"));
        assert!(!is_all_caps_heading("TWO WORDS"));
    }

    #[test]
    fn all_caps_rejects_mixed_case() {
        assert!(!is_all_caps_heading("Getting Started With Rust"));
    }

    #[test]
    fn all_caps_rejects_digit_only_lines() {
        assert!(!is_all_caps_heading("12 34 56"));
    }

    #[test]
    fn numbered_heading_level_counts_dots() {
        let headings = detect_headings("1. Overview\n\n1.1. Details\n");
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].text, "Overview");
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[1].text, "Details");
        assert_eq!(headings[1].level, 2);
    }

    #[test]
    fn underlined_heading_levels() {
        let text = "Overview\n========\n\nDetails\n-------\n";
        let headings = detect_headings(text);
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[0].text, "Overview");
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[1].text, "Details");
        assert_eq!(headings[1].level, 2);
    }

    #[test]
    fn underline_after_caps_heading_does_not_duplicate() {
        let text = "THE BIG PICTURE VIEW\n====================\nbody text\n";
        let headings = detect_headings(text);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "THE BIG PICTURE VIEW");
    }

    #[test]
    fn underline_at_document_start_is_not_a_heading() {
        let headings = detect_headings("=====\ntext\n");
        assert!(headings.is_empty());
    }

    #[test]
    fn plain_prose_has_no_headings() {
        let text = "This is a paragraph of ordinary prose.\n\nAnd another one follows it.\n";
        assert!(detect_headings(text).is_empty());
    }

    #[test]
    fn heading_line_numbers_are_exact() {
        let text = "preamble\n\n1. First\ncontent\n\n2. Second\n";
        let headings = detect_headings(text);
        assert_eq!(headings[0].line, 2);
        assert_eq!(headings[1].line, 5);
    }
}
