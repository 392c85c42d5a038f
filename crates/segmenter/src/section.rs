//! Section splitting — headings partition the document, and each section
//! gets a kind from its heading text.

use roleweave_core::SectionKind;

use crate::heading::Heading;

const INTRODUCTION_KEYWORDS: [&str; 3] = ["introduction", "overview", "background"];
const CONCLUSION_KEYWORDS: [&str; 3] = ["conclusion", "summary", "final"];
const METHODOLOGY_KEYWORDS: [&str; 3] = ["method", "approach", "implementation"];

/// A contiguous slice of the document under one heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Heading text; `None` only for the headingless whole-document case
    pub title: Option<String>,
    pub kind: SectionKind,
    pub level: usize,
    pub text: String,
}

/// Split the document into sections at heading boundaries.
///
/// With no headings the whole document is a single untitled body section.
/// Empty sections (a heading immediately followed by another) are dropped.
pub fn split_sections(text: &str, headings: &[Heading]) -> Vec<Section> {
    if headings.is_empty() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        return vec![Section {
            title: None,
            kind: SectionKind::Body,
            level: 0,
            text: trimmed.to_string(),
        }];
    }

    let lines: Vec<&str> = text.lines().collect();
    let mut sections = Vec::new();

    for (i, heading) in headings.iter().enumerate() {
        let start = heading.line + 1;
        let end = headings
            .get(i + 1)
            .map(|next| next.line)
            .unwrap_or(lines.len());

        let body = lines[start..end.min(lines.len())].join("\n");
        let body = body.trim();
        if body.is_empty() {
            continue;
        }

        sections.push(Section {
            title: Some(heading.text.clone()),
            kind: classify_heading(&heading.text),
            level: heading.level,
            text: body.to_string(),
        });
    }

    tracing::debug!(count = sections.len(), "Split document into sections");
    sections
}

/// Classify a heading into a section kind by keyword matching.
pub fn classify_heading(heading: &str) -> SectionKind {
    let lower = heading.to_lowercase();

    if INTRODUCTION_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return SectionKind::Introduction;
    }
    if CONCLUSION_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return SectionKind::Conclusion;
    }
    if METHODOLOGY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return SectionKind::Methodology;
    }
    SectionKind::Body
}
