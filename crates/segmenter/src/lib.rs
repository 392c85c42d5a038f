//! # Roleweave Segmenter
//!
//! Decomposes raw document text into ordered, semantically cohesive
//! units. The pipeline is deterministic for a fixed embedding backend:
//!
//! 1. Detect headings and split the document into sections
//! 2. Extract paragraphs, dropping fragments under the length floor
//! 3. Embed each section's paragraphs as one batch
//! 4. Group consecutive paragraphs whose similarity to the running group
//!    centroid clears the threshold
//! 5. Merge undersized groups into a neighbor
//! 6. Materialize one `SemanticUnit` per group

pub mod heading;
pub mod section;
pub mod similarity;

use std::sync::Arc;

use roleweave_config::SegmenterConfig;
use roleweave_core::{Embedder, Error, Result, SemanticUnit};
use tracing::debug;

use crate::section::Section;

/// Segments documents into semantic units.
pub struct Segmenter {
    embedder: Arc<dyn Embedder>,
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            config: SegmenterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SegmenterConfig) -> Self {
        self.config = config;
        self
    }

    /// Segment a document.
    ///
    /// Empty input, or input with no paragraph clearing the length floor,
    /// yields zero units; callers gate on that before opening a session.
    /// Embedding failures propagate; segmentation is not retried.
    pub async fn segment(&self, text: &str) -> Result<Vec<SemanticUnit>> {
        let headings = heading::detect_headings(text);
        let sections = section::split_sections(text, &headings);

        let mut units: Vec<SemanticUnit> = Vec::new();

        for (section_id, sec) in sections.iter().enumerate() {
            let paragraphs = extract_paragraphs(&sec.text, self.config.min_paragraph_chars);
            if paragraphs.is_empty() {
                debug!(section = section_id, "No usable paragraphs in section");
                continue;
            }

            let embeddings = self
                .embedder
                .embed(&paragraphs)
                .await
                .map_err(Error::Embedding)?;

            let groups = group_by_similarity(paragraphs.len(), &embeddings, &self.config);
            let groups = merge_small_groups(groups, self.config.min_group_size);

            for (group_id, group) in groups.iter().enumerate() {
                units.push(materialize_unit(
                    sec,
                    section_id,
                    group_id,
                    group,
                    &paragraphs,
                    &embeddings,
                    units.len(),
                ));
            }
        }

        debug!(units = units.len(), "Document segmented");
        Ok(units)
    }
}

/// Split section text on blank lines, trimming each paragraph and
/// dropping those under the length floor.
fn extract_paragraphs(text: &str, min_chars: usize) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty() && p.len() >= min_chars)
        .map(str::to_string)
        .collect()
}

/// Walk paragraphs in order, appending each to the current group while its
/// similarity to the group centroid clears the threshold and the group has
/// room; otherwise close the group and seed a new one.
fn group_by_similarity(
    count: usize,
    embeddings: &[Vec<f32>],
    config: &SegmenterConfig,
) -> Vec<Vec<usize>> {
    if count == 0 {
        return Vec::new();
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = vec![0];

    for i in 1..count {
        let center = similarity::centroid(embeddings, &current);
        let sim = similarity::cosine_similarity(&embeddings[i], &center);

        if sim >= config.similarity_threshold && current.len() < config.max_group_size {
            current.push(i);
        } else {
            groups.push(std::mem::replace(&mut current, vec![i]));
        }
    }
    groups.push(current);
    groups
}

/// Fold groups smaller than `min` into the adjacent later group, or into
/// the previous group when the undersized group is last.
fn merge_small_groups(groups: Vec<Vec<usize>>, min: usize) -> Vec<Vec<usize>> {
    if groups.len() <= 1 {
        return groups;
    }

    let last = groups.len() - 1;
    let mut merged: Vec<Vec<usize>> = Vec::new();
    let mut pending: Vec<usize> = Vec::new();

    for (i, mut group) in groups.into_iter().enumerate() {
        if !pending.is_empty() {
            let mut combined = std::mem::take(&mut pending);
            combined.append(&mut group);
            group = combined;
        }

        if group.len() < min && i < last {
            pending = group;
        } else if group.len() < min {
            match merged.last_mut() {
                Some(prev) => prev.extend(group),
                None => merged.push(group),
            }
        } else {
            merged.push(group);
        }
    }

    merged
}

fn materialize_unit(
    sec: &Section,
    section_id: usize,
    group_id: usize,
    group: &[usize],
    paragraphs: &[String],
    embeddings: &[Vec<f32>],
    position: usize,
) -> SemanticUnit {
    let text = group
        .iter()
        .map(|&i| paragraphs[i].as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    let word_count = group
        .iter()
        .map(|&i| paragraphs[i].split_whitespace().count())
        .sum();

    let mut metadata = serde_json::Map::new();
    metadata.insert("paragraph_count".into(), serde_json::json!(group.len()));
    metadata.insert("heading_level".into(), serde_json::json!(sec.level));
    metadata.insert("section_id".into(), serde_json::json!(section_id));
    metadata.insert("group_id".into(), serde_json::json!(group_id));

    SemanticUnit {
        id: format!("S{section_id}_{group_id}"),
        title: sec.title.clone(),
        text,
        section_kind: sec.kind,
        position,
        cohesion: similarity::average_pairwise(embeddings, group),
        word_count,
        metadata,
    }
}
