//! Transcript normalization and lexical scoring.
//!
//! The same normalization is applied everywhere transcripts or triggers
//! are compared, so "Open Chrome." and "open   chrome" are the same
//! phrase to every stage of the pipeline.

use std::collections::BTreeSet;

/// Normalize text for comparison: case-fold, drop punctuation, collapse
/// runs of whitespace to single spaces, trim.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Token set of already-normalized text.
pub fn token_set(text: &str) -> BTreeSet<&str> {
    text.split_whitespace().collect()
}

/// Order-independent token overlap between two normalized phrases, in
/// [0, 1].
///
/// Full containment of either token set scores 1.0, so "open click"
/// still covers a bare "click" trigger; partial overlap scores as the
/// Dice coefficient of the two sets.
pub fn token_set_ratio(a: &str, b: &str) -> f32 {
    let ta = token_set(a);
    let tb = token_set(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    if shared == ta.len() || shared == tb.len() {
        return 1.0;
    }
    (2 * shared) as f32 / (ta.len() + tb.len()) as f32
}
