//! Scene and pacing structure.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::metrics::{round_to, safe_div, LengthStats};
use crate::segment::{tokens, words, Document};

static INTERROGATIVE_OPENER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:who|what|why|how|where|when)\b").unwrap());

static STRONG_VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "shatter", "fracture", "vanish", "plunge", "ignite", "explode", "collapse", "betray",
        "discover", "confess", "appear", "disappear", "scream", "bleed", "break", "slam", "pound",
        "crash", "kill", "die", "lie", "reveal", "admit", "threaten", "forbid", "refuse", "dare",
    ]
    .into_iter()
    .collect()
});

const TENSION_ENDERS: &[char] = &['?', '\u{2014}', '\u{2013}', '-', '\u{2026}'];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureReport {
    /// Prose paragraphs; scene dividers excluded.
    pub paragraphs: usize,
    pub words: usize,
    pub sentences: usize,
    pub sentence_lengths: LengthStats,
    pub words_per_minute: usize,
    pub read_time_minutes: f64,
    /// Paragraph indices where each scene starts.
    pub scene_boundaries: Vec<usize>,
    pub scenes: usize,
    pub avg_words_per_scene: f64,
    pub last_sentence: Option<String>,
    pub hook_score: f64,
}

/// First scene at 0; each divider followed by a paragraph starts another.
pub fn scene_boundaries(doc: &Document) -> Vec<usize> {
    let paragraphs = doc.paragraphs();
    if paragraphs.is_empty() {
        return Vec::new();
    }
    let mut bounds = vec![0];
    bounds.extend(
        paragraphs
            .iter()
            .filter(|p| p.is_divider && p.index + 1 < paragraphs.len())
            .map(|p| p.index + 1),
    );
    bounds.sort_unstable();
    bounds.dedup();
    bounds
}

/// Closing-line pull, in `[0, 1]`.
pub fn hook_score(sentence: &str) -> f64 {
    let s = sentence.trim();
    if s.is_empty() {
        return 0.0;
    }
    let mut score = 0.0;

    if s.ends_with("...") || s.chars().last().is_some_and(|c| TENSION_ENDERS.contains(&c)) {
        score += 0.4;
    }

    let distinct: HashSet<String> = tokens(s).into_iter().collect();
    let strong = distinct
        .iter()
        .filter(|t| STRONG_VERBS.contains(t.as_str()))
        .count();
    score += (0.1 * strong as f64).min(0.4);

    if s.starts_with('?') || INTERROGATIVE_OPENER_RE.is_match(&s.to_lowercase()) {
        score += 0.2;
    }

    round_to(score.clamp(0.0, 1.0), 2)
}

#[tracing::instrument(skip_all, fields(words_per_minute = words_per_minute))]
pub fn analyze_structure(doc: &Document, words_per_minute: usize) -> StructureReport {
    let paragraphs = doc.paragraphs();
    let para_words: Vec<usize> = paragraphs
        .iter()
        .map(|p| if p.is_divider { 0 } else { words(&p.text).len() })
        .collect();
    let total_words: usize = para_words.iter().sum();

    let bounds = scene_boundaries(doc);
    let scene_words: Vec<usize> = bounds
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = bounds.get(i + 1).copied().unwrap_or(paragraphs.len());
            para_words[start..end].iter().sum()
        })
        .collect();

    let lengths: Vec<usize> = doc.sentences().iter().map(|s| words(&s.text).len()).collect();
    let last_sentence = doc.sentences().last().map(|s| s.text.clone());

    StructureReport {
        paragraphs: paragraphs.iter().filter(|p| !p.is_divider).count(),
        words: total_words,
        sentences: lengths.len(),
        sentence_lengths: LengthStats::from_lengths(&lengths),
        words_per_minute,
        read_time_minutes: round_to(safe_div(total_words as f64, words_per_minute as f64), 2),
        scenes: bounds.len(),
        avg_words_per_scene: round_to(
            safe_div(scene_words.iter().sum::<usize>() as f64, scene_words.len() as f64),
            1,
        ),
        scene_boundaries: bounds,
        hook_score: last_sentence.as_deref().map_or(0.0, hook_score),
        last_sentence,
    }
}
