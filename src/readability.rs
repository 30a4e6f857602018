//! Readability formulas and style signals.
//!
//! Syllables are estimated from vowel groups, so every score here is a coarse
//! English heuristic. All formulas return `0.0` for a document with no words
//! or no sentences.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::metrics::{most_common, per_100, per_1k, round_to, LengthStats};
use crate::segment::{looks_like_proper_noun, words, Document};

static VOWEL_GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[aeiouy]+").unwrap());

static PASSIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:am|is|are|was|were|be|been|being)(?:\s+\w+ly)?\s+\w+(?:ed|en)\b")
        .unwrap()
});

static FILTER_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "just", "very", "really", "suddenly", "seems", "seemed", "quite", "rather", "somewhat",
        "perhaps", "maybe", "almost", "nearly", "basically", "literally", "honestly", "actually",
        "obviously", "clearly", "simply", "start", "started", "begin", "began", "try", "tried",
        "managed", "able", "seem", "felt", "feel", "think", "thought", "look", "looked", "appear",
        "appeared", "realize", "realized", "decide", "decided", "remember", "remembered",
    ]
    .into_iter()
    .collect()
});

static WEAK_VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
        "does", "did", "get", "gets", "got", "seem", "seems", "seemed", "feel", "feels", "felt",
        "think", "thinks", "thought", "know", "knows", "knew", "look", "looks", "looked",
    ]
    .into_iter()
    .collect()
});

const NOMINAL_SUFFIXES: &[&str] = &[
    "tion", "sion", "ment", "ance", "ence", "ity", "ness", "ship", "ality", "ability", "ibility",
    "ism", "ization", "isation",
];

const TOP_N: usize = 10;

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// Vowel groups (y included), at least one, minus a silent final `e`.
pub fn count_syllables(word: &str) -> usize {
    let w = word.to_lowercase();
    if w.is_empty() {
        return 0;
    }
    let mut syllables = VOWEL_GROUP_RE.find_iter(&w).count().max(1);
    if w.ends_with('e') && !w.ends_with("le") && !w.ends_with("ye") && syllables > 1 {
        syllables -= 1;
    }
    syllables
}

/// Three or more syllables and not shaped like a proper noun.
pub fn is_complex_word(word: &str) -> bool {
    count_syllables(word) >= 3 && !looks_like_proper_noun(word)
}

pub fn flesch_reading_ease(words: usize, sentences: usize, syllables: usize) -> f64 {
    if sentences == 0 || words == 0 {
        return 0.0;
    }
    let (w, s, y) = (words as f64, sentences as f64, syllables as f64);
    round_to(206.835 - 1.015 * (w / s) - 84.6 * (y / w), 2)
}

pub fn flesch_kincaid_grade(words: usize, sentences: usize, syllables: usize) -> f64 {
    if sentences == 0 || words == 0 {
        return 0.0;
    }
    let (w, s, y) = (words as f64, sentences as f64, syllables as f64);
    round_to(0.39 * (w / s) + 11.8 * (y / w) - 15.59, 2)
}

pub fn gunning_fog(words: usize, sentences: usize, complex_words: usize) -> f64 {
    if sentences == 0 || words == 0 {
        return 0.0;
    }
    let (w, s, c) = (words as f64, sentences as f64, complex_words as f64);
    round_to(0.4 * ((w / s) + 100.0 * (c / w)), 2)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Count, most frequent entries and rate per 100 words for one word class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordUsage {
    pub count: usize,
    pub top: Vec<(String, usize)>,
    pub per_100_words: f64,
}

impl WordUsage {
    fn from_hits(hits: Vec<String>, total_words: usize) -> Self {
        Self {
            count: hits.len(),
            per_100_words: per_100(hits.len(), total_words),
            top: most_common(hits, TOP_N),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadabilityReport {
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub gunning_fog: f64,
    pub total_words: usize,
    pub total_sentences: usize,
    pub total_syllables: usize,
    pub complex_words: usize,
    pub sentence_lengths: LengthStats,
    pub passive_count: usize,
    pub passive_per_1k_words: f64,
    pub adverbs_ly: WordUsage,
    pub filter_words: WordUsage,
    pub weak_verbs: WordUsage,
    pub nominalizations: WordUsage,
}

#[tracing::instrument(skip_all)]
pub fn analyze_readability(doc: &Document) -> ReadabilityReport {
    let all_words = doc.words();
    let total_words = all_words.len();
    let total_sentences = doc.sentences().len();
    let total_syllables: usize = all_words.iter().map(|w| count_syllables(w)).sum();
    let complex_words = all_words.iter().filter(|w| is_complex_word(w)).count();

    let lengths: Vec<usize> = doc
        .sentences()
        .iter()
        .map(|s| words(&s.text).len())
        .collect();

    let passive_count = PASSIVE_RE.find_iter(doc.text()).count();

    let lower: Vec<String> = all_words.iter().map(|w| w.to_lowercase()).collect();
    let adverbs = lower
        .iter()
        .filter(|w| w.len() > 2 && w.ends_with("ly"))
        .cloned()
        .collect();
    let filters = lower
        .iter()
        .filter(|w| FILTER_WORDS.contains(w.as_str()))
        .cloned()
        .collect();
    let weak = lower
        .iter()
        .filter(|w| WEAK_VERBS.contains(w.as_str()))
        .cloned()
        .collect();
    let nominal = lower
        .iter()
        .filter(|w| NOMINAL_SUFFIXES.iter().any(|suffix| w.ends_with(suffix)))
        .cloned()
        .collect();

    ReadabilityReport {
        flesch_reading_ease: flesch_reading_ease(total_words, total_sentences, total_syllables),
        flesch_kincaid_grade: flesch_kincaid_grade(total_words, total_sentences, total_syllables),
        gunning_fog: gunning_fog(total_words, total_sentences, complex_words),
        total_words,
        total_sentences,
        total_syllables,
        complex_words,
        sentence_lengths: LengthStats::from_lengths(&lengths),
        passive_count,
        passive_per_1k_words: per_1k(passive_count, total_words),
        adverbs_ly: WordUsage::from_hits(adverbs, total_words),
        filter_words: WordUsage::from_hits(filters, total_words),
        weak_verbs: WordUsage::from_hits(weak, total_words),
        nominalizations: WordUsage::from_hits(nominal, total_words),
    }
}
