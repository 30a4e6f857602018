//! Paragraph, sentence and token segmentation.
//!
//! Sentence splitting is deliberately naive: a sentence ends at `.`, `!` or
//! `?` followed by whitespace, or at a paragraph boundary. Abbreviations such
//! as "Mr." split too. That is fine for macro-level trendlines.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::normalize::normalize;

static PARAGRAPH_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]+(?:['-][A-Za-z0-9]+)*").unwrap());

/// Paragraph literals that mark a scene break.
pub const SCENE_DIVIDERS: &[&str] = &["***", "###", "---", "\u{00A7}\u{00A7}\u{00A7}", "* * *"];

pub fn is_scene_divider(paragraph: &str) -> bool {
    SCENE_DIVIDERS.contains(&paragraph.trim())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub index: usize,
    pub text: String,
    /// Structural marker only; excluded from prose statistics.
    pub is_divider: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    /// Contiguous, 0-based, in document order.
    pub index: usize,
    pub paragraph: usize,
    pub text: String,
}

/// A normalised document segmented once and shared by every scorer.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    paragraphs: Vec<Paragraph>,
    sentences: Vec<Sentence>,
}

impl Document {
    #[tracing::instrument(skip_all, fields(bytes = raw.len()))]
    pub fn new(raw: &str) -> Self {
        let text = normalize(raw);

        let paragraphs: Vec<Paragraph> = split_paragraphs(&text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Paragraph {
                index,
                is_divider: is_scene_divider(&text),
                text,
            })
            .collect();

        let mut sentences = Vec::new();
        for para in paragraphs.iter().filter(|p| !p.is_divider) {
            for text in split_sentences(&para.text) {
                sentences.push(Sentence {
                    index: sentences.len(),
                    paragraph: para.index,
                    text,
                });
            }
        }

        tracing::debug!(
            paragraphs = paragraphs.len(),
            sentences = sentences.len(),
            "segmented document"
        );

        Self {
            text,
            paragraphs,
            sentences,
        }
    }

    /// The normalised text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn sentence_texts(&self) -> Vec<&str> {
        self.sentences.iter().map(|s| s.text.as_str()).collect()
    }

    /// Word tokens of the whole document, original case.
    pub fn words(&self) -> Vec<&str> {
        words(&self.text)
    }

    /// Word tokens of the whole document, lower-cased for lexicon lookups.
    pub fn tokens(&self) -> Vec<String> {
        tokens(&self.text)
    }
}

/// Split on two or more newlines, dropping blank paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    PARAGRAPH_BREAK_RE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collapse whitespace, then split after terminal punctuation followed by a space.
pub fn split_sentences(paragraph: &str) -> Vec<String> {
    let collapsed = WHITESPACE_RUN_RE.replace_all(paragraph.trim(), " ");
    let bytes = collapsed.as_bytes();

    let mut sentences = Vec::new();
    let mut start = 0;
    for (i, b) in bytes.iter().enumerate() {
        if matches!(b, b'.' | b'!' | b'?') && bytes.get(i + 1) == Some(&b' ') {
            push_trimmed(&mut sentences, &collapsed[start..=i]);
            start = i + 2;
        }
    }
    if start < collapsed.len() {
        push_trimmed(&mut sentences, &collapsed[start..]);
    }
    sentences
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}

/// Word tokens in original case.
pub fn words(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Lower-cased word tokens.
pub fn tokens(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Capitalised first letter followed by lower-case only ("Thea", not "NASA").
pub fn looks_like_proper_noun(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let rest: Vec<char> = chars.collect();
            rest.iter().any(|c| c.is_alphabetic()) && !rest.iter().any(|c| c.is_uppercase())
        }
        _ => false,
    }
}
