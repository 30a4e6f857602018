//! Mechanics and typography counters.
//!
//! Exact, deterministic counts over the text: punctuation overuse, quote and
//! dash glyphs, spacing hygiene, word repetition, and bracket balance. Counts
//! are taken before trailing whitespace is trimmed, since trailing spaces and
//! tabs are themselves hygiene issues.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::metrics::{count_ordered, most_common, per_1k};
use crate::segment::tokens;

static SPACED_HYPHEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s-\s").unwrap());

static MULTI_PUNCT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!?]{2,}").unwrap());

static DOUBLE_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"  +").unwrap());

static BLANK_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "if", "then", "of", "to", "in", "on", "for", "with",
        "as", "at", "by", "from", "that", "this", "it", "is", "was", "were", "be", "been", "are",
        "i", "you", "he", "she", "they", "we", "my", "your", "his", "her", "their", "our", "not",
        "no", "so",
    ]
    .into_iter()
    .collect()
});

const TOP_REPEATED: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlyphCount {
    pub count: usize,
    pub per_1k_words: f64,
}

impl GlyphCount {
    fn new(count: usize, total_words: usize) -> Self {
        Self {
            count,
            per_1k_words: per_1k(count, total_words),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PunctuationReport {
    pub exclamations: GlyphCount,
    pub question_marks: GlyphCount,
    /// `...` and `…` both count.
    pub ellipses: GlyphCount,
    pub em_dashes: GlyphCount,
    pub en_dashes: GlyphCount,
    pub spaced_hyphen_as_dash: GlyphCount,
    /// Runs like `?!` or `!!!`.
    pub multi_punct: GlyphCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypographyReport {
    pub straight_quotes: usize,
    pub curly_quotes: usize,
    pub hyphens: usize,
    pub en_dashes: usize,
    pub em_dashes: usize,
    pub spaced_hyphen_as_dash: usize,
    pub nonbreaking_spaces: usize,
    pub tabs: usize,
    pub double_spaces: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpacingReport {
    pub lines_with_edge_spaces: usize,
    pub blank_line_runs_3plus: usize,
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepetitionReport {
    /// `word word` occurrences, most frequent first.
    pub immediate_duplicates: Vec<(String, usize)>,
    pub top_repeated: Vec<(String, usize)>,
    /// Word and the number of window positions where it met the threshold.
    pub window_flags: Vec<(String, usize)>,
    pub window: usize,
    pub threshold: usize,
    pub total_words: usize,
}

/// Signed open-minus-close counts; quote fields are 0/1 parity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketBalance {
    pub parens: i64,
    pub brackets: i64,
    pub braces: i64,
    pub double_quote_parity: usize,
    pub single_quote_parity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MechanicsReport {
    pub total_words: usize,
    pub punctuation: PunctuationReport,
    pub typography: TypographyReport,
    pub spacing: SpacingReport,
    pub repetition: RepetitionReport,
    pub unmatched: BracketBalance,
}

fn count_char(text: &str, c: char) -> usize {
    text.matches(c).count()
}

pub fn punctuation(text: &str, total_words: usize) -> PunctuationReport {
    let g = |n| GlyphCount::new(n, total_words);
    PunctuationReport {
        exclamations: g(count_char(text, '!')),
        question_marks: g(count_char(text, '?')),
        ellipses: g(text.matches("...").count() + count_char(text, '\u{2026}')),
        em_dashes: g(count_char(text, '\u{2014}')),
        en_dashes: g(count_char(text, '\u{2013}')),
        spaced_hyphen_as_dash: g(SPACED_HYPHEN_RE.find_iter(text).count()),
        multi_punct: g(MULTI_PUNCT_RE.find_iter(text).count()),
    }
}

pub fn quote_counts(text: &str) -> (usize, usize) {
    let straight = count_char(text, '"') + count_char(text, '\'');
    let curly = text
        .chars()
        .filter(|c| matches!(c, '\u{201C}' | '\u{201D}' | '\u{2018}' | '\u{2019}'))
        .count();
    (straight, curly)
}

pub fn typography(text: &str) -> TypographyReport {
    let (straight_quotes, curly_quotes) = quote_counts(text);
    TypographyReport {
        straight_quotes,
        curly_quotes,
        hyphens: count_char(text, '-'),
        en_dashes: count_char(text, '\u{2013}'),
        em_dashes: count_char(text, '\u{2014}'),
        spaced_hyphen_as_dash: SPACED_HYPHEN_RE.find_iter(text).count(),
        nonbreaking_spaces: count_char(text, '\u{00A0}'),
        tabs: count_char(text, '\t'),
        double_spaces: DOUBLE_SPACE_RE.find_iter(text).count(),
    }
}

pub fn spacing(text: &str) -> SpacingReport {
    let lines: Vec<&str> = text.split('\n').collect();
    SpacingReport {
        lines_with_edge_spaces: lines
            .iter()
            .filter(|l| l.starts_with(' ') || l.ends_with(' '))
            .count(),
        blank_line_runs_3plus: BLANK_RUN_RE.find_iter(text).count(),
        line_count: lines.len(),
    }
}

/// Repetition signals over lower-cased tokens.
///
/// A word is flagged at every window position where it occurs at least
/// `threshold` times among the last `window` tokens.
pub fn repetition(words: &[String], window: usize, threshold: usize) -> RepetitionReport {
    let immediate: Vec<&str> = words
        .windows(2)
        .filter(|pair| pair[0] == pair[1])
        .map(|pair| pair[0].as_str())
        .collect();
    let mut immediate_duplicates = count_ordered(immediate);
    immediate_duplicates.sort_by(|a, b| b.1.cmp(&a.1));

    let top_repeated = most_common(
        words
            .iter()
            .map(String::as_str)
            .filter(|w| w.len() > 2 && !STOPWORDS.contains(w)),
        TOP_REPEATED,
    );

    let mut queue: VecDeque<&str> = VecDeque::with_capacity(window + 1);
    let mut in_window: HashMap<&str, usize> = HashMap::new();
    let mut over: BTreeSet<&str> = BTreeSet::new();
    let mut flagged: Vec<&str> = Vec::new();
    for w in words {
        let w = w.as_str();
        queue.push_back(w);
        let c = in_window.entry(w).or_insert(0);
        *c += 1;
        if *c >= threshold && !STOPWORDS.contains(w) {
            over.insert(w);
        }
        if queue.len() > window {
            if let Some(old) = queue.pop_front() {
                if let Some(c) = in_window.get_mut(old) {
                    *c -= 1;
                    if *c < threshold {
                        over.remove(old);
                    }
                    if *c == 0 {
                        in_window.remove(old);
                    }
                }
            }
        }
        flagged.extend(over.iter().copied());
    }

    RepetitionReport {
        immediate_duplicates: to_owned_counts(immediate_duplicates),
        top_repeated: to_owned_counts(top_repeated),
        window_flags: to_owned_counts(most_common(flagged, TOP_REPEATED)),
        window,
        threshold,
        total_words: words.len(),
    }
}

fn to_owned_counts(counts: Vec<(&str, usize)>) -> Vec<(String, usize)> {
    counts
        .into_iter()
        .map(|(w, c)| (w.to_string(), c))
        .collect()
}

pub fn bracket_balance(text: &str) -> BracketBalance {
    let balance = |open, close| count_char(text, open) as i64 - count_char(text, close) as i64;
    BracketBalance {
        parens: balance('(', ')'),
        brackets: balance('[', ']'),
        braces: balance('{', '}'),
        double_quote_parity: count_char(text, '"') % 2,
        single_quote_parity: count_char(text, '\'') % 2,
    }
}

#[tracing::instrument(skip_all, fields(bytes = text.len()))]
pub fn analyze_mechanics(text: &str, window: usize, threshold: usize) -> MechanicsReport {
    let words = tokens(text);
    let total_words = words.len();
    MechanicsReport {
        total_words,
        punctuation: punctuation(text, total_words),
        typography: typography(text),
        spacing: spacing(text),
        repetition: repetition(&words, window, threshold),
        unmatched: bracket_balance(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immediate_duplicate_word() {
        let report = analyze_mechanics("the the cat sat.", 80, 6);
        assert_eq!(
            report.repetition.immediate_duplicates,
            vec![("the".to_string(), 1)]
        );
    }

    #[test]
    fn punctuation_counts_and_density() {
        let p = punctuation("Wait... what?! No\u{2026} no!", 4);
        assert_eq!(p.exclamations.count, 2);
        assert_eq!(p.question_marks.count, 1);
        assert_eq!(p.ellipses.count, 2);
        assert_eq!(p.multi_punct.count, 1);
        assert_eq!(p.exclamations.per_1k_words, 500.0);
    }

    #[test]
    fn empty_text_is_zero_density() {
        let report = analyze_mechanics("", 80, 6);
        assert_eq!(report.total_words, 0);
        assert_eq!(report.punctuation.exclamations.per_1k_words, 0.0);
        assert!(report.repetition.immediate_duplicates.is_empty());
    }

    #[test]
    fn typography_glyphs() {
        let t = typography("\"Hi,\" she said \u{2014} \u{201C}ok\u{201D}  - fine\tnow\u{00A0}.");
        assert_eq!(t.straight_quotes, 2);
        assert_eq!(t.curly_quotes, 2);
        assert_eq!(t.em_dashes, 1);
        assert_eq!(t.spaced_hyphen_as_dash, 1);
        assert_eq!(t.tabs, 1);
        assert_eq!(t.nonbreaking_spaces, 1);
        assert_eq!(t.double_spaces, 1);
    }

    #[test]
    fn spacing_layout() {
        let s = spacing(" lead\ntrail \n\n\n\nend");
        assert_eq!(s.lines_with_edge_spaces, 2);
        assert_eq!(s.blank_line_runs_3plus, 1);
        assert_eq!(s.line_count, 6);
    }

    #[test]
    fn brackets_are_signed() {
        let b = bracket_balance("((a) [b]] {c \"d");
        assert_eq!(b.parens, 1);
        assert_eq!(b.brackets, -1);
        assert_eq!(b.braces, 1);
        assert_eq!(b.double_quote_parity, 1);
        assert_eq!(b.single_quote_parity, 0);
    }

    #[test]
    fn window_flags_dense_repeats() {
        let words = tokens("door door door door door door the the the the the the");
        let r = repetition(&words, 80, 6);
        // Flagged from the sixth "door" through the end: seven positions.
        assert_eq!(r.window_flags, vec![("door".to_string(), 7)]);
    }

    #[test]
    fn window_forgets_old_tokens() {
        let words = tokens("rain rain rain x y z w");
        let r = repetition(&words, 3, 3);
        assert_eq!(r.window_flags, vec![("rain".to_string(), 1)]);
    }

    #[test]
    fn top_repeated_skips_short_and_stop_words() {
        let words = tokens("the cat is on a cat mat at the cat");
        let r = repetition(&words, 80, 6);
        assert_eq!(r.top_repeated[0], ("cat".to_string(), 3));
        assert!(r.top_repeated.iter().all(|(w, _)| w != "the"));
    }
}
