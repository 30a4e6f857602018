//! Dialogue and character signals.
//!
//! Dialogue is whatever sits between straight double quotes once curly
//! quotes are straightened. Speaker attribution looks for `"..." Name said`,
//! `"..." said Name` and `"..." she said`; anything else counts as
//! unattributed. Quick editorial signals, not a parser.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::continuity::{match_canon, Canon};
use crate::metrics::{most_common, per_100, round_to, safe_div, LengthStats};
use crate::segment::{tokens, words};

static DIALOGUE_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?s)"(.*?)""#).unwrap());

static ATTRIB_NAME_THEN_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""\s*[^"]*"\s*,?\s*\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\s+(?:said|asked|replied|answered|added|called|told)\b"#,
    )
    .unwrap()
});

static ATTRIB_TAG_THEN_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""\s*[^"]*"\s*,?\s*(?:said|asked|replied|answered|added|called|told)\s+\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\b"#,
    )
    .unwrap()
});

static ATTRIB_PRONOUN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)"\s*[^"]*"\s*,?\s*(?:he|she|they|ze|xe)\s+(?:said|asked|replied|answered|added|called|told)\b"#,
    )
    .unwrap()
});

static NEUTRAL_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["said", "asked", "replied", "answered", "added", "called", "told"]
        .into_iter()
        .collect()
});

static ORNATE_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "exclaimed", "shouted", "yelled", "screamed", "whispered", "murmured", "muttered",
        "growled", "snapped", "hissed", "breathed", "sighed", "barked", "croaked", "purred",
        "roared", "laughed", "chuckled", "gasped", "moaned", "whimpered", "screeched", "snarled",
        "sneered",
    ]
    .into_iter()
    .collect()
});

/// Capitalised words never taken for a character when no canon is given.
static MENTION_STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "The", "A", "An", "I", "He", "She", "They", "We", "It", "His", "Her", "Hers", "Their",
        "Our", "You",
    ]
    .into_iter()
    .collect()
});

/// Characters after a closing quote searched for a tag.
const TAG_CONTEXT_CHARS: usize = 80;
/// Words after a closing quote that may hold the tag.
const TAG_CONTEXT_WORDS: usize = 6;
const SHORT_LINE_WORDS: usize = 5;
const LONG_LINE_WORDS: usize = 20;
const TOP_TAGS: usize = 5;
const TOP_NAMES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagUsage {
    pub count: usize,
    pub top: Vec<(String, usize)>,
}

impl TagUsage {
    fn from_hits(hits: Vec<String>) -> Self {
        Self {
            count: hits.len(),
            top: most_common(hits, TOP_TAGS),
        }
    }
}

/// Share of dialogue lines containing each mark, per 100 lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DialoguePunctuation {
    pub question_marks: f64,
    pub exclamations: f64,
    pub ellipses: f64,
    pub dashes: f64,
    pub parentheticals: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogueReport {
    pub total_tokens: usize,
    pub dialogue_tokens: usize,
    pub narration_tokens: usize,
    pub dialogue_ratio_by_tokens: f64,
    pub dialogue_lines: usize,
    pub narration_lines: usize,
    pub dialogue_ratio_by_lines: f64,
    /// Words per quoted line; very short is five or fewer, very long 20 or more.
    pub line_lengths: LengthStats,
    pub neutral_tags: TagUsage,
    pub ornate_tags: TagUsage,
    pub attributed_by_name: Vec<(String, usize)>,
    pub attributed_by_pronoun: usize,
    /// Quoted lines minus attributions found; a rough estimate.
    pub unattributed_lines: usize,
    pub character_mentions: Vec<(String, usize)>,
    pub in_dialogue: DialoguePunctuation,
}

pub fn straighten_quotes(text: &str) -> String {
    text.replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Dialogue tags in the first few words after each closing quote.
pub fn tag_usage(text: &str) -> (TagUsage, TagUsage) {
    let mut neutral = Vec::new();
    let mut ornate = Vec::new();
    for m in DIALOGUE_SPAN_RE.find_iter(text) {
        let context: String = text[m.end()..].chars().take(TAG_CONTEXT_CHARS).collect();
        for w in tokens(&context).into_iter().take(TAG_CONTEXT_WORDS) {
            if NEUTRAL_TAGS.contains(w.as_str()) {
                neutral.push(w);
            } else if ORNATE_TAGS.contains(w.as_str()) {
                ornate.push(w);
            }
        }
    }
    (TagUsage::from_hits(neutral), TagUsage::from_hits(ornate))
}

/// Named speakers, ranked; filtered to `known` (lower-cased) when non-empty.
pub fn name_attributions(text: &str, known: &HashSet<String>) -> Vec<(String, usize)> {
    let names = [&*ATTRIB_NAME_THEN_TAG_RE, &*ATTRIB_TAG_THEN_NAME_RE]
        .into_iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|name| known.is_empty() || known.contains(&name.to_lowercase()));
    most_common(names, TOP_NAMES)
}

pub fn pronoun_attributions(text: &str) -> usize {
    ATTRIB_PRONOUN_RE.find_iter(text).count()
}

/// Canon totals when a canon is given, otherwise capitalised non-stopwords.
pub fn character_mentions(text: &str, canon: &Canon) -> Vec<(String, usize)> {
    if canon.is_empty() {
        let caps = words(text)
            .into_iter()
            .filter(|w| {
                w.chars().next().is_some_and(char::is_uppercase)
                    && !MENTION_STOPWORDS.contains(w)
                    && w.len() > 2
            })
            .map(str::to_string);
        return most_common(caps, TOP_NAMES);
    }
    let mut ranked: Vec<(String, usize)> = match_canon(text, &tokens(text), canon)
        .into_iter()
        .map(|(name, hits)| (name, hits.total))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(TOP_NAMES);
    ranked
}

fn in_dialogue_punctuation(spans: &[&str]) -> DialoguePunctuation {
    let lines = spans.len();
    let share = |pred: &dyn Fn(&str) -> bool| per_100(spans.iter().filter(|s| pred(s)).count(), lines);
    DialoguePunctuation {
        question_marks: share(&|s| s.contains('?')),
        exclamations: share(&|s| s.contains('!')),
        ellipses: share(&|s| s.contains("...") || s.contains('\u{2026}')),
        dashes: share(&|s| s.contains(['\u{2014}', '\u{2013}']) || s.contains(" - ")),
        parentheticals: share(&|s| s.contains(['(', ')'])),
    }
}

#[tracing::instrument(skip_all, fields(canon = canon.len()))]
pub fn analyze_dialogue(text: &str, canon: &Canon) -> DialogueReport {
    let text = straighten_quotes(text);

    let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    let spans: Vec<&str> = DIALOGUE_SPAN_RE
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    let total_tokens = words(&text).len();
    let dialogue_tokens: usize = spans.iter().map(|s| words(s).len()).sum();
    let dialogue_lines = spans.len();

    let line_lengths: Vec<usize> = spans
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| words(s).len())
        .collect();

    let (neutral_tags, ornate_tags) = tag_usage(&text);

    let known: HashSet<String> = canon.spellings().map(str::to_lowercase).collect();
    let attributed_by_name = name_attributions(&text, &known);
    let attributed_by_pronoun = pronoun_attributions(&text);
    let attributed: usize =
        attributed_by_name.iter().map(|(_, n)| n).sum::<usize>() + attributed_by_pronoun;

    tracing::debug!(dialogue_lines, attributed, "dialogue scanned");

    DialogueReport {
        total_tokens,
        dialogue_tokens,
        narration_tokens: total_tokens.saturating_sub(dialogue_tokens),
        dialogue_ratio_by_tokens: round_to(safe_div(dialogue_tokens as f64, total_tokens as f64), 3),
        dialogue_lines,
        narration_lines: lines.saturating_sub(dialogue_lines),
        dialogue_ratio_by_lines: round_to(safe_div(dialogue_lines as f64, lines as f64), 3),
        line_lengths: LengthStats::with_bounds(&line_lengths, SHORT_LINE_WORDS, LONG_LINE_WORDS),
        neutral_tags,
        ornate_tags,
        attributed_by_name,
        attributed_by_pronoun,
        unattributed_lines: dialogue_lines.saturating_sub(attributed),
        character_mentions: character_mentions(&text, canon),
        in_dialogue: in_dialogue_punctuation(&spans),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(pairs: &[(String, usize)]) -> Vec<(&str, usize)> {
        pairs.iter().map(|(n, c)| (n.as_str(), *c)).collect()
    }

    #[test]
    fn neutral_and_ornate_tags() {
        let (neutral, ornate) = tag_usage(r#""Go," she said. "No!" he growled. "Fine," Thea replied."#);
        assert_eq!(neutral.count, 3);
        assert_eq!(names(&neutral.top), vec![("replied", 2), ("said", 1)]);
        assert_eq!(ornate.count, 2);
        assert_eq!(names(&ornate.top), vec![("growled", 2)]);
    }

    #[test]
    fn name_before_tag() {
        let report = analyze_dialogue(r#""Hello," Thea said."#, &Canon::new());
        assert_eq!(names(&report.attributed_by_name), vec![("Thea", 1)]);
        assert_eq!(report.attributed_by_pronoun, 0);
        assert_eq!(report.unattributed_lines, 0);
    }

    #[test]
    fn tag_before_name() {
        let report = analyze_dialogue(r#""Hello," said Enid."#, &Canon::new());
        assert_eq!(names(&report.attributed_by_name), vec![("Enid", 1)]);
    }

    #[test]
    fn pronoun_attribution() {
        let report = analyze_dialogue("\u{201C}Hello,\u{201D} she said.", &Canon::new());
        assert!(report.attributed_by_name.is_empty());
        assert_eq!(report.attributed_by_pronoun, 1);
        assert_eq!(report.unattributed_lines, 0);
    }

    #[test]
    fn lines_without_tags_are_unattributed() {
        let report = analyze_dialogue(r#""Hello." "Anyone?""#, &Canon::new());
        assert_eq!(report.dialogue_lines, 2);
        assert_eq!(report.unattributed_lines, 2);
    }

    #[test]
    fn known_names_filter_attribution() {
        let mut canon = Canon::new();
        canon.add_inline("Thea");
        let report = analyze_dialogue(r#""Hi," Marcus said. "Yes," Thea said."#, &canon);
        assert_eq!(names(&report.attributed_by_name), vec![("Thea", 1)]);
        assert_eq!(report.unattributed_lines, 1);
        assert_eq!(names(&report.character_mentions), vec![("Thea", 1)]);
    }

    #[test]
    fn dialogue_ratios() {
        let report = analyze_dialogue("He waited.\n\"Come in,\" she said.", &Canon::new());
        assert_eq!(report.total_tokens, 6);
        assert_eq!(report.dialogue_tokens, 2);
        assert_eq!(report.narration_tokens, 4);
        assert_eq!(report.dialogue_ratio_by_tokens, 0.333);
        assert_eq!(report.dialogue_lines, 1);
        assert_eq!(report.narration_lines, 1);
        assert_eq!(report.dialogue_ratio_by_lines, 0.5);
        assert_eq!(report.line_lengths.very_short_ratio, 1.0);
    }

    #[test]
    fn punctuation_inside_quotes() {
        let report = analyze_dialogue(
            "\"Wait... what?!\" \"(quietly) fine\u{2014}\"",
            &Canon::new(),
        );
        let p = report.in_dialogue;
        assert_eq!(p.question_marks, 50.0);
        assert_eq!(p.exclamations, 50.0);
        assert_eq!(p.ellipses, 50.0);
        assert_eq!(p.dashes, 50.0);
        assert_eq!(p.parentheticals, 50.0);
    }

    #[test]
    fn mentions_without_canon() {
        let mentions = character_mentions("Thea met Enid. Thea left. The End", &Canon::new());
        assert_eq!(names(&mentions), vec![("Thea", 2), ("Enid", 1), ("End", 1)]);
    }

    #[test]
    fn empty_text() {
        let report = analyze_dialogue("", &Canon::new());
        assert_eq!(report.total_tokens, 0);
        assert_eq!(report.dialogue_ratio_by_tokens, 0.0);
        assert_eq!(report.dialogue_ratio_by_lines, 0.0);
        assert_eq!(report.line_lengths, LengthStats::default());
        assert_eq!(report.in_dialogue.question_marks, 0.0);
    }
}
