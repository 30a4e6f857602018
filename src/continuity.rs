//! Name, term and voice continuity.
//!
//! Canon matching counts every known alias of each canonical name. Probable
//! variants are similar-looking capitalised words, offered for human review,
//! not flagged as errors. POV and tense figures are token densities, not
//! syntactic analysis.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::Read;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::mechanics::quote_counts;
use crate::metrics::{round_to, safe_div};
use crate::segment::{words, Document, Sentence};

static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:[01]?\d|2[0-3]):[0-5]\d\b|\b(?:[1-9]|1[0-2])\s?(?:[ap]m\b|[ap]\.m\.)")
        .unwrap()
});

static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[/-]\d{1,2}(?:[/-]\d{2,4})?\b").unwrap());

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

const RELATIVE_DAYS: &[&str] = &[
    "yesterday", "today", "tonight", "tomorrow", "this morning", "this afternoon",
    "this evening", "last night",
];

static RELATIVE_DAY_RES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    RELATIVE_DAYS
        .iter()
        .map(|p| (*p, Regex::new(&format!(r"(?i)\b{}\b", regex::escape(p))).unwrap()))
        .collect()
});

static FIRST_PERSON: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["i", "me", "my", "mine", "we", "us", "our", "ours"].into_iter().collect());

static SECOND_PERSON: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["you", "your", "yours"].into_iter().collect());

/// Third-person pronouns; also the set used for the ambiguity heuristic.
static THIRD_PERSON: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "he", "she", "they", "him", "her", "them", "his", "hers", "theirs", "it", "its",
    ]
    .into_iter()
    .collect()
});

static PRESENT_AUX: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
        "does", "did",
    ]
    .into_iter()
    .collect()
});

const AMBIGUOUS_PRONOUN_MIN: usize = 3;

// ---------------------------------------------------------------------------
// Canon
// ---------------------------------------------------------------------------

/// A canonical name and the spellings accepted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Entries stay untyped so one malformed entry cannot reject the file.
#[derive(Debug, Deserialize)]
struct CanonFile {
    #[serde(default)]
    canon: Vec<Value>,
}

/// Canonical name to alias set, the name itself included.
///
/// Aliases are kept once per case-insensitive spelling, since matching is
/// case-insensitive. Empty names and aliases are skipped with a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Canon {
    entries: BTreeMap<String, Vec<String>>,
}

impl Canon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn aliases(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Every accepted spelling across all entries, names included.
    pub fn spellings(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.values().flatten().map(String::as_str)
    }

    pub fn insert<'a>(&mut self, name: &str, aliases: impl IntoIterator<Item = &'a str>) {
        let name = name.trim();
        if name.is_empty() {
            tracing::warn!("skipping canon entry with empty name");
            return;
        }
        let slot = self.entries.entry(name.to_string()).or_default();
        push_alias(slot, name);
        for alias in aliases {
            let alias = alias.trim();
            if alias.is_empty() {
                tracing::warn!(canon = name, "skipping empty alias");
                continue;
            }
            push_alias(slot, alias);
        }
    }

    /// Comma-separated names, each its own entry.
    pub fn add_inline(&mut self, names: &str) {
        for name in names.split(',').filter(|n| !n.trim().is_empty()) {
            self.insert(name, []);
        }
    }

    /// `{"canon": [{"name": "Thea", "aliases": ["Theia"]}]}`
    ///
    /// Entries without a string `name` and non-string aliases are skipped
    /// with a warning; the rest of the file still loads.
    pub fn add_json_str(&mut self, json: &str) -> Result<()> {
        let file: CanonFile = serde_json::from_str(json)?;
        for (i, entry) in file.canon.iter().enumerate() {
            let Some(name) = entry.get("name").and_then(Value::as_str) else {
                tracing::warn!(entry = i, "skipping canon entry without a string name");
                continue;
            };
            let aliases: Vec<&str> = match entry.get("aliases") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|item| {
                        let alias = item.as_str();
                        if alias.is_none() {
                            tracing::warn!(canon = name, %item, "skipping non-string alias");
                        }
                        alias
                    })
                    .collect(),
                Some(other) => {
                    tracing::warn!(canon = name, %other, "aliases is not a list; ignoring");
                    Vec::new()
                }
            };
            self.insert(name, aliases);
        }
        Ok(())
    }

    /// Every non-empty CSV cell becomes its own canonical entry.
    pub fn add_csv_reader<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        for record in rdr.records() {
            let record = record?;
            for cell in record.iter().filter(|c| !c.trim().is_empty()) {
                self.insert(cell, []);
            }
        }
        Ok(())
    }

    pub fn load_json_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        self.add_json_str(&content)
    }

    pub fn load_csv_file(&mut self, path: &Path) -> Result<()> {
        let file = std::fs::File::open(path)?;
        self.add_csv_reader(file)
    }
}

impl FromIterator<CanonEntry> for Canon {
    fn from_iter<I: IntoIterator<Item = CanonEntry>>(iter: I) -> Self {
        let mut canon = Canon::new();
        for entry in iter {
            canon.insert(&entry.name, entry.aliases.iter().map(String::as_str));
        }
        canon
    }
}

fn push_alias(slot: &mut Vec<String>, alias: &str) {
    let folded = alias.to_lowercase();
    if !slot.iter().any(|a| a.to_lowercase() == folded) {
        slot.push(alias.to_string());
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonHits {
    pub total: usize,
    /// Only aliases that occurred.
    pub aliases: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantPair {
    pub a: String,
    pub b: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeMarkers {
    pub weekdays: Vec<String>,
    pub months: Vec<String>,
    pub relative: Vec<String>,
    pub times: Vec<String>,
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PronounAmbiguity {
    pub ambiguous_sentences: usize,
    pub max_pronoun_led_run: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PovTense {
    pub first_person_ratio: f64,
    pub second_person_ratio: f64,
    pub third_person_ratio: f64,
    pub past_ed_ratio: f64,
    pub present_aux_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinuityReport {
    /// Only canonical names that occurred.
    pub canon: BTreeMap<String, CanonHits>,
    pub probable_variants: Vec<VariantPair>,
    pub hyphenation_pairs: Vec<(String, String)>,
    pub time_markers: TimeMarkers,
    pub pronouns: PronounAmbiguity,
    pub pov_tense: PovTense,
    pub straight_quotes: usize,
    pub curly_quotes: usize,
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Multi-word aliases match on word boundaries; single words by token equality.
pub fn match_canon(text: &str, lower_tokens: &[String], canon: &Canon) -> BTreeMap<String, CanonHits> {
    let mut out = BTreeMap::new();
    for (name, aliases) in &canon.entries {
        let mut hits = BTreeMap::new();
        for alias in aliases {
            let n = if alias.contains(char::is_whitespace) {
                count_phrase(text, alias)
            } else {
                let needle = alias.to_lowercase();
                lower_tokens.iter().filter(|t| **t == needle).count()
            };
            if n > 0 {
                hits.insert(alias.clone(), n);
            }
        }
        let total: usize = hits.values().sum();
        if total > 0 {
            out.insert(name.clone(), CanonHits { total, aliases: hits });
        }
    }
    out
}

fn count_phrase(text: &str, phrase: &str) -> usize {
    let pattern = format!(r"\b{}\b", regex::escape(phrase));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.find_iter(text).count(),
        Err(err) => {
            tracing::warn!(alias = phrase, %err, "alias pattern rejected");
            0
        }
    }
}

/// Pairs of similar words sharing a first letter.
///
/// Similarity is normalised Levenshtein on lower-cased forms, in `0..=1`.
/// Bucketing by first letter keeps comparisons cheap; pairs that differ only
/// in case are skipped.
pub fn probable_variants(candidates: &[&str], min_len: usize, cutoff: f64) -> Vec<VariantPair> {
    let unique: BTreeSet<&str> = candidates
        .iter()
        .copied()
        .filter(|t| t.chars().count() >= min_len)
        .collect();

    let mut buckets: BTreeMap<char, Vec<&str>> = BTreeMap::new();
    for t in unique {
        if let Some(first) = t.chars().next() {
            buckets.entry(first.to_ascii_lowercase()).or_default().push(t);
        }
    }

    let mut pairs = Vec::new();
    for bucket in buckets.values() {
        for (i, a) in bucket.iter().enumerate() {
            let a_low = a.to_lowercase();
            for b in &bucket[i + 1..] {
                let b_low = b.to_lowercase();
                if a_low == b_low {
                    continue;
                }
                let score = strsim::normalized_levenshtein(&a_low, &b_low);
                if score >= cutoff {
                    pairs.push(VariantPair {
                        a: a.to_string(),
                        b: b.to_string(),
                        similarity: round_to(score, 3),
                    });
                }
            }
        }
    }
    pairs
}

/// Words seen both hyphenated and closed up, e.g. `e-mail` and `email`.
pub fn hyphenation_pairs(lower_tokens: &[String]) -> Vec<(String, String)> {
    let seen: HashSet<&str> = lower_tokens.iter().map(String::as_str).collect();
    let pairs: BTreeSet<(String, String)> = seen
        .iter()
        .filter(|w| w.contains('-'))
        .filter_map(|w| {
            let closed = w.replace('-', "");
            seen.contains(closed.as_str()).then(|| (w.to_string(), closed))
        })
        .collect();
    pairs.into_iter().collect()
}

pub fn time_markers(text: &str, lower_tokens: &[String]) -> TimeMarkers {
    let seen: HashSet<&str> = lower_tokens.iter().map(String::as_str).collect();
    let present = |list: &[&str]| -> Vec<String> {
        let mut found: Vec<String> = list
            .iter()
            .filter(|w| seen.contains(*w))
            .map(|w| w.to_string())
            .collect();
        found.sort();
        found
    };
    let mut relative: Vec<String> = RELATIVE_DAY_RES
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(p, _)| p.to_string())
        .collect();
    relative.sort();

    TimeMarkers {
        weekdays: present(WEEKDAYS),
        months: present(MONTHS),
        relative,
        times: TIME_RE.find_iter(text).map(|m| m.as_str().to_string()).collect(),
        dates: DATE_RE.find_iter(text).map(|m| m.as_str().to_string()).collect(),
    }
}

/// A sentence is ambiguous with three or more pronouns and no capitalised word.
pub fn pronoun_ambiguity(sentences: &[Sentence]) -> PronounAmbiguity {
    let mut ambiguous = 0;
    let mut max_run = 0;
    let mut run = 0;
    for sentence in sentences {
        let toks = words(&sentence.text);
        let capitalised = toks
            .iter()
            .any(|t| t.chars().next().is_some_and(char::is_uppercase));
        let lower: Vec<String> = toks.iter().map(|t| t.to_lowercase()).collect();
        let pronouns = lower
            .iter()
            .filter(|t| THIRD_PERSON.contains(t.as_str()))
            .count();

        if pronouns >= AMBIGUOUS_PRONOUN_MIN && !capitalised {
            ambiguous += 1;
        }

        if lower.first().is_some_and(|t| THIRD_PERSON.contains(t.as_str())) {
            run += 1;
            max_run = max_run.max(run);
        } else {
            run = 0;
        }
    }
    PronounAmbiguity {
        ambiguous_sentences: ambiguous,
        max_pronoun_led_run: max_run,
    }
}

pub fn pov_and_tense(lower_tokens: &[String]) -> PovTense {
    let total = lower_tokens.len().max(1) as f64;
    let ratio = |pred: &dyn Fn(&str) -> bool| {
        let n = lower_tokens.iter().filter(|t| pred(t.as_str())).count();
        round_to(safe_div(n as f64, total), 3)
    };
    PovTense {
        first_person_ratio: ratio(&|t| FIRST_PERSON.contains(t)),
        second_person_ratio: ratio(&|t| SECOND_PERSON.contains(t)),
        third_person_ratio: ratio(&|t| THIRD_PERSON.contains(t)),
        past_ed_ratio: ratio(&|t| t.len() > 3 && t.ends_with("ed")),
        present_aux_ratio: ratio(&|t| PRESENT_AUX.contains(t)),
    }
}

#[tracing::instrument(skip_all, fields(canon = canon.len()))]
pub fn analyze_continuity(
    doc: &Document,
    canon: &Canon,
    min_len: usize,
    cutoff: f64,
) -> ContinuityReport {
    let text = doc.text();
    let original = doc.words();
    let lower = doc.tokens();

    let capitalised: Vec<&str> = original
        .iter()
        .copied()
        .filter(|t| t.chars().next().is_some_and(char::is_uppercase))
        .collect();

    let (straight_quotes, curly_quotes) = quote_counts(text);

    ContinuityReport {
        canon: match_canon(text, &lower, canon),
        probable_variants: probable_variants(&capitalised, min_len, cutoff),
        hyphenation_pairs: hyphenation_pairs(&lower),
        time_markers: time_markers(text, &lower),
        pronouns: pronoun_ambiguity(doc.sentences()),
        pov_tense: pov_and_tense(&lower),
        straight_quotes,
        curly_quotes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::tokens;

    #[test]
    fn single_edit_variant_above_cutoff() {
        let pairs = probable_variants(&["Katherine", "Katharine"], 3, 0.88);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].similarity, 0.889);
    }

    #[test]
    fn short_single_edit_variant() {
        let pairs = probable_variants(&["Thea", "Thia"], 3, 0.75);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].a.as_str(), pairs[0].b.as_str()), ("Thea", "Thia"));
    }

    #[test]
    fn unrelated_names_are_not_variants() {
        assert!(probable_variants(&["Thea", "John"], 3, 0.0).is_empty());
        assert!(probable_variants(&["Thea", "Tomb"], 3, 0.88).is_empty());
    }

    #[test]
    fn case_only_differences_are_skipped() {
        assert!(probable_variants(&["Thea", "THEA"], 3, 0.5).is_empty());
    }

    #[test]
    fn canon_counts_aliases_case_insensitively() {
        let mut canon = Canon::new();
        canon.insert("Thea", ["Theia", "thea", ""]);
        canon.insert("Blackwood Inn", []);
        let text = "Thea met theia at the blackwood inn. THEA left the Blackwood Inn.";
        let hits = match_canon(text, &tokens(text), &canon);
        assert_eq!(hits["Thea"].total, 3);
        assert_eq!(hits["Thea"].aliases["Thea"], 2);
        assert_eq!(hits["Thea"].aliases["Theia"], 1);
        assert_eq!(hits["Blackwood Inn"].total, 2);
    }

    #[test]
    fn canon_skips_empty_names() {
        let mut canon = Canon::new();
        canon.add_inline("Thea, , Enid,");
        assert_eq!(canon.len(), 2);
        canon.insert("   ", ["x"]);
        assert_eq!(canon.len(), 2);
    }

    #[test]
    fn canon_from_json() {
        let mut canon = Canon::new();
        canon
            .add_json_str(r#"{"canon":[{"name":"Thea","aliases":["Theia"]},{"name":""}]}"#)
            .unwrap();
        assert_eq!(canon.len(), 1);
        assert_eq!(canon.aliases("Thea").unwrap(), ["Thea", "Theia"]);
    }

    #[test]
    fn canon_json_skips_malformed_entries() {
        let mut canon = Canon::new();
        canon
            .add_json_str(r#"{"canon":[{"aliases":["Theia"]},{"name":"Thea"},{"name":7}]}"#)
            .unwrap();
        assert_eq!(canon.len(), 1);
        assert_eq!(canon.aliases("Thea").unwrap(), ["Thea"]);

        let mut canon = Canon::new();
        canon
            .add_json_str(
                r#"{"canon":[{"name":"Thea","aliases":["Theia",null,3]},{"name":"Enid","aliases":"Eni"}]}"#,
            )
            .unwrap();
        assert_eq!(canon.len(), 2);
        assert_eq!(canon.aliases("Thea").unwrap(), ["Thea", "Theia"]);
        assert_eq!(canon.aliases("Enid").unwrap(), ["Enid"]);
    }

    #[test]
    fn canon_json_must_still_be_json() {
        assert!(Canon::new().add_json_str("{canon: [").is_err());
    }

    #[test]
    fn non_ascii_case_variants_count_once() {
        let mut canon = Canon::new();
        canon.insert("Caf\u{e9} Noir", ["CAF\u{c9} NOIR", "caf\u{e9} noir"]);
        assert_eq!(canon.aliases("Caf\u{e9} Noir").unwrap().len(), 1);
        let text = "We met at Caf\u{e9} Noir. Later, CAF\u{c9} NOIR closed.";
        let hits = match_canon(text, &tokens(text), &canon);
        assert_eq!(hits["Caf\u{e9} Noir"].total, 2);
    }

    #[test]
    fn canon_from_csv_rows() {
        let mut canon = Canon::new();
        canon.add_csv_reader("Thea,Enid\nDeclan,,\n".as_bytes()).unwrap();
        assert_eq!(canon.len(), 3);
    }

    #[test]
    fn hyphenation_variants() {
        let t = tokens("Send an e-mail. I sent the email. Co-op.");
        assert_eq!(
            hyphenation_pairs(&t),
            vec![("e-mail".to_string(), "email".to_string())]
        );
    }

    #[test]
    fn time_and_date_markers() {
        let text = "On Monday at 10:30 she left; by 3 pm tomorrow, on 4/12, she was gone. Maybe in May.";
        let m = time_markers(text, &tokens(text));
        assert_eq!(m.weekdays, vec!["monday"]);
        assert_eq!(m.months, vec!["may"]);
        assert_eq!(m.relative, vec!["tomorrow"]);
        assert_eq!(m.times, vec!["10:30", "3 pm"]);
        assert_eq!(m.dates, vec!["4/12"]);
    }

    #[test]
    fn pronoun_heavy_sentences() {
        let doc = Document::new("he told her that it was his. He ran. She hid. Thea waited.");
        let p = pronoun_ambiguity(doc.sentences());
        assert_eq!(p.ambiguous_sentences, 1);
        assert_eq!(p.max_pronoun_led_run, 3);
    }

    #[test]
    fn pov_ratios() {
        let t = tokens("I walked and you talked while she laughed");
        let p = pov_and_tense(&t);
        assert_eq!(p.first_person_ratio, 0.125);
        assert_eq!(p.second_person_ratio, 0.125);
        assert_eq!(p.third_person_ratio, 0.125);
        assert_eq!(p.past_ed_ratio, 0.375);
    }

    #[test]
    fn empty_document_ratios_are_zero() {
        let report = analyze_continuity(&Document::new(""), &Canon::new(), 3, 0.88);
        assert_eq!(report.pov_tense.first_person_ratio, 0.0);
        assert!(report.probable_variants.is_empty());
        assert!(report.canon.is_empty());
    }
}
