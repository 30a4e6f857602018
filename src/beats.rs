//! Narrative beat candidates.
//!
//! Each beat has a cue-word list and a window of relative document position
//! where it usually lands. A sentence scores by cue hits, nudged up the closer
//! it sits to the centre of the beat's window. Candidates, not verdicts.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::metrics::round_to;
use crate::segment::{tokens, Sentence};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Beat {
    Setup,
    Inciting,
    Rising,
    Midpoint,
    CrisisClimax,
    ResolutionHook,
}

impl Beat {
    pub const ALL: [Beat; 6] = [
        Beat::Setup,
        Beat::Inciting,
        Beat::Rising,
        Beat::Midpoint,
        Beat::CrisisClimax,
        Beat::ResolutionHook,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Beat::Setup => "setup",
            Beat::Inciting => "inciting",
            Beat::Rising => "rising",
            Beat::Midpoint => "midpoint",
            Beat::CrisisClimax => "crisis_climax",
            Beat::ResolutionHook => "resolution_hook",
        }
    }

    pub fn cues(self) -> &'static [&'static str] {
        match self {
            Beat::Setup => &[
                "introduce", "arrive", "daily", "routine", "normal", "ordinary", "establish",
                "show", "meet",
            ],
            Beat::Inciting => &[
                "discover", "found", "missing", "murder", "accident", "message", "mysterious",
                "appears", "vanish", "dead", "call",
            ],
            Beat::Rising => &[
                "but", "however", "then", "complication", "obstacle", "because", "therefore",
                "after", "as", "meanwhile",
            ],
            Beat::Midpoint => &[
                "realize", "truth", "reveal", "shift", "decide", "commit", "point", "halfway",
                "now", "must",
            ],
            Beat::CrisisClimax => &[
                "confront", "fight", "chase", "corner", "trap", "choose", "risk", "sacrifice",
                "final", "climax", "explode", "collapse",
            ],
            Beat::ResolutionHook => &[
                "after", "finally", "at last", "quiet", "morning", "later", "return", "home",
                "resolve", "yet", "still", "until", "next",
            ],
        }
    }

    /// Relative position window `(lo, hi)`.
    pub fn window(self) -> (f64, f64) {
        match self {
            Beat::Setup => (0.0, 0.25),
            Beat::Inciting => (0.05, 0.35),
            Beat::Rising => (0.2, 0.7),
            Beat::Midpoint => (0.45, 0.55),
            Beat::CrisisClimax => (0.7, 0.95),
            Beat::ResolutionHook => (0.85, 1.01),
        }
    }
}

impl fmt::Display for Beat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BeatHit {
    pub index: usize,
    pub score: f64,
    pub reason: String,
    pub text: String,
}

/// 1.0 at the window centre, linear down to 0.1 at the edges, 0.5 outside.
pub fn position_weight(p: f64, lo: f64, hi: f64) -> f64 {
    if p < lo || p > hi {
        return 0.5;
    }
    let center = (lo + hi) / 2.0;
    let half = ((hi - lo) / 2.0).max(1e-9);
    (1.0 - (p - center).abs() / half).max(0.1)
}

/// Cue occurrences in a lower-cased token stream; phrases match as
/// consecutive tokens.
pub fn cue_hits(toks: &[String], cues: &[&str]) -> usize {
    cues.iter()
        .map(|cue| {
            let parts: Vec<&str> = cue.split(' ').collect();
            if parts.len() == 1 {
                toks.iter().filter(|t| t.as_str() == *cue).count()
            } else {
                toks.windows(parts.len())
                    .filter(|w| w.iter().zip(&parts).all(|(t, p)| t == p))
                    .count()
            }
        })
        .sum()
}

/// Top `top_k` candidate sentences per beat, best first.
///
/// Every beat key is present; a beat with no cue hits maps to an empty list.
#[tracing::instrument(skip_all, fields(sentences = sentences.len(), top_k = top_k))]
pub fn analyze_beats(sentences: &[Sentence], top_k: usize) -> BTreeMap<Beat, Vec<BeatHit>> {
    let n = sentences.len().max(1) as f64;
    let sentence_tokens: Vec<Vec<String>> = sentences.iter().map(|s| tokens(&s.text)).collect();

    Beat::ALL
        .into_iter()
        .map(|beat| {
            let (lo, hi) = beat.window();
            let mut hits: Vec<BeatHit> = sentences
                .iter()
                .zip(&sentence_tokens)
                .enumerate()
                .filter_map(|(i, (sentence, toks))| {
                    let count = cue_hits(toks, beat.cues());
                    if count == 0 {
                        return None;
                    }
                    let p = (i + 1) as f64 / n;
                    let w = position_weight(p, lo, hi);
                    Some(BeatHit {
                        index: sentence.index,
                        score: round_to(count as f64 * (0.6 + 0.4 * w), 3),
                        reason: format!("{count} cue(s), pos_weight={w:.2}"),
                        text: sentence.text.clone(),
                    })
                })
                .collect();
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(top_k);
            (beat, hits)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Document;
    use approx::assert_relative_eq;

    #[test]
    fn weight_shape() {
        assert_relative_eq!(position_weight(0.5, 0.45, 0.55), 1.0);
        assert_relative_eq!(position_weight(0.45, 0.45, 0.55), 0.1);
        assert_relative_eq!(position_weight(0.9, 0.45, 0.55), 0.5);
        assert_relative_eq!(position_weight(0.0, 0.45, 0.55), 0.5);
    }

    #[test]
    fn phrase_cues_match_consecutive_tokens() {
        let toks = tokens("At last, at the last moment, it ended.");
        assert_eq!(cue_hits(&toks, &["at last"]), 1);
        assert_eq!(cue_hits(&toks, &["last"]), 2);
    }

    #[test]
    fn early_setup_sentence_scores_near_peak() {
        let text = "We meet the ordinary family. A. B. C. D. E. F. G. H. I.";
        let doc = Document::new(text);
        assert_eq!(doc.sentences().len(), 10);
        let beats = analyze_beats(doc.sentences(), 3);
        let setup = &beats[&Beat::Setup];
        assert_eq!(setup.len(), 1);
        assert_eq!(setup[0].index, 0);
        assert_relative_eq!(setup[0].score, 1.84);
        assert_eq!(setup[0].reason, "2 cue(s), pos_weight=0.80");
    }

    #[test]
    fn keeps_top_k_best_first() {
        let text = "But then. But. But then however. Nothing here. But then.";
        let doc = Document::new(text);
        let beats = analyze_beats(doc.sentences(), 2);
        let rising = &beats[&Beat::Rising];
        assert_eq!(rising.len(), 2);
        assert_eq!(rising[0].index, 2);
        assert!(rising[0].score >= rising[1].score);
    }

    #[test]
    fn every_beat_present_when_empty() {
        let beats = analyze_beats(&[], 3);
        assert_eq!(beats.len(), Beat::ALL.len());
        assert!(beats.values().all(Vec::is_empty));
    }
}
