//! Lexicon-based valence and emotion arcs.
//!
//! Each sentence gets a signed valence (positive hits minus negative hits)
//! and a count per emotion category. Rolling averages turn those per-sentence
//! scores into trendlines. Good for arcs, not for diagnosis.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::lexicon::{Emotion, EmotionCounts, NEGATIVE, POSITIVE};
use crate::metrics::round_to;
use crate::rolling::rolling;
use crate::segment::{tokens, Sentence};

const TOP_EMOTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceScore {
    pub index: usize,
    pub text: String,
    pub valence_raw: i32,
    pub emotions: EmotionCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcSummary {
    pub sentences: usize,
    pub avg_valence: f64,
    /// Ranked by total count; ties keep category order.
    pub top_emotions: Vec<Emotion>,
}

/// Highest rolling value for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionPeak {
    pub value: f64,
    /// First sentence reaching the peak; `None` when the category never fires.
    pub sentence_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionArc {
    pub window: usize,
    pub summary: ArcSummary,
    pub scores: Vec<SentenceScore>,
    pub valence_rolling: Vec<f64>,
    /// One series per category, each as long as `scores`.
    pub emotions_rolling: BTreeMap<Emotion, Vec<f64>>,
    pub peaks: BTreeMap<Emotion, EmotionPeak>,
}

pub fn score_sentence(index: usize, text: &str) -> SentenceScore {
    let toks = tokens(text);
    let mut valence: i32 = 0;
    let mut emotions = EmotionCounts::default();
    for tok in &toks {
        let t = tok.as_str();
        if POSITIVE.contains(t) {
            valence += 1;
        }
        if NEGATIVE.contains(t) {
            valence -= 1;
        }
        for emotion in Emotion::ALL {
            if emotion.words().contains(t) {
                emotions.add(emotion, 1);
            }
        }
    }
    SentenceScore {
        index,
        text: text.to_string(),
        valence_raw: valence,
        emotions,
    }
}

#[tracing::instrument(skip_all, fields(sentences = sentences.len(), window = window))]
pub fn analyze_emotion_arc(sentences: &[Sentence], window: usize) -> EmotionArc {
    let scores: Vec<SentenceScore> = sentences
        .iter()
        .map(|s| score_sentence(s.index, &s.text))
        .collect();

    let valence: Vec<f64> = scores.iter().map(|s| f64::from(s.valence_raw)).collect();
    let valence_rolling = rolling(&valence, window);

    let mut totals = EmotionCounts::default();
    let mut emotions_rolling = BTreeMap::new();
    for emotion in Emotion::ALL {
        let series: Vec<f64> = scores
            .iter()
            .map(|s| f64::from(s.emotions.get(emotion)))
            .collect();
        totals.add(emotion, scores.iter().map(|s| s.emotions.get(emotion)).sum());
        emotions_rolling.insert(emotion, rolling(&series, window));
    }

    let peaks = emotions_rolling
        .iter()
        .map(|(&emotion, series)| (emotion, peak_of(series)))
        .collect();

    let avg_valence = if valence.is_empty() {
        0.0
    } else {
        round_to(valence.iter().sum::<f64>() / valence.len() as f64, 2)
    };

    EmotionArc {
        window,
        summary: ArcSummary {
            sentences: scores.len(),
            avg_valence,
            top_emotions: top_emotions(&totals, !scores.is_empty()),
        },
        scores,
        valence_rolling,
        emotions_rolling,
        peaks,
    }
}

fn top_emotions(totals: &EmotionCounts, any_sentences: bool) -> Vec<Emotion> {
    if !any_sentences {
        return Vec::new();
    }
    let mut ranked: Vec<(Emotion, u32)> = totals.iter().collect();
    // Stable sort keeps category order among ties.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(TOP_EMOTIONS)
        .map(|(e, _)| e)
        .collect()
}

fn peak_of(series: &[f64]) -> EmotionPeak {
    let value = series.iter().cloned().fold(0.0, f64::max);
    let sentence_index = if value > 0.0 {
        series.iter().position(|&v| v == value)
    } else {
        None
    };
    EmotionPeak {
        value,
        sentence_index,
    }
}
