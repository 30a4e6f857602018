//! Lexical diversity estimators.
//!
//! Type-token ratios and their length-corrected variants, a forward-only MTLD
//! approximation, and a moving-window TTR profile.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::metrics::{round_to, safe_div};

static FUNCTION_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "if", "then", "else", "of", "to", "in", "on", "for",
        "with", "as", "at", "by", "from", "that", "this", "it", "is", "was", "were", "be", "been",
        "are", "am", "i", "you", "he", "she", "they", "we", "my", "your", "his", "her", "their",
        "our", "not", "no", "so", "do", "did", "does", "have", "has", "had", "there", "here",
        "when", "where", "why", "how", "what", "which", "who", "whom", "whose",
    ]
    .into_iter()
    .collect()
});

const MTLD_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiversityReport {
    pub tokens: usize,
    pub types: usize,
    pub hapax: usize,
    pub dis_legomena: usize,
    pub ttr: f64,
    pub root_ttr: f64,
    pub herdan_c: f64,
    pub maas_a: f64,
    pub mtld_approx: f64,
    pub window: usize,
    pub window_ttr_min: f64,
    pub window_ttr_avg: f64,
    pub window_ttr_max: f64,
    pub content_token_ratio: f64,
}

/// `(N, V, V1, V2)` for a token sequence.
pub fn type_token_stats(tokens: &[String]) -> (usize, usize, usize, usize) {
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for t in tokens {
        *freq.entry(t.as_str()).or_insert(0) += 1;
    }
    let hapax = freq.values().filter(|&&f| f == 1).count();
    let dis = freq.values().filter(|&&f| f == 2).count();
    (tokens.len(), freq.len(), hapax, dis)
}

pub fn ttr(types: usize, tokens: usize) -> f64 {
    safe_div(types as f64, tokens as f64)
}

/// Guiraud's R = V / sqrt(N).
pub fn root_ttr(types: usize, tokens: usize) -> f64 {
    safe_div(types as f64, (tokens.max(1) as f64).sqrt())
}

/// Herdan's C = ln V / ln N.
pub fn herdan_c(types: usize, tokens: usize) -> f64 {
    safe_div(ln_at_least_one(types), ln_at_least_one(tokens))
}

/// Maas's a = (ln N - ln V) / (ln N)^2.
pub fn maas_a(types: usize, tokens: usize) -> f64 {
    let ln_n = ln_at_least_one(tokens);
    safe_div(ln_n - ln_at_least_one(types), ln_n * ln_n)
}

fn ln_at_least_one(n: usize) -> f64 {
    (n.max(1) as f64).ln()
}

/// Forward-only MTLD approximation.
///
/// The canonical measure averages a forward and a backward pass; this walks
/// forward once. Each time the running TTR drops to `threshold` or below a
/// factor is counted and the running type set resets. The trailing segment
/// adds `(ttr - threshold) / (1 - threshold)` as a partial factor, kept as-is
/// so existing reports stay comparable.
pub fn mtld_forward(tokens: &[String], threshold: f64) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let mut factors = 0.0;
    let mut types: HashSet<&str> = HashSet::new();
    let mut count = 0usize;
    let mut running_ttr = 1.0;
    for t in tokens {
        count += 1;
        types.insert(t.as_str());
        running_ttr = types.len() as f64 / count as f64;
        if running_ttr <= threshold {
            factors += 1.0;
            types.clear();
            count = 0;
        }
    }
    if count > 0 {
        factors += safe_div(running_ttr - threshold, 1.0 - threshold);
    }
    tokens.len() as f64 / f64::max(factors, MTLD_EPSILON)
}

/// `distinct / window` at every offset.
///
/// A document shorter than the window gets a single whole-document TTR.
pub fn moving_window_ttr(tokens: &[String], window: usize) -> Vec<f64> {
    if window == 0 || tokens.is_empty() {
        return Vec::new();
    }
    if tokens.len() < window {
        let (n, v, _, _) = type_token_stats(tokens);
        return vec![ttr(v, n)];
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for t in &tokens[..window] {
        *counts.entry(t.as_str()).or_insert(0) += 1;
    }
    let mut out = Vec::with_capacity(tokens.len() - window + 1);
    out.push(counts.len() as f64 / window as f64);
    for i in window..tokens.len() {
        let old = tokens[i - window].as_str();
        if let Some(c) = counts.get_mut(old) {
            *c -= 1;
            if *c == 0 {
                counts.remove(old);
            }
        }
        *counts.entry(tokens[i].as_str()).or_insert(0) += 1;
        out.push(counts.len() as f64 / window as f64);
    }
    out
}

pub fn content_ratio(tokens: &[String]) -> f64 {
    let content = tokens
        .iter()
        .filter(|t| !FUNCTION_WORDS.contains(t.as_str()))
        .count();
    safe_div(content as f64, tokens.len() as f64)
}

#[tracing::instrument(skip_all, fields(tokens = tokens.len(), window = window))]
pub fn analyze_diversity(tokens: &[String], window: usize, mtld_threshold: f64) -> DiversityReport {
    let (n, v, v1, v2) = type_token_stats(tokens);
    let profile = moving_window_ttr(tokens, window);
    let (min, avg, max) = if profile.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        (
            profile.iter().cloned().fold(f64::INFINITY, f64::min),
            profile.iter().sum::<f64>() / profile.len() as f64,
            profile.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        )
    };

    DiversityReport {
        tokens: n,
        types: v,
        hapax: v1,
        dis_legomena: v2,
        ttr: round_to(ttr(v, n), 3),
        root_ttr: round_to(root_ttr(v, n), 3),
        herdan_c: round_to(herdan_c(v, n), 3),
        maas_a: round_to(maas_a(v, n), 3),
        mtld_approx: round_to(mtld_forward(tokens, mtld_threshold), 1),
        window,
        window_ttr_min: round_to(min, 3),
        window_ttr_avg: round_to(avg, 3),
        window_ttr_max: round_to(max, 3),
        content_token_ratio: round_to(content_ratio(tokens), 3),
    }
}
