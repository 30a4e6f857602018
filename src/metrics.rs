//! Deterministic numeric helpers shared by the scorers.

use std::collections::HashMap;
use std::hash::Hash;

/// Round to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// `numer / denom`, or `0.0` when the denominator is zero.
pub fn safe_div(numer: f64, denom: f64) -> f64 {
    if denom == 0.0 {
        0.0
    } else {
        numer / denom
    }
}

/// Occurrences per 1000 words, two decimals.
pub fn per_1k(count: usize, total_words: usize) -> f64 {
    round_to(safe_div(count as f64 * 1000.0, total_words as f64), 2)
}

/// Occurrences per 100 words, two decimals.
pub fn per_100(count: usize, total_words: usize) -> f64 {
    round_to(safe_div(count as f64 * 100.0, total_words as f64), 2)
}

/// Count items, keeping first-seen order for the tie-break.
pub fn count_ordered<K, I>(items: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, usize)> = Vec::new();
    for item in items {
        match slots.get(&item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slots.insert(item.clone(), counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts
}

/// The `n` most common items, count descending, first-seen order among ties.
pub fn most_common<K, I>(items: I, n: usize) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut counts = count_ordered(items);
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

/// Population statistics over sentence lengths.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct LengthStats {
    pub avg: f64,
    pub median: f64,
    pub min: usize,
    pub max: usize,
    pub stdev: f64,
    /// Share at or under the short bound (seven words for sentences).
    pub very_short_ratio: f64,
    /// Share at or over the long bound (25 words for sentences).
    pub very_long_ratio: f64,
}

impl LengthStats {
    pub fn from_lengths(lengths: &[usize]) -> Self {
        Self::with_bounds(lengths, 7, 25)
    }

    /// Same statistics with caller-chosen very-short and very-long bounds.
    pub fn with_bounds(lengths: &[usize], short: usize, long: usize) -> Self {
        if lengths.is_empty() {
            return Self::default();
        }
        let n = lengths.len() as f64;
        let mean = lengths.iter().sum::<usize>() as f64 / n;
        let variance = lengths
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>()
            / n;

        let mut sorted = lengths.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
        } else {
            sorted[mid] as f64
        };

        Self {
            avg: round_to(mean, 2),
            median: round_to(median, 2),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            stdev: round_to(variance.sqrt(), 2),
            very_short_ratio: round_to(lengths.iter().filter(|&&x| x <= short).count() as f64 / n, 3),
            very_long_ratio: round_to(lengths.iter().filter(|&&x| x >= long).count() as f64 / n, 3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_expected_precision() {
        assert_eq!(round_to(12.34567, 2), 12.35);
        assert_eq!(round_to(12.34567, 3), 12.346);
    }

    #[test]
    fn guards_divide_by_zero() {
        assert_eq!(safe_div(5.0, 0.0), 0.0);
        assert_eq!(per_1k(3, 0), 0.0);
        assert_eq!(per_1k(3, 1500), 2.0);
    }

    #[test]
    fn most_common_breaks_ties_by_first_seen() {
        let top = most_common(["b", "a", "b", "c", "a"], 2);
        assert_eq!(top, vec![("b", 2), ("a", 2)]);
    }

    #[test]
    fn length_stats() {
        let stats = LengthStats::from_lengths(&[2, 4, 30, 8]);
        assert_eq!(stats.avg, 11.0);
        assert_eq!(stats.median, 6.0);
        assert_eq!(stats.min, 2);
        assert_eq!(stats.max, 30);
        assert_eq!(stats.very_short_ratio, 0.5);
        assert_eq!(stats.very_long_ratio, 0.25);
    }

    #[test]
    fn empty_length_stats_are_zero() {
        assert_eq!(LengthStats::from_lengths(&[]), LengthStats::default());
    }
}
