//! Rank statistics shared by the percentile engine and its consumers.

use std::cmp::Ordering;

/// Percentile assigned when a series holds exactly one observation.
pub const SINGLE_OBSERVATION_PERCENTILE: f64 = 50.0;

/// Compute 1-based fractional ranks of values.
///
/// Equal values receive the mean of the ranks they would occupy, so
/// `[1.0, 2.0, 2.0]` ranks as `[1.0, 2.5, 2.5]`. Ties are exact equality.
/// Input must be free of NaN; callers filter missing values first.
///
/// # Examples
///
/// ```
/// use vantage_traits::stats::fractional_ranks;
///
/// assert_eq!(fractional_ranks(&[3.0, 1.0, 2.0]), vec![3.0, 1.0, 2.0]);
/// assert_eq!(fractional_ranks(&[1.0, 2.0, 2.0]), vec![1.0, 2.5, 2.5]);
/// ```
pub fn fractional_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();

    // Sort positions by value; stable so ties keep input order
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
    });

    let mut ranks = vec![0.0; n];
    let mut i = 0;

    while i < n {
        let mut j = i + 1;
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }

        // Positions i..j share ranks i+1..=j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &pos in &order[i..j] {
            ranks[pos] = avg_rank;
        }

        i = j;
    }

    ranks
}

/// Map a 1-based rank among `n` observations to a percentile in `[0, 100]`.
///
/// `100 × (rank − 1) / (n − 1)`; a lone observation maps to
/// [`SINGLE_OBSERVATION_PERCENTILE`].
pub fn rank_to_percentile(rank: f64, n: usize) -> f64 {
    if n <= 1 {
        return SINGLE_OBSERVATION_PERCENTILE;
    }
    100.0 * (rank - 1.0) / (n - 1) as f64
}
