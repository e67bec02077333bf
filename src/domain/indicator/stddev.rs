//! Standard Deviation indicator.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) positions hold the placeholder.
//!
//! Computed from running sums of d and d^2 with d = x - K for a fixed
//! pivot K (the first price): var = E[d^2] - E[d]^2. Shifting keeps the
//! rounding error proportional to the price spread, not the price level,
//! and makes windows equal to the pivot exactly 0.

use crate::domain::indicator::WARMUP_PLACEHOLDER;

pub fn calculate_stddev(prices: &[f64], period: usize) -> Vec<f64> {
    let mut values = vec![WARMUP_PLACEHOLDER; prices.len()];
    if period == 0 || prices.len() < period {
        return values;
    }

    let pivot = prices[0];
    let n = period as f64;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;

    for (i, &price) in prices.iter().enumerate() {
        let d = price - pivot;
        sum += d;
        sum_sq += d * d;
        if i >= period {
            let leaving = prices[i - period] - pivot;
            sum -= leaving;
            sum_sq -= leaving * leaving;
        }
        if i + 1 >= period {
            let mean = sum / n;
            // rounding can still leave a tiny negative residue
            let variance = (sum_sq / n - mean * mean).max(0.0);
            values[i] = variance.sqrt();
        }
    }

    values
}
