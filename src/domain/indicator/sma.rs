//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]), maintained with a running window sum.
//! Warmup: first (n-1) positions hold the placeholder. Fewer than n prices
//! yields an all-placeholder series.

use crate::domain::indicator::WARMUP_PLACEHOLDER;

pub fn calculate_sma(prices: &[f64], period: usize) -> Vec<f64> {
    let mut values = vec![WARMUP_PLACEHOLDER; prices.len()];
    if period == 0 || prices.len() < period {
        return values;
    }

    let mut sum: f64 = prices[..period].iter().sum();
    values[period - 1] = sum / period as f64;

    for i in period..prices.len() {
        sum = sum - prices[i - period] + prices[i];
        values[i] = sum / period as f64;
    }

    values
}
