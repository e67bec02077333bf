//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = (C[i] - EMA[i-1]) * k + EMA[i-1].
//! Warmup: first (n-1) positions hold the placeholder.

use crate::domain::indicator::WARMUP_PLACEHOLDER;

pub fn calculate_ema(prices: &[f64], period: usize) -> Vec<f64> {
    let mut values = vec![WARMUP_PLACEHOLDER; prices.len()];
    if period == 0 || prices.len() < period {
        return values;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = prices[..period].iter().sum::<f64>() / period as f64;
    values[period - 1] = ema;

    for i in period..prices.len() {
        ema = (prices[i] - ema) * k + ema;
        values[i] = ema;
    }

    values
}
