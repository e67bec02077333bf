//! Configuration validation.
//!
//! Validates a fully merged [`StrategyConfig`] before a backtest runs.
//! Errors name the INI key the value would be read from, so the same
//! messages serve both command-line flags and config files.

use crate::domain::error::CrossbtError;
use crate::domain::strategy::StrategyConfig;

pub const STRATEGY_SECTION: &str = "strategy";

pub fn validate_strategy_config(config: &StrategyConfig) -> Result<(), CrossbtError> {
    validate_periods(config)?;
    validate_initial_capital(config)?;
    validate_risk_limits(config)?;
    validate_commission(config)?;
    validate_filter_params(config)?;
    Ok(())
}

fn invalid(key: &str, reason: impl Into<String>) -> CrossbtError {
    CrossbtError::ConfigInvalid {
        section: STRATEGY_SECTION.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_periods(config: &StrategyConfig) -> Result<(), CrossbtError> {
    if config.short_period == 0 {
        return Err(invalid("short_period", "short_period must be positive"));
    }
    if config.long_period == 0 {
        return Err(invalid("long_period", "long_period must be positive"));
    }
    if config.short_period >= config.long_period {
        return Err(invalid(
            "long_period",
            format!(
                "long_period ({}) must be greater than short_period ({})",
                config.long_period, config.short_period
            ),
        ));
    }
    Ok(())
}

fn validate_initial_capital(config: &StrategyConfig) -> Result<(), CrossbtError> {
    let value = config.initial_capital;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_limits(config: &StrategyConfig) -> Result<(), CrossbtError> {
    let stop_loss = config.stop_loss_pct;
    if !(0.0..1.0).contains(&stop_loss) {
        return Err(invalid(
            "stop_loss",
            "stop_loss must be a fraction in [0, 1)",
        ));
    }
    let take_profit = config.take_profit_pct;
    if !take_profit.is_finite() || take_profit < 0.0 {
        return Err(invalid("take_profit", "take_profit must be non-negative"));
    }
    Ok(())
}

fn validate_commission(config: &StrategyConfig) -> Result<(), CrossbtError> {
    if !(0.0..1.0).contains(&config.commission_rate) {
        return Err(invalid(
            "commission",
            "commission must be a fraction in [0, 1)",
        ));
    }
    Ok(())
}

/// Filter parameters are only checked when their filter is enabled.
fn validate_filter_params(config: &StrategyConfig) -> Result<(), CrossbtError> {
    if config.use_rsi && config.rsi_period == 0 {
        return Err(invalid("rsi_period", "rsi_period must be positive"));
    }
    if config.use_macd {
        if config.macd_fast == 0 || config.macd_signal == 0 {
            return Err(invalid(
                "macd_fast",
                "macd_fast and macd_signal must be positive",
            ));
        }
        if config.macd_fast >= config.macd_slow {
            return Err(invalid(
                "macd_slow",
                format!(
                    "macd_slow ({}) must be greater than macd_fast ({})",
                    config.macd_slow, config.macd_fast
                ),
            ));
        }
    }
    if config.use_bollinger {
        if config.bollinger_period == 0 {
            return Err(invalid(
                "bollinger_period",
                "bollinger_period must be positive",
            ));
        }
        if !config.bollinger_mult.is_finite() || config.bollinger_mult <= 0.0 {
            return Err(invalid(
                "bollinger_mult",
                "bollinger_mult must be positive",
            ));
        }
    }
    Ok(())
}
