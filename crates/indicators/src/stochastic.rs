use crate::window::RollingWindow;
use crate::{IndicatorSeries, IndicatorStrategy};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tilib_core::{Hlc, Indeterminacy, IndicatorError, Reading};

/// Stochastic Oscillator (%K and %D).
///
/// %K = (Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = mean of the last `smoothing_period` closes
///
/// A flat high/low range leaves %K indeterminate while %D is still reported.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    smoothing_period: usize,
    oversold: Decimal,
    overbought: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StochasticOutput {
    pub k: Reading<Decimal>,
    pub d: Decimal,
}

impl Stochastic {
    pub fn new(
        k_period: usize,
        smoothing_period: usize,
        oversold: Decimal,
        overbought: Decimal,
    ) -> Result<Self, IndicatorError> {
        IndicatorError::check_period("Stochastic", "period", k_period)?;
        IndicatorError::check_period("Stochastic", "smoothing_period", smoothing_period)?;
        if smoothing_period > k_period {
            return Err(IndicatorError::InvalidParameter {
                indicator: "Stochastic",
                name: "smoothing_period",
                reason: format!("{smoothing_period} exceeds period {k_period}"),
            });
        }
        if oversold < Decimal::ZERO || overbought > dec!(100) || oversold >= overbought {
            return Err(IndicatorError::InvalidParameter {
                indicator: "Stochastic",
                name: "thresholds",
                reason: format!(
                    "need 0 <= oversold < overbought <= 100, got {oversold} / {overbought}"
                ),
            });
        }
        Ok(Self {
            k_period,
            smoothing_period,
            oversold,
            overbought,
        })
    }

    /// Standard Stochastic (14, 3) with 20/80 thresholds.
    pub fn default_periods() -> Self {
        Self {
            k_period: 14,
            smoothing_period: 3,
            oversold: dec!(20),
            overbought: dec!(80),
        }
    }

    pub fn oversold(&self) -> Decimal {
        self.oversold
    }

    pub fn overbought(&self) -> Decimal {
        self.overbought
    }
}

impl IndicatorStrategy for Stochastic {
    type Input = Hlc;
    type Output = StochasticOutput;

    fn name(&self) -> &'static str {
        "Stochastic"
    }

    fn window_capacity(&self) -> usize {
        self.k_period
    }

    fn period(&self) -> usize {
        self.k_period
    }

    fn recompute(&self, window: &RollingWindow<Hlc>) -> Option<Reading<StochasticOutput>> {
        if window.len() < self.k_period {
            return None;
        }
        let highest = window.iter().map(|s| s.high).max()?;
        let lowest = window.iter().map(|s| s.low).min()?;
        let close = window.latest()?.close;

        let range = highest - lowest;
        let k = if range.is_zero() {
            Reading::Indeterminate(Indeterminacy::FlatRange)
        } else {
            Reading::Value(((close - lowest) / range) * dec!(100))
        };

        let d = window
            .last_n(self.smoothing_period)
            .map(|s| s.close)
            .sum::<Decimal>()
            / Decimal::from(self.smoothing_period);

        Some(Reading::Value(StochasticOutput { k, d }))
    }
}

impl IndicatorSeries<Stochastic> {
    /// `Some(true)` when %K is at or below the oversold threshold.
    pub fn is_oversold(&self) -> Option<bool> {
        self.percent_k().map(|k| k <= self.strategy().oversold())
    }

    /// `Some(true)` when %K is at or above the overbought threshold.
    pub fn is_overbought(&self) -> Option<bool> {
        self.percent_k().map(|k| k >= self.strategy().overbought())
    }

    /// Latest defined %K.
    pub fn percent_k(&self) -> Option<Decimal> {
        self.value().and_then(|o| o.k.value().copied())
    }
}
