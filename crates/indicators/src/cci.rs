use crate::window::RollingWindow;
use crate::IndicatorStrategy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tilib_core::{Indeterminacy, IndicatorError, Reading};

/// Commodity Channel Index (CCI).
///
/// Fed typical prices (see `Hlc::typical_price`).
/// CCI = (tp - SMA(tp)) / (factor * mean deviation).
#[derive(Debug, Clone)]
pub struct Cci {
    len: usize,
    factor: Decimal,
}

impl Cci {
    pub fn new(period: usize, factor: Decimal) -> Result<Self, IndicatorError> {
        let len = IndicatorError::check_period("CCI", "period", period)?;
        if factor <= Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter {
                indicator: "CCI",
                name: "factor",
                reason: format!("must be > 0, got {factor}"),
            });
        }
        Ok(Self { len, factor })
    }

    /// Standard CCI (20, 0.015).
    pub fn default_periods() -> Self {
        Self {
            len: 20,
            factor: dec!(0.015),
        }
    }
}

impl IndicatorStrategy for Cci {
    type Input = Decimal;
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "CCI"
    }

    fn window_capacity(&self) -> usize {
        self.len
    }

    fn period(&self) -> usize {
        self.len
    }

    fn recompute(&self, window: &RollingWindow<Decimal>) -> Option<Reading<Decimal>> {
        if window.len() < self.len {
            return None;
        }
        let sma = window.mean()?;
        let latest = *window.latest()?;
        let mean_deviation =
            window.iter().map(|tp| (*tp - sma).abs()).sum::<Decimal>() / Decimal::from(window.len());

        if mean_deviation.is_zero() {
            return Some(Reading::Indeterminate(Indeterminacy::ZeroMeanDeviation));
        }
        Some(Reading::Value((latest - sma) / (self.factor * mean_deviation)))
    }
}
