use crate::window::RollingWindow;
use crate::IndicatorStrategy;
use rust_decimal::Decimal;
use tilib_core::{IndicatorError, Reading};

/// Simple Moving Average (SMA).
#[derive(Debug, Clone)]
pub struct Sma {
    len: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let len = IndicatorError::check_period("SMA", "period", period)?;
        Ok(Self { len })
    }

    /// Standard SMA (20).
    pub fn default_periods() -> Self {
        Self { len: 20 }
    }
}

impl IndicatorStrategy for Sma {
    type Input = Decimal;
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "SMA"
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
        window.mean().map(Reading::Value)
    }
}
