use crate::window::RollingWindow;
use crate::IndicatorStrategy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tilib_core::{IndicatorError, Reading};

/// Exponential Moving Average (EMA).
///
/// The first value equals the first sample; afterwards
/// `ema = alpha * price + (1 - alpha) * prev`. There is no fixed window,
/// only the carried smoothed value.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: Decimal,
    current: Option<Decimal>,
}

impl Ema {
    pub fn new(alpha: Decimal) -> Result<Self, IndicatorError> {
        if alpha <= Decimal::ZERO || alpha > Decimal::ONE {
            return Err(IndicatorError::InvalidParameter {
                indicator: "EMA",
                name: "alpha",
                reason: format!("must be in (0, 1], got {alpha}"),
            });
        }
        Ok(Self {
            alpha,
            current: None,
        })
    }

    /// Smoothing factor `2 / (period + 1)`.
    pub fn from_period(period: usize) -> Result<Self, IndicatorError> {
        let period = IndicatorError::check_period("EMA", "period", period)?;
        Self::new(Decimal::TWO / (Decimal::from(period) + Decimal::ONE))
    }

    /// EMA with alpha = 0.2.
    pub fn default_periods() -> Self {
        Self {
            alpha: dec!(0.2),
            current: None,
        }
    }

    pub fn alpha(&self) -> Decimal {
        self.alpha
    }
}

impl IndicatorStrategy for Ema {
    type Input = Decimal;
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "EMA"
    }

    fn window_capacity(&self) -> usize {
        1
    }

    fn period(&self) -> usize {
        1
    }

    fn observe(&mut self, window: &RollingWindow<Decimal>, _evicted: Option<&Decimal>) {
        let Some(&price) = window.latest() else {
            return;
        };
        self.current = Some(match self.current {
            None => price,
            Some(prev) => self.alpha * price + (Decimal::ONE - self.alpha) * prev,
        });
    }

    fn ready(&self, _window: &RollingWindow<Decimal>) -> bool {
        self.current.is_some()
    }

    fn recompute(&self, _window: &RollingWindow<Decimal>) -> Option<Reading<Decimal>> {
        self.current.map(Reading::Value)
    }
}
