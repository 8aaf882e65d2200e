use crate::window::RollingWindow;
use crate::IndicatorStrategy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tilib_core::{IndicatorError, Reading};

/// Relative Strength Index (RSI).
///
/// Simple averages of gains and losses over the trailing `period` price
/// changes, so the window holds `period + 1` prices.
#[derive(Debug, Clone)]
pub struct Rsi {
    len: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let len = IndicatorError::check_period("RSI", "period", period)?;
        Ok(Self { len })
    }

    /// Standard RSI (14).
    pub fn default_periods() -> Self {
        Self { len: 14 }
    }
}

/// Split a price change into (gain, loss), both non-negative.
pub(crate) fn gain_loss(change: Decimal) -> (Decimal, Decimal) {
    if change > Decimal::ZERO {
        (change, Decimal::ZERO)
    } else {
        (Decimal::ZERO, change.abs())
    }
}

/// `100 - 100 / (1 + avg_gain / avg_loss)`, with zero average loss pinned at 100.
pub(crate) fn rsi_from_averages(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() {
        return dec!(100);
    }
    let rs = avg_gain / avg_loss;
    dec!(100) - (dec!(100) / (Decimal::ONE + rs))
}

impl IndicatorStrategy for Rsi {
    type Input = Decimal;
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "RSI"
    }

    fn window_capacity(&self) -> usize {
        self.len + 1 // one extra price for the first change
    }

    fn period(&self) -> usize {
        self.len + 1
    }

    fn recompute(&self, window: &RollingWindow<Decimal>) -> Option<Reading<Decimal>> {
        if window.len() <= self.len {
            return None;
        }
        let (sum_gain, sum_loss) = window
            .iter()
            .zip(window.iter().skip(1))
            .map(|(prev, next)| gain_loss(*next - *prev))
            .fold((Decimal::ZERO, Decimal::ZERO), |(g, l), (gain, loss)| {
                (g + gain, l + loss)
            });

        let period_dec = Decimal::from(self.len);
        Some(Reading::Value(rsi_from_averages(
            sum_gain / period_dec,
            sum_loss / period_dec,
        )))
    }
}
