use crate::rsi::{gain_loss, rsi_from_averages};
use crate::window::RollingWindow;
use crate::IndicatorStrategy;
use rust_decimal::Decimal;
use tilib_core::{Indeterminacy, IndicatorError, Reading};

/// Stochastic RSI (%K).
///
/// Each full price window of `period` prices yields one RSI (simple-mean seed
/// over the first `rsi_period` changes, Wilder smoothing for the rest). %K is
/// where the latest RSI sits within the min/max of the last `k_period` RSIs,
/// as a fraction in [0, 1].
#[derive(Debug, Clone)]
pub struct StochRsi {
    period: usize,
    rsi_period: usize,
    k_period: usize,
    rsi_values: RollingWindow<Decimal>,
}

impl StochRsi {
    pub fn new(period: usize, rsi_period: usize, k_period: usize) -> Result<Self, IndicatorError> {
        IndicatorError::check_period("StochRSI", "period", period)?;
        IndicatorError::check_period("StochRSI", "rsi_period", rsi_period)?;
        if k_period < 2 {
            return Err(IndicatorError::InvalidParameter {
                indicator: "StochRSI",
                name: "k_period",
                reason: format!("needs at least 2 RSI values for a range, got {k_period}"),
            });
        }
        if period <= rsi_period {
            return Err(IndicatorError::InvalidParameter {
                indicator: "StochRSI",
                name: "period",
                reason: format!("price period {period} must exceed rsi_period {rsi_period}"),
            });
        }
        Ok(Self {
            period,
            rsi_period,
            k_period,
            rsi_values: RollingWindow::new(k_period),
        })
    }

    /// StochRSI over 15 prices, RSI(14), %K over 14 RSIs.
    pub fn default_periods() -> Self {
        Self {
            period: 15,
            rsi_period: 14,
            k_period: 14,
            rsi_values: RollingWindow::new(14),
        }
    }

    /// The trailing RSI values %K is computed over, oldest first.
    pub fn rsi_values(&self) -> &RollingWindow<Decimal> {
        &self.rsi_values
    }

    fn wilder_rsi(&self, prices: &RollingWindow<Decimal>) -> Option<Decimal> {
        let mut changes = prices
            .iter()
            .zip(prices.iter().skip(1))
            .map(|(prev, next)| gain_loss(*next - *prev));

        let period_dec = Decimal::from(self.rsi_period);
        let (mut sum_gain, mut sum_loss) = (Decimal::ZERO, Decimal::ZERO);
        for _ in 0..self.rsi_period {
            let (gain, loss) = changes.next()?;
            sum_gain += gain;
            sum_loss += loss;
        }
        let mut avg_gain = sum_gain / period_dec;
        let mut avg_loss = sum_loss / period_dec;

        let carry = period_dec - Decimal::ONE;
        for (gain, loss) in changes {
            avg_gain = (avg_gain * carry + gain) / period_dec;
            avg_loss = (avg_loss * carry + loss) / period_dec;
        }
        Some(rsi_from_averages(avg_gain, avg_loss))
    }
}

impl IndicatorStrategy for StochRsi {
    type Input = Decimal;
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "StochRSI"
    }

    fn window_capacity(&self) -> usize {
        self.period
    }

    fn period(&self) -> usize {
        self.period + self.k_period - 1
    }

    fn observe(&mut self, window: &RollingWindow<Decimal>, _evicted: Option<&Decimal>) {
        if !window.is_full() {
            return;
        }
        if let Some(rsi) = self.wilder_rsi(window) {
            self.rsi_values.push(rsi);
        }
    }

    fn ready(&self, _window: &RollingWindow<Decimal>) -> bool {
        self.rsi_values.is_full()
    }

    fn recompute(&self, _window: &RollingWindow<Decimal>) -> Option<Reading<Decimal>> {
        if !self.rsi_values.is_full() {
            return None;
        }
        let rsi = *self.rsi_values.latest()?;
        let lowest = self.rsi_values.min()?;
        let highest = self.rsi_values.max()?;

        let range = highest - lowest;
        if range.is_zero() {
            return Some(Reading::Indeterminate(Indeterminacy::FlatRsiRange));
        }
        Some(Reading::Value((rsi - lowest) / range))
    }
}
