use crate::window::RollingWindow;
use crate::IndicatorStrategy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tilib_core::{IndicatorError, Reading};

/// Bollinger Bands.
///
/// Middle band is the window mean; the outer bands sit `num_std`
/// population standard deviations either side of it.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    len: usize,
    num_std: Decimal,
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BollingerOutput {
    pub upper: Decimal,
    pub middle: Decimal,
    pub lower: Decimal,
    pub bandwidth: Decimal,
}

impl BollingerBands {
    pub fn new(period: usize, num_std_dev: Decimal) -> Result<Self, IndicatorError> {
        let len = IndicatorError::check_period("Bollinger", "period", period)?;
        if num_std_dev < Decimal::ZERO {
            return Err(IndicatorError::InvalidParameter {
                indicator: "Bollinger",
                name: "num_std",
                reason: format!("must be >= 0, got {num_std_dev}"),
            });
        }
        Ok(Self {
            len,
            num_std: num_std_dev,
        })
    }

    /// Standard Bollinger Bands (20, 2).
    pub fn default_periods() -> Self {
        Self {
            len: 20,
            num_std: Decimal::TWO,
        }
    }

    /// Population standard deviation of the window around `mean`.
    fn std_dev(window: &RollingWindow<Decimal>, mean: Decimal) -> Decimal {
        if window.len() < 2 {
            return Decimal::ZERO;
        }
        let variance: Decimal = window
            .iter()
            .map(|v| {
                let diff = *v - mean;
                diff * diff
            })
            .sum::<Decimal>()
            / Decimal::from(window.len());

        decimal_sqrt(variance)
    }
}

impl IndicatorStrategy for BollingerBands {
    type Input = Decimal;
    type Output = BollingerOutput;

    fn name(&self) -> &'static str {
        "Bollinger"
    }

    fn window_capacity(&self) -> usize {
        self.len
    }

    fn period(&self) -> usize {
        self.len
    }

    fn recompute(&self, window: &RollingWindow<Decimal>) -> Option<Reading<BollingerOutput>> {
        if window.len() < self.len {
            return None;
        }
        let middle = window.mean()?;
        let offset = self.num_std * Self::std_dev(window, middle);
        Some(Reading::Value(BollingerOutput {
            upper: middle + offset,
            middle,
            lower: middle - offset,
            bandwidth: offset * Decimal::TWO,
        }))
    }
}

/// Newton's method square root for Decimal.
pub fn decimal_sqrt(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let mut guess = if value > Decimal::ONE {
        value / Decimal::TWO
    } else {
        Decimal::ONE
    };
    let epsilon = Decimal::new(1, 20);
    for _ in 0..200 {
        let next_guess = (guess + value / guess) / Decimal::TWO;
        let diff = (next_guess - guess).abs();
        guess = next_guess;
        if diff < epsilon {
            break;
        }
    }
    guess
}
