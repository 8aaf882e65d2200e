use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// One high/low/close observation, as consumed by ATR and the Stochastic Oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hlc {
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl Hlc {
    pub fn new(high: Decimal, low: Decimal, close: Decimal) -> Self {
        Self { high, low, close }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> Decimal {
        (self.high + self.low + self.close) / Decimal::from(3)
    }

    /// Zip parallel high/low/close columns into samples.
    ///
    /// The three columns must have the same length.
    pub fn zip_columns(
        indicator: &'static str,
        highs: &[Decimal],
        lows: &[Decimal],
        closes: &[Decimal],
    ) -> Result<Vec<Hlc>, IndicatorError> {
        if highs.len() != lows.len() || highs.len() != closes.len() {
            return Err(IndicatorError::MismatchedInputs {
                indicator,
                lengths: vec![highs.len(), lows.len(), closes.len()],
            });
        }
        Ok(highs
            .iter()
            .zip(lows)
            .zip(closes)
            .map(|((h, l), c)| Hlc::new(*h, *l, *c))
            .collect())
    }
}

/// One traded price with its volume and time, as consumed by VWAP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSample {
    pub price: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl VolumeSample {
    pub fn new(price: Decimal, volume: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            price,
            volume,
            timestamp,
        }
    }

    /// Zip parallel price/volume/timestamp columns into samples.
    pub fn zip_columns(
        indicator: &'static str,
        prices: &[Decimal],
        volumes: &[Decimal],
        timestamps: &[DateTime<Utc>],
    ) -> Result<Vec<VolumeSample>, IndicatorError> {
        if prices.len() != volumes.len() || prices.len() != timestamps.len() {
            return Err(IndicatorError::MismatchedInputs {
                indicator,
                lengths: vec![prices.len(), volumes.len(), timestamps.len()],
            });
        }
        Ok(prices
            .iter()
            .zip(volumes)
            .zip(timestamps)
            .map(|((p, v), t)| VolumeSample::new(*p, *v, *t))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// A single OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub instrument: String,
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    pub fn hlc(&self) -> Hlc {
        Hlc::new(self.high, self.low, self.close)
    }

    /// The bar's close traded at its full volume.
    pub fn volume_sample(&self) -> VolumeSample {
        VolumeSample::new(self.close, self.volume, self.timestamp)
    }
}
