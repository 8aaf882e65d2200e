//! Declarative indicator configuration and a bar-driven wrapper over the
//! nine concrete series types.

use crate::atr::Atr;
use crate::bollinger::BollingerBands;
use crate::cci::Cci;
use crate::ema::Ema;
use crate::rsi::Rsi;
use crate::sma::Sma;
use crate::stoch_rsi::StochRsi;
use crate::stochastic::Stochastic;
use crate::vwap::Vwap;
use crate::{IndicatorSeries, SeriesPhase};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tilib_core::{Bar, IndicatorError};

/// One indicator and its parameters, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorConfig {
    Sma(SmaConfig),
    Ema(EmaConfig),
    Rsi(RsiConfig),
    Bollinger(BollingerConfig),
    Cci(CciConfig),
    Atr(AtrConfig),
    Stochastic(StochasticConfig),
    StochRsi(StochRsiConfig),
    Vwap(VwapConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaConfig {
    pub period: usize,
}

impl Default for SmaConfig {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// Either an explicit `alpha` or a `period` (alpha = 2 / (period + 1)).
/// Neither means alpha = 0.2.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmaConfig {
    pub alpha: Option<Decimal>,
    pub period: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiConfig {
    pub period: usize,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self { period: 14 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerConfig {
    pub period: usize,
    pub num_std: Decimal,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            num_std: Decimal::TWO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CciConfig {
    pub period: usize,
    pub factor: Decimal,
}

impl Default for CciConfig {
    fn default() -> Self {
        Self {
            period: 20,
            factor: dec!(0.015),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtrConfig {
    pub period: usize,
}

impl Default for AtrConfig {
    fn default() -> Self {
        Self { period: 14 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticConfig {
    pub period: usize,
    pub smoothing_period: usize,
    pub oversold: Decimal,
    pub overbought: Decimal,
}

impl Default for StochasticConfig {
    fn default() -> Self {
        Self {
            period: 14,
            smoothing_period: 3,
            oversold: dec!(20),
            overbought: dec!(80),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochRsiConfig {
    pub period: usize,
    pub rsi_period: usize,
    pub k_period: usize,
}

impl Default for StochRsiConfig {
    fn default() -> Self {
        Self {
            period: 15,
            rsi_period: 14,
            k_period: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VwapConfig {
    pub mvwap_period: usize,
}

impl Default for VwapConfig {
    fn default() -> Self {
        Self { mvwap_period: 20 }
    }
}

impl IndicatorConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            IndicatorConfig::Sma(_) => "sma",
            IndicatorConfig::Ema(_) => "ema",
            IndicatorConfig::Rsi(_) => "rsi",
            IndicatorConfig::Bollinger(_) => "bollinger",
            IndicatorConfig::Cci(_) => "cci",
            IndicatorConfig::Atr(_) => "atr",
            IndicatorConfig::Stochastic(_) => "stochastic",
            IndicatorConfig::StochRsi(_) => "stoch_rsi",
            IndicatorConfig::Vwap(_) => "vwap",
        }
    }

    /// Validate the parameters and construct an empty series.
    pub fn build(&self) -> Result<AnyIndicator, IndicatorError> {
        let indicator = match self {
            IndicatorConfig::Sma(c) => AnyIndicator::Sma(IndicatorSeries::new(Sma::new(c.period)?)),
            IndicatorConfig::Ema(c) => {
                let ema = match (c.alpha, c.period) {
                    (Some(_), Some(_)) => {
                        return Err(IndicatorError::InvalidParameter {
                            indicator: "EMA",
                            name: "alpha",
                            reason: "give either alpha or period, not both".to_string(),
                        })
                    }
                    (Some(alpha), None) => Ema::new(alpha)?,
                    (None, Some(period)) => Ema::from_period(period)?,
                    (None, None) => Ema::default_periods(),
                };
                AnyIndicator::Ema(IndicatorSeries::new(ema))
            }
            IndicatorConfig::Rsi(c) => AnyIndicator::Rsi(IndicatorSeries::new(Rsi::new(c.period)?)),
            IndicatorConfig::Bollinger(c) => AnyIndicator::Bollinger(IndicatorSeries::new(
                BollingerBands::new(c.period, c.num_std)?,
            )),
            IndicatorConfig::Cci(c) => {
                AnyIndicator::Cci(IndicatorSeries::new(Cci::new(c.period, c.factor)?))
            }
            IndicatorConfig::Atr(c) => AnyIndicator::Atr(IndicatorSeries::new(Atr::new(c.period)?)),
            IndicatorConfig::Stochastic(c) => AnyIndicator::Stochastic(IndicatorSeries::new(
                Stochastic::new(c.period, c.smoothing_period, c.oversold, c.overbought)?,
            )),
            IndicatorConfig::StochRsi(c) => AnyIndicator::StochRsi(IndicatorSeries::new(
                StochRsi::new(c.period, c.rsi_period, c.k_period)?,
            )),
            IndicatorConfig::Vwap(c) => {
                AnyIndicator::Vwap(IndicatorSeries::new(Vwap::new(c.mvwap_period)?))
            }
        };
        Ok(indicator)
    }
}

/// Any of the nine series, fed from OHLCV bars.
///
/// Scalar formulas read the close, CCI reads the typical price, ATR and the
/// Stochastic Oscillator read high/low/close, and VWAP reads close, volume
/// and timestamp.
#[derive(Debug, Clone)]
pub enum AnyIndicator {
    Sma(IndicatorSeries<Sma>),
    Ema(IndicatorSeries<Ema>),
    Rsi(IndicatorSeries<Rsi>),
    Bollinger(IndicatorSeries<BollingerBands>),
    Cci(IndicatorSeries<Cci>),
    Atr(IndicatorSeries<Atr>),
    Stochastic(IndicatorSeries<Stochastic>),
    StochRsi(IndicatorSeries<StochRsi>),
    Vwap(IndicatorSeries<Vwap>),
}

macro_rules! each_series {
    ($value:expr, $series:ident => $body:expr) => {
        match $value {
            AnyIndicator::Sma($series) => $body,
            AnyIndicator::Ema($series) => $body,
            AnyIndicator::Rsi($series) => $body,
            AnyIndicator::Bollinger($series) => $body,
            AnyIndicator::Cci($series) => $body,
            AnyIndicator::Atr($series) => $body,
            AnyIndicator::Stochastic($series) => $body,
            AnyIndicator::StochRsi($series) => $body,
            AnyIndicator::Vwap($series) => $body,
        }
    };
}

impl AnyIndicator {
    /// Feed one bar. Returns true if a new reading was produced.
    pub fn update(&mut self, bar: &Bar) -> bool {
        match self {
            AnyIndicator::Sma(s) => s.add_data_point(bar.close).is_some(),
            AnyIndicator::Ema(s) => s.add_data_point(bar.close).is_some(),
            AnyIndicator::Rsi(s) => s.add_data_point(bar.close).is_some(),
            AnyIndicator::Bollinger(s) => s.add_data_point(bar.close).is_some(),
            AnyIndicator::Cci(s) => s.add_data_point(bar.hlc().typical_price()).is_some(),
            AnyIndicator::Atr(s) => s.add_data_point(bar.hlc()).is_some(),
            AnyIndicator::Stochastic(s) => s.add_data_point(bar.hlc()).is_some(),
            AnyIndicator::StochRsi(s) => s.add_data_point(bar.close).is_some(),
            AnyIndicator::Vwap(s) => s.add_data_point(bar.volume_sample()).is_some(),
        }
    }

    pub fn name(&self) -> &'static str {
        each_series!(self, s => crate::IndicatorStrategy::name(s.strategy()))
    }

    pub fn phase(&self) -> SeriesPhase {
        each_series!(self, s => s.phase())
    }

    pub fn history_len(&self) -> usize {
        each_series!(self, s => s.history().len())
    }

    /// The latest reading as JSON, `None` if nothing has been computed yet.
    pub fn current_json(&self) -> Result<Option<serde_json::Value>, serde_json::Error> {
        each_series!(self, s => s.current_value().map(serde_json::to_value).transpose())
    }

    /// The full value history as a JSON array.
    pub fn history_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        each_series!(self, s => serde_json::to_value(s.history()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn bars(n: i64) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = Decimal::from(100 + (i * 5) % 9);
                Bar {
                    instrument: "ES".to_string(),
                    timestamp: start + Duration::minutes(i),
                    open: close,
                    high: close + dec!(1.5),
                    low: close - dec!(1),
                    close,
                    volume: Decimal::from(1000 + i * 10),
                }
            })
            .collect()
    }

    #[test]
    fn test_parse_from_toml_with_defaults() {
        let config: IndicatorConfig = toml::from_str(
            r#"
            kind = "bollinger"
            period = 10
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            IndicatorConfig::Bollinger(BollingerConfig {
                period: 10,
                num_std: Decimal::TWO,
            })
        );
    }

    #[test]
    fn test_parse_decimal_params() {
        let config: IndicatorConfig =
            serde_json::from_value(json!({ "kind": "ema", "alpha": "0.3" })).unwrap();
        assert_eq!(
            config,
            IndicatorConfig::Ema(EmaConfig {
                alpha: Some(dec!(0.3)),
                period: None,
            })
        );

        let config: IndicatorConfig =
            serde_json::from_value(json!({ "kind": "stoch_rsi" })).unwrap();
        assert_eq!(config.kind(), "stoch_rsi");
        assert_eq!(config, IndicatorConfig::StochRsi(StochRsiConfig::default()));
    }

    #[test]
    fn test_build_rejects_invalid() {
        assert!(IndicatorConfig::Sma(SmaConfig { period: 0 }).build().is_err());
        assert!(IndicatorConfig::Ema(EmaConfig {
            alpha: Some(dec!(0.5)),
            period: Some(3),
        })
        .build()
        .is_err());
        assert!(IndicatorConfig::StochRsi(StochRsiConfig {
            period: 5,
            rsi_period: 5,
            k_period: 3,
        })
        .build()
        .is_err());
    }

    #[test]
    fn test_every_kind_runs_over_bars() {
        let configs = [
            IndicatorConfig::Sma(SmaConfig::default()),
            IndicatorConfig::Ema(EmaConfig::default()),
            IndicatorConfig::Rsi(RsiConfig::default()),
            IndicatorConfig::Bollinger(BollingerConfig::default()),
            IndicatorConfig::Cci(CciConfig::default()),
            IndicatorConfig::Atr(AtrConfig::default()),
            IndicatorConfig::Stochastic(StochasticConfig::default()),
            IndicatorConfig::StochRsi(StochRsiConfig::default()),
            IndicatorConfig::Vwap(VwapConfig::default()),
        ];
        let data = bars(60);
        for config in &configs {
            let mut indicator = config.build().unwrap();
            assert_eq!(indicator.phase(), SeriesPhase::Empty);
            for bar in &data {
                indicator.update(bar);
            }
            assert_eq!(indicator.phase(), SeriesPhase::Active, "{}", indicator.name());
            assert!(indicator.current_json().unwrap().is_some());
            let history = indicator.history_json().unwrap();
            assert_eq!(
                history.as_array().map(Vec::len),
                Some(indicator.history_len())
            );
        }
    }

    #[test]
    fn test_current_json_shape() {
        let mut indicator = IndicatorConfig::Sma(SmaConfig { period: 2 }).build().unwrap();
        assert_eq!(indicator.current_json().unwrap(), None);
        for bar in bars(2) {
            indicator.update(&bar);
        }
        // Closes 100 and 105
        assert_eq!(
            indicator.current_json().unwrap(),
            Some(json!({ "value": "102.5" }))
        );
    }
}
