use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a formula produced no number for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indeterminacy {
    /// CCI: every typical price in the window equals the mean.
    ZeroMeanDeviation,
    /// Stochastic: highest high equals lowest low.
    FlatRange,
    /// StochRSI: max and min RSI over the %K window are equal.
    FlatRsiRange,
    /// VWAP family: no volume accumulated.
    ZeroVolume,
    /// TWAP: total time of zero.
    ZeroElapsedTime,
}

impl fmt::Display for Indeterminacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Indeterminacy::ZeroMeanDeviation => "zero mean deviation",
            Indeterminacy::FlatRange => "flat high/low range",
            Indeterminacy::FlatRsiRange => "flat RSI range",
            Indeterminacy::ZeroVolume => "zero volume",
            Indeterminacy::ZeroElapsedTime => "zero elapsed time",
        };
        f.write_str(s)
    }
}

/// The outcome of one recomputation.
///
/// A reading is either a defined value or an explicit indeterminate marker.
/// Absence of data is never a reading; see `IndicatorSeries::current_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reading<T> {
    Value(T),
    Indeterminate(Indeterminacy),
}

impl<T> Reading<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::Indeterminate(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::Indeterminate(_) => None,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Reading::Indeterminate(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Reading::Value(v) => Reading::Value(f(v)),
            Reading::Indeterminate(why) => Reading::Indeterminate(why),
        }
    }
}

impl<T> From<T> for Reading<T> {
    fn from(value: T) -> Self {
        Reading::Value(value)
    }
}
