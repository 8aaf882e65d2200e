use crate::window::RollingWindow;
use crate::IndicatorStrategy;
use rust_decimal::Decimal;
use tilib_core::{Hlc, IndicatorError, Reading};

/// Average True Range (ATR).
///
/// Mean of the true ranges of the samples in the window. The first sample's
/// previous close comes from the sample that was evicted just before it; until
/// anything has been evicted the first true range is plain high - low.
#[derive(Debug, Clone)]
pub struct Atr {
    len: usize,
    prior_close: Option<Decimal>,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        let len = IndicatorError::check_period("ATR", "period", period)?;
        Ok(Self {
            len,
            prior_close: None,
        })
    }

    /// Standard ATR (14).
    pub fn default_periods() -> Self {
        Self {
            len: 14,
            prior_close: None,
        }
    }
}

/// max(high - low, |high - prev_close|, |low - prev_close|)
pub fn true_range(sample: &Hlc, prev_close: Option<Decimal>) -> Decimal {
    let hl = sample.high - sample.low;
    match prev_close {
        Some(prev_c) => {
            let hc = (sample.high - prev_c).abs();
            let lc = (sample.low - prev_c).abs();
            hl.max(hc).max(lc)
        }
        None => hl,
    }
}

impl IndicatorStrategy for Atr {
    type Input = Hlc;
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "ATR"
    }

    fn window_capacity(&self) -> usize {
        self.len
    }

    fn period(&self) -> usize {
        self.len
    }

    fn observe(&mut self, _window: &RollingWindow<Hlc>, evicted: Option<&Hlc>) {
        if let Some(sample) = evicted {
            self.prior_close = Some(sample.close);
        }
    }

    fn recompute(&self, window: &RollingWindow<Hlc>) -> Option<Reading<Decimal>> {
        if window.len() < self.len {
            return None;
        }
        let mut prev_close = self.prior_close;
        let mut sum = Decimal::ZERO;
        for sample in window.iter() {
            sum += true_range(sample, prev_close);
            prev_close = Some(sample.close);
        }
        Some(Reading::Value(sum / Decimal::from(window.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IndicatorSeries;
    use rust_decimal_macros::dec;

    #[test]
    fn test_atr_two_bars() {
        let samples = Hlc::zip_columns(
            "ATR",
            &[dec!(10), dec!(12)],
            &[dec!(8), dec!(9)],
            &[dec!(9), dec!(11)],
        )
        .unwrap();
        let mut atr = IndicatorSeries::new(Atr::new(2).unwrap());
        assert!(atr.add_data_point(samples[0]).is_none());
        // TRs are 2 and max(3, 3, 0) = 3
        assert_eq!(atr.add_data_point(samples[1]), Some(Reading::Value(dec!(2.5))));
    }

    #[test]
    fn test_atr_uses_evicted_close() {
        let mut atr = IndicatorSeries::new(Atr::new(2).unwrap());
        atr.add_data_point(Hlc::new(dec!(10), dec!(8), dec!(9)));
        atr.add_data_point(Hlc::new(dec!(12), dec!(9), dec!(11)));
        // Window is now bars 2 and 3; bar 2 takes its previous close (9) from the evicted bar.
        // TR2 = max(3, 3, 0) = 3, TR3 = max(1, 0, 1) = 1
        let reading = atr.add_data_point(Hlc::new(dec!(11), dec!(10), dec!(10.5)));
        assert_eq!(reading, Some(Reading::Value(dec!(2))));
    }

    #[test]
    fn test_atr_gap_widens_true_range() {
        let mut atr = IndicatorSeries::new(Atr::new(1).unwrap());
        atr.add_data_point(Hlc::new(dec!(10), dec!(9), dec!(9.5)));
        // Gap up: high - low = 1, but high - prev close = 5.5
        let reading = atr.add_data_point(Hlc::new(dec!(15), dec!(14), dec!(14.5)));
        assert_eq!(reading, Some(Reading::Value(dec!(5.5))));
    }

    #[test]
    fn test_atr_window_bounded() {
        let mut atr = IndicatorSeries::new(Atr::default_periods());
        for i in 0..40i64 {
            let base = Decimal::from(100 + i % 7);
            atr.add_data_point(Hlc::new(base + dec!(1), base - dec!(1), base));
            assert!(atr.window().len() <= 14);
        }
        assert!(atr.value().unwrap() > &Decimal::ZERO);
    }
}
