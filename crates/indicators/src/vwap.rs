use crate::window::RollingWindow;
use crate::{IndicatorSeries, IndicatorStrategy};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tilib_core::{Indeterminacy, IndicatorError, Reading, VolumeSample};

/// Volume Weighted Average Price (VWAP).
///
/// Accumulates over the whole stream since construction or the last
/// `reset_session()`, not over a window. The rolling window only backs the
/// moving VWAP query.
#[derive(Debug, Clone)]
pub struct Vwap {
    mvwap_period: usize,
    cumulative_pv: Decimal,
    cumulative_vol: Decimal,
    cumulative_time_pv: Decimal,
    session_start: Option<DateTime<Utc>>,
}

impl Vwap {
    pub fn new(mvwap_period: usize) -> Result<Self, IndicatorError> {
        let mvwap_period = IndicatorError::check_period("VWAP", "mvwap_period", mvwap_period)?;
        Ok(Self::with_window(mvwap_period))
    }

    /// VWAP with a 20-sample moving window.
    pub fn default_periods() -> Self {
        Self::with_window(20)
    }

    fn with_window(mvwap_period: usize) -> Self {
        Self {
            mvwap_period,
            cumulative_pv: Decimal::ZERO,
            cumulative_vol: Decimal::ZERO,
            cumulative_time_pv: Decimal::ZERO,
            session_start: None,
        }
    }

    pub fn total_volume(&self) -> Decimal {
        self.cumulative_vol
    }

    pub fn cumulative_price_volume(&self) -> Decimal {
        self.cumulative_pv
    }

    /// Time-weighted average price over the session.
    ///
    /// Σ price·volume·t / (total volume · `total_time`), where t is seconds
    /// since the session's first sample. `None` before any sample.
    pub fn twap(&self, total_time: Decimal) -> Option<Reading<Decimal>> {
        if self.session_start.is_none() {
            return None;
        }
        if self.cumulative_vol.is_zero() {
            return Some(Reading::Indeterminate(Indeterminacy::ZeroVolume));
        }
        if total_time.is_zero() {
            return Some(Reading::Indeterminate(Indeterminacy::ZeroElapsedTime));
        }
        Some(Reading::Value(
            self.cumulative_time_pv / (self.cumulative_vol * total_time),
        ))
    }

    /// VWAP over the last `mvwap_period` samples. `None` until that many arrived.
    pub fn mvwap(&self, window: &RollingWindow<VolumeSample>) -> Option<Reading<Decimal>> {
        if window.len() < self.mvwap_period {
            return None;
        }
        let (pv, vol) = window
            .last_n(self.mvwap_period)
            .fold((Decimal::ZERO, Decimal::ZERO), |(pv, vol), s| {
                (pv + s.price * s.volume, vol + s.volume)
            });
        if vol.is_zero() {
            return Some(Reading::Indeterminate(Indeterminacy::ZeroVolume));
        }
        Some(Reading::Value(pv / vol))
    }

    fn reset_accumulators(&mut self) {
        self.cumulative_pv = Decimal::ZERO;
        self.cumulative_vol = Decimal::ZERO;
        self.cumulative_time_pv = Decimal::ZERO;
        self.session_start = None;
    }
}

impl IndicatorStrategy for Vwap {
    type Input = VolumeSample;
    type Output = Decimal;

    fn name(&self) -> &'static str {
        "VWAP"
    }

    fn window_capacity(&self) -> usize {
        self.mvwap_period
    }

    fn period(&self) -> usize {
        1
    }

    fn observe(&mut self, window: &RollingWindow<VolumeSample>, _evicted: Option<&VolumeSample>) {
        let Some(sample) = window.latest() else {
            return;
        };
        let start = *self.session_start.get_or_insert(sample.timestamp);
        let elapsed = Decimal::from((sample.timestamp - start).num_milliseconds()) / Decimal::from(1000);

        let pv = sample.price * sample.volume;
        self.cumulative_pv += pv;
        self.cumulative_vol += sample.volume;
        self.cumulative_time_pv += pv * elapsed;
    }

    fn recompute(&self, window: &RollingWindow<VolumeSample>) -> Option<Reading<Decimal>> {
        if window.is_empty() {
            return None;
        }
        if self.cumulative_vol.is_zero() {
            return Some(Reading::Indeterminate(Indeterminacy::ZeroVolume));
        }
        Some(Reading::Value(self.cumulative_pv / self.cumulative_vol))
    }
}

impl IndicatorSeries<Vwap> {
    /// Start a new session: clear the accumulators and the moving window.
    /// History and the latest reading are kept.
    pub fn reset_session(&mut self) {
        let (strategy, window) = self.parts_mut();
        strategy.reset_accumulators();
        window.clear();
    }

    pub fn twap(&self, total_time: Decimal) -> Option<Reading<Decimal>> {
        self.strategy().twap(total_time)
    }

    pub fn mvwap(&self) -> Option<Reading<Decimal>> {
        self.strategy().mvwap(self.window())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SeriesPhase;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn test_vwap_two_trades() {
        let mut vwap = IndicatorSeries::new(Vwap::default_periods());
        vwap.add_data_point(VolumeSample::new(dec!(10), dec!(100), at(0)));
        let reading = vwap.add_data_point(VolumeSample::new(dec!(20), dec!(100), at(60)));
        assert_eq!(reading, Some(Reading::Value(dec!(15))));
    }

    #[test]
    fn test_vwap_spans_whole_stream() {
        let mut vwap = IndicatorSeries::new(Vwap::new(2).unwrap());
        vwap.add_data_point(VolumeSample::new(dec!(10), dec!(300), at(0)));
        vwap.add_data_point(VolumeSample::new(dec!(20), dec!(100), at(1)));
        vwap.add_data_point(VolumeSample::new(dec!(30), dec!(100), at(2)));
        // (3000 + 2000 + 3000) / 500, even though the window only holds two samples
        assert_eq!(vwap.value(), Some(&dec!(16)));
        // Moving VWAP only sees the last two: (2000 + 3000) / 200
        assert_eq!(vwap.mvwap(), Some(Reading::Value(dec!(25))));
    }

    #[test]
    fn test_vwap_zero_volume_is_indeterminate() {
        let mut vwap = IndicatorSeries::new(Vwap::default_periods());
        let reading = vwap.add_data_point(VolumeSample::new(dec!(10), Decimal::ZERO, at(0)));
        assert_eq!(reading, Some(Reading::Indeterminate(Indeterminacy::ZeroVolume)));
        assert_eq!(vwap.phase(), SeriesPhase::Active);

        let reading = vwap.add_data_point(VolumeSample::new(dec!(12), dec!(5), at(1)));
        assert_eq!(reading, Some(Reading::Value(dec!(12))));
    }

    #[test]
    fn test_mvwap_needs_full_window() {
        let mut vwap = IndicatorSeries::new(Vwap::new(3).unwrap());
        vwap.add_data_point(VolumeSample::new(dec!(10), dec!(1), at(0)));
        vwap.add_data_point(VolumeSample::new(dec!(11), dec!(1), at(1)));
        assert_eq!(vwap.mvwap(), None);
        vwap.add_data_point(VolumeSample::new(dec!(12), dec!(1), at(2)));
        assert_eq!(vwap.mvwap(), Some(Reading::Value(dec!(11))));
    }

    #[test]
    fn test_twap() {
        let mut vwap = IndicatorSeries::new(Vwap::default_periods());
        assert_eq!(vwap.twap(dec!(10)), None);

        vwap.add_data_point(VolumeSample::new(dec!(10), dec!(100), at(0)));
        // Only the first sample, at t = 0
        assert_eq!(vwap.twap(dec!(10)), Some(Reading::Value(Decimal::ZERO)));

        vwap.add_data_point(VolumeSample::new(dec!(20), dec!(100), at(10)));
        // 20 * 100 * 10 / (200 * 10)
        assert_eq!(vwap.twap(dec!(10)), Some(Reading::Value(dec!(10))));
        assert_eq!(
            vwap.twap(Decimal::ZERO),
            Some(Reading::Indeterminate(Indeterminacy::ZeroElapsedTime))
        );
    }

    #[test]
    fn test_twap_zero_price_after_elapsed_time() {
        let mut vwap = IndicatorSeries::new(Vwap::default_periods());
        vwap.add_data_point(VolumeSample::new(dec!(10), dec!(100), at(0)));
        vwap.add_data_point(VolumeSample::new(Decimal::ZERO, dec!(100), at(10)));
        // 10 * 100 * 0 + 0 * 100 * 10 over 200 * 10
        assert_eq!(vwap.twap(dec!(10)), Some(Reading::Value(Decimal::ZERO)));
    }

    #[test]
    fn test_twap_zero_volume_session() {
        let mut vwap = IndicatorSeries::new(Vwap::default_periods());
        vwap.add_data_point(VolumeSample::new(dec!(10), Decimal::ZERO, at(0)));
        assert_eq!(
            vwap.twap(dec!(10)),
            Some(Reading::Indeterminate(Indeterminacy::ZeroVolume))
        );
    }

    #[test]
    fn test_reset_session() {
        let mut vwap = IndicatorSeries::new(Vwap::new(2).unwrap());
        vwap.add_data_point(VolumeSample::new(dec!(10), dec!(100), at(0)));
        vwap.add_data_point(VolumeSample::new(dec!(20), dec!(100), at(1)));
        vwap.reset_session();

        assert_eq!(vwap.strategy().total_volume(), Decimal::ZERO);
        assert_eq!(vwap.mvwap(), None);
        assert_eq!(vwap.phase(), SeriesPhase::Active);
        assert_eq!(vwap.value(), Some(&dec!(15)));

        let reading = vwap.add_data_point(VolumeSample::new(dec!(30), dec!(50), at(3600)));
        assert_eq!(reading, Some(Reading::Value(dec!(30))));
        assert_eq!(vwap.history().len(), 3);
    }

    #[test]
    fn test_vwap_from_columns() {
        let samples = VolumeSample::zip_columns(
            "VWAP",
            &[dec!(10), dec!(20)],
            &[dec!(100), dec!(100)],
            &[at(0), at(1)],
        )
        .unwrap();
        let vwap = IndicatorSeries::with_samples(Vwap::default_periods(), samples);
        assert_eq!(vwap.value(), Some(&dec!(15)));
    }
}
