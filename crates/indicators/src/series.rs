use crate::window::RollingWindow;
use crate::IndicatorStrategy;
use serde::{Deserialize, Serialize};
use tilib_core::Reading;
use tracing::{debug, trace};

/// Lifecycle of a series. Once `Active`, a series stays `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesPhase {
    /// No samples pushed yet.
    Empty,
    /// Samples pushed, but fewer than the strategy needs.
    Filling,
    /// At least one reading has been produced.
    Active,
}

/// Append-only record of every reading a series has emitted, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueHistory<T> {
    readings: Vec<Reading<T>>,
}

impl<T> ValueHistory<T> {
    pub fn new() -> Self {
        Self {
            readings: Vec::new(),
        }
    }

    fn push(&mut self, reading: Reading<T>) {
        self.readings.push(reading);
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn last(&self) -> Option<&Reading<T>> {
        self.readings.last()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Reading<T>> + ExactSizeIterator {
        self.readings.iter()
    }

    pub fn as_slice(&self) -> &[Reading<T>] {
        &self.readings
    }

    /// Defined values only, skipping indeterminate readings.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.readings.iter().filter_map(Reading::value)
    }
}

impl<T> Default for ValueHistory<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The handle a caller holds for one indicator over one price stream.
///
/// Owns the rolling window, the strategy (and its carried state), and the
/// history of emitted readings.
#[derive(Debug, Clone)]
pub struct IndicatorSeries<S: IndicatorStrategy> {
    strategy: S,
    window: RollingWindow<S::Input>,
    history: ValueHistory<S::Output>,
    samples_seen: usize,
}

impl<S: IndicatorStrategy> IndicatorSeries<S> {
    pub fn new(strategy: S) -> Self {
        let window = RollingWindow::new(strategy.window_capacity());
        Self {
            strategy,
            window,
            history: ValueHistory::new(),
            samples_seen: 0,
        }
    }

    /// Build a series and replay `samples` through it in order.
    pub fn with_samples(strategy: S, samples: impl IntoIterator<Item = S::Input>) -> Self {
        let mut series = Self::new(strategy);
        for sample in samples {
            series.add_data_point(sample);
        }
        series
    }

    /// Push one sample and recompute if the strategy is ready.
    ///
    /// Returns the new reading, or `None` while the series is still filling.
    pub fn add_data_point(&mut self, sample: S::Input) -> Option<Reading<S::Output>> {
        let was_active = self.phase() == SeriesPhase::Active;

        let evicted = self.window.push(sample);
        self.samples_seen += 1;
        self.strategy.observe(&self.window, evicted.as_ref());

        trace!(
            indicator = self.strategy.name(),
            window = self.window.len(),
            seen = self.samples_seen,
            "Sample pushed"
        );

        if !self.strategy.ready(&self.window) {
            return None;
        }
        let reading = self.strategy.recompute(&self.window)?;

        if !was_active {
            debug!(
                indicator = self.strategy.name(),
                seen = self.samples_seen,
                "Indicator active"
            );
        }
        if let Reading::Indeterminate(why) = &reading {
            debug!(indicator = self.strategy.name(), reason = %why, "Indeterminate reading");
        }

        self.history.push(reading.clone());
        Some(reading)
    }

    /// The latest reading, or `None` if nothing has been computed yet.
    pub fn current_value(&self) -> Option<&Reading<S::Output>> {
        self.history.last()
    }

    /// The latest reading if it is a defined value.
    pub fn value(&self) -> Option<&S::Output> {
        self.current_value().and_then(Reading::value)
    }

    pub fn phase(&self) -> SeriesPhase {
        if !self.history.is_empty() {
            SeriesPhase::Active
        } else if self.samples_seen == 0 {
            SeriesPhase::Empty
        } else {
            SeriesPhase::Filling
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == SeriesPhase::Active
    }

    pub fn period(&self) -> usize {
        self.strategy.period()
    }

    pub fn samples_seen(&self) -> usize {
        self.samples_seen
    }

    pub fn window(&self) -> &RollingWindow<S::Input> {
        &self.window
    }

    pub fn history(&self) -> &ValueHistory<S::Output> {
        &self.history
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut S, &mut RollingWindow<S::Input>) {
        (&mut self.strategy, &mut self.window)
    }
}
