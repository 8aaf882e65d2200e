pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod config;
pub mod ema;
pub mod rsi;
pub mod series;
pub mod sma;
pub mod stoch_rsi;
pub mod stochastic;
pub mod vwap;
pub mod window;

pub use config::{AnyIndicator, IndicatorConfig};
pub use series::{IndicatorSeries, SeriesPhase, ValueHistory};
pub use window::RollingWindow;

use tilib_core::{IndicatorError, Reading};

/// One indicator formula evaluated over a rolling window.
///
/// The series façade drives every strategy through the same cycle on each
/// sample: push into the window, `observe`, then `recompute` once `ready`.
pub trait IndicatorStrategy: Send + Sync {
    /// The sample shape this formula consumes.
    type Input: Clone + std::fmt::Debug + Send + Sync;
    /// The value this formula emits.
    type Output: Clone + std::fmt::Debug + Send + Sync;

    /// Short display name, e.g. "RSI".
    fn name(&self) -> &'static str;

    /// How many samples the rolling window retains.
    fn window_capacity(&self) -> usize;

    /// The number of samples needed before the first value is produced.
    fn period(&self) -> usize;

    /// Update carried-over state after a sample lands in the window.
    ///
    /// `evicted` is the sample the push dropped off the front, if any.
    fn observe(&mut self, _window: &RollingWindow<Self::Input>, _evicted: Option<&Self::Input>) {}

    /// Whether enough samples have been collected to recompute.
    fn ready(&self, window: &RollingWindow<Self::Input>) -> bool {
        window.len() >= self.period()
    }

    /// Evaluate the formula over the window and carried state.
    ///
    /// Returns `None` only when called before `ready`.
    fn recompute(&self, window: &RollingWindow<Self::Input>) -> Option<Reading<Self::Output>>;

    /// Checked `recompute` for callers driving a strategy directly.
    fn evaluate(
        &self,
        window: &RollingWindow<Self::Input>,
    ) -> Result<Reading<Self::Output>, IndicatorError> {
        let insufficient = || IndicatorError::InsufficientData {
            indicator: self.name(),
            required: self.period(),
            available: window.len(),
        };
        if !self.ready(window) {
            return Err(insufficient());
        }
        self.recompute(window).ok_or_else(insufficient)
    }
}
