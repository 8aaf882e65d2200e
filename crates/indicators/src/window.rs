use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Fixed-capacity FIFO buffer of the most recent samples.
///
/// Pushing past capacity evicts exactly one oldest sample, so the length
/// never exceeds the capacity and order is never disturbed.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    capacity: usize,
    buffer: VecDeque<T>,
}

impl<T> RollingWindow<T> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample, returning the evicted oldest sample if the window was full.
    pub fn push(&mut self, sample: T) -> Option<T> {
        self.buffer.push_back(sample);
        if self.buffer.len() > self.capacity {
            self.buffer.pop_front()
        } else {
            None
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + Clone {
        self.buffer.iter()
    }

    /// The `n` newest samples, oldest first. Yields fewer if the window holds fewer.
    pub fn last_n(&self, n: usize) -> impl Iterator<Item = &T> + Clone {
        self.buffer.iter().skip(self.buffer.len().saturating_sub(n))
    }

    pub fn latest(&self) -> Option<&T> {
        self.buffer.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.buffer.front()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl<T: Clone> RollingWindow<T> {
    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }
}

impl RollingWindow<Decimal> {
    pub fn sum(&self) -> Decimal {
        self.buffer.iter().sum()
    }

    pub fn mean(&self) -> Option<Decimal> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.sum() / Decimal::from(self.buffer.len()))
        }
    }

    pub fn max(&self) -> Option<Decimal> {
        self.buffer.iter().max().copied()
    }

    pub fn min(&self) -> Option<Decimal> {
        self.buffer.iter().min().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_push_evicts_oldest() {
        let mut w = RollingWindow::new(3);
        assert_eq!(w.push(1), None);
        assert_eq!(w.push(2), None);
        assert_eq!(w.push(3), None);
        assert!(w.is_full());
        assert_eq!(w.push(4), Some(1));
        assert_eq!(w.snapshot(), vec![2, 3, 4]);
        assert_eq!(w.oldest(), Some(&2));
        assert_eq!(w.latest(), Some(&4));
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        for capacity in 1..8 {
            let mut w = RollingWindow::new(capacity);
            for i in 0..50 {
                w.push(i);
                assert!(w.len() <= capacity);
                assert_eq!(w.len(), (i + 1).min(capacity));
            }
        }
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut w = RollingWindow::new(0);
        assert_eq!(w.capacity(), 1);
        w.push('a');
        assert_eq!(w.push('b'), Some('a'));
        assert_eq!(w.snapshot(), vec!['b']);
    }

    #[test]
    fn test_last_n() {
        let mut w = RollingWindow::new(5);
        for i in 1..=5 {
            w.push(i);
        }
        assert_eq!(w.last_n(2).copied().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(w.last_n(10).count(), 5);
    }

    #[test]
    fn test_decimal_helpers() {
        let mut w = RollingWindow::new(3);
        assert_eq!(w.mean(), None);
        w.push(dec!(2));
        w.push(dec!(4));
        w.push(dec!(9));
        assert_eq!(w.sum(), dec!(15));
        assert_eq!(w.mean(), Some(dec!(5)));
        assert_eq!(w.max(), Some(dec!(9)));
        assert_eq!(w.min(), Some(dec!(2)));
    }
}
