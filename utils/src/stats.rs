//! Rolling statistics used by the module processors, plus session counters.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

/// `part / whole`, or 0 when `whole` is 0.
pub fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Arithmetic mean over every value pushed so far.
#[derive(Clone, Debug, Default)]
pub struct RunningMean {
    sum: f64,
    count: u64,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Mean of the pushed values, 0 when empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Fixed-capacity window keeping the most recent values.
#[derive(Clone, Debug)]
pub struct RollingWindow<T> {
    values: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// A window holding at most `capacity` values (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a value, evicting the oldest when full.
    pub fn push(&mut self, value: T) {
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.values.iter()
    }

    /// The newest `n` values, oldest first.
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.values.len().saturating_sub(n);
        self.values.iter().skip(skip)
    }

    /// Number of values satisfying `pred`.
    pub fn count_where(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.values.iter().filter(|v| pred(v)).count()
    }
}

/// A thread-safe set of named counters.
pub struct StatsCounter {
    counters: HashMap<&'static str, AtomicU64>,
}

impl StatsCounter {
    pub fn new(names: &[&'static str]) -> Self {
        Self {
            counters: names.iter().map(|&n| (n, AtomicU64::new(0))).collect(),
        }
    }

    /// Increment `name`. Unknown names are ignored.
    pub fn increment(&self, name: &str) {
        if let Some(counter) = self.counters.get(name) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> HashMap<&'static str, u64> {
        self.counters
            .iter()
            .map(|(&k, v)| (k, v.load(Ordering::Relaxed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_of_empty_is_zero() {
        assert_eq!(ratio(0, 0), 0.0);
        assert_eq!(ratio(3, 4), 0.75);
    }

    #[test]
    fn running_mean_covers_all_values() {
        let mut m = RunningMean::new();
        assert_eq!(m.mean(), 0.0);
        for v in [0.2, 0.4, 0.9] {
            m.push(v);
        }
        assert!((m.mean() - 0.5).abs() < 1e-12);
        assert_eq!(m.count(), 3);
    }

    #[test]
    fn rolling_window_evicts_oldest() {
        let mut w = RollingWindow::new(3);
        for v in 1..=5 {
            w.push(v);
        }
        assert_eq!(w.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(w.latest(2).copied().collect::<Vec<_>>(), vec![4, 5]);
        assert_eq!(w.latest(10).count(), 3);
        assert_eq!(w.count_where(|v| *v > 3), 2);
    }

    #[test]
    fn zero_capacity_window_holds_one() {
        let mut w = RollingWindow::new(0);
        w.push('a');
        w.push('b');
        assert_eq!(w.len(), 1);
        assert_eq!(w.capacity(), 1);
    }

    #[test]
    fn counters_ignore_unknown_names() {
        let c = StatsCounter::new(&["skips"]);
        c.increment("skips");
        c.increment("skips");
        c.increment("bogus");
        assert_eq!(c.get("skips"), 2);
        assert_eq!(c.get("bogus"), 0);
        assert_eq!(c.snapshot().len(), 1);
    }
}
