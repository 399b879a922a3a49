//! Random sources bound to a clock.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{Clock, TickListener};
use crate::error::{Result, SimError};

/// Default lower bound of `random_int`.
pub const DEFAULT_MIN: i64 = 0;
/// Default upper bound of `random_int`.
pub const DEFAULT_MAX: i64 = 100;

/// Receives observations from a source.
pub trait ObservationListener: Send + Sync {
    /// Called once per observation.
    fn on_observation(&self, observation: i64);
}

/// Produces one uniform integer in `[min, max]` per clock tick.
///
/// Every subscriber sees the same observation for a given tick.
pub struct Source {
    min: i64,
    max: i64,
    rng: Mutex<StdRng>,
    clock: Arc<Clock>,
    listeners: Mutex<Vec<Weak<dyn ObservationListener>>>,
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Source {
    /// Uniform integer source subscribed to `clock`.
    ///
    /// With a seed the sequence is reproducible; otherwise the RNG is seeded
    /// from the operating system.
    pub fn random_int(clock: Arc<Clock>, min: i64, max: i64, seed: Option<u64>) -> Result<Arc<Self>> {
        if min > max {
            return Err(SimError::InvalidBounds { min, max });
        }
        let rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        let source = Arc::new(Self {
            min,
            max,
            rng: Mutex::new(rng),
            clock,
            listeners: Mutex::new(Vec::new()),
        });
        let weak = Arc::downgrade(&source);
        source.clock.subscribe(weak);
        Ok(source)
    }

    /// Build a source from its configured type name; missing bounds take
    /// [`DEFAULT_MIN`] and [`DEFAULT_MAX`].
    pub fn from_kind(
        kind: &str,
        clock: Arc<Clock>,
        min: Option<i64>,
        max: Option<i64>,
        seed: Option<u64>,
    ) -> Result<Arc<Self>> {
        match kind {
            "random_int" => Self::random_int(
                clock,
                min.unwrap_or(DEFAULT_MIN),
                max.unwrap_or(DEFAULT_MAX),
                seed,
            ),
            other => Err(SimError::UnknownSourceType(other.to_owned())),
        }
    }

    /// Clock driving this source.
    #[must_use]
    pub fn clock(&self) -> &Arc<Clock> {
        &self.clock
    }

    /// Inclusive bounds.
    #[must_use]
    pub fn bounds(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    /// Register an observation subscriber.
    pub fn subscribe(&self, listener: Weak<dyn ObservationListener>) {
        self.listeners.lock().push(listener);
    }

    /// Draw one observation and publish it; returns the observation.
    pub fn emit(&self) -> i64 {
        let observation = self.rng.lock().random_range(self.min..=self.max);
        let live: Vec<Arc<dyn ObservationListener>> = {
            let mut listeners = self.listeners.lock();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            listener.on_observation(observation);
        }
        observation
    }
}

impl TickListener for Source {
    fn on_tick(&self) {
        self.emit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<i64>>);

    impl ObservationListener for Recorder {
        fn on_observation(&self, observation: i64) {
            self.0.lock().push(observation);
        }
    }

    fn clock() -> Arc<Clock> {
        Clock::periodic(Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = Source::random_int(clock(), 5, 1, None).unwrap_err();
        assert_eq!(err, SimError::InvalidBounds { min: 5, max: 1 });
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = Source::from_kind("sine", clock(), None, None, None).unwrap_err();
        assert_eq!(err, SimError::UnknownSourceType("sine".into()));
    }

    #[test]
    fn missing_bounds_take_defaults() {
        let source = Source::from_kind("random_int", clock(), None, Some(7), None).unwrap();
        assert_eq!(source.bounds(), (DEFAULT_MIN, 7));
    }

    #[test]
    fn each_tick_publishes_one_observation_to_all() {
        let clk = clock();
        let source = Source::random_int(Arc::clone(&clk), 0, 10, Some(1)).unwrap();
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        let (weak_a, weak_b) = (Arc::downgrade(&a), Arc::downgrade(&b));
        source.subscribe(weak_a);
        source.subscribe(weak_b);

        for _ in 0..5 {
            clk.tick();
        }
        let seen = a.0.lock().clone();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen, *b.0.lock());
        assert!(seen.iter().all(|v| (0..=10).contains(v)));
    }

    #[test]
    fn same_seed_same_sequence() {
        let first = Source::random_int(clock(), -50, 50, Some(42)).unwrap();
        let second = Source::random_int(clock(), -50, 50, Some(42)).unwrap();
        let a: Vec<i64> = (0..20).map(|_| first.emit()).collect();
        let b: Vec<i64> = (0..20).map(|_| second.emit()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_range_is_constant() {
        let source = Source::random_int(clock(), 3, 3, None).unwrap();
        assert!((0..10).all(|_| source.emit() == 3));
    }
}
