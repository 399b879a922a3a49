//! Values: transformed views over a source's observations.
//!
//! A value subscribes to its source and runs every observation through its
//! transform pipeline. Reading with reset-on-read consumes the state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{Result, SimError};
use crate::source::{ObservationListener, Source};

/// A transform stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Running sum of every observation.
    Accumulate,
}

impl Transform {
    /// Parse a configured transform name.
    pub fn parse(kind: &str) -> Result<Self> {
        match kind {
            "accumulate" => Ok(Self::Accumulate),
            other => Err(SimError::UnknownTransform(other.to_owned())),
        }
    }
}

/// What happens to the state when it is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Reset {
    /// Reads leave the state untouched.
    #[default]
    Never,
    /// Each read sets the state and all accumulators to the given value.
    OnRead(i64),
}

impl Reset {
    /// Parse a configured reset type with its reset value.
    pub fn parse(kind: &str, value: i64) -> Result<Self> {
        match kind {
            "on_read" => Ok(Self::OnRead(value)),
            other => Err(SimError::UnknownReset(other.to_owned())),
        }
    }
}

#[derive(Debug)]
struct Stage {
    transform: Transform,
    acc: i64,
}

#[derive(Debug)]
struct State {
    current: i64,
    stages: Vec<Stage>,
}

impl State {
    fn observe(&mut self, observation: i64) {
        let mut x = observation;
        for stage in &mut self.stages {
            x = match stage.transform {
                Transform::Accumulate => {
                    stage.acc = stage.acc.saturating_add(x);
                    stage.acc
                }
            };
        }
        self.current = x;
    }

    fn reset_to(&mut self, n: i64) {
        self.current = n;
        for stage in &mut self.stages {
            stage.acc = n;
        }
    }
}

/// A value bound to a source.
#[derive(Debug)]
pub struct Value {
    source: Arc<Source>,
    reset: Reset,
    state: Mutex<State>,
    stopped: AtomicBool,
}

impl Value {
    /// Value over `source` with the given pipeline and reset behaviour.
    #[must_use]
    pub fn new(source: Arc<Source>, transforms: Vec<Transform>, reset: Reset) -> Arc<Self> {
        let stages = transforms
            .into_iter()
            .map(|transform| Stage { transform, acc: 0 })
            .collect();
        let value = Arc::new(Self {
            source,
            reset,
            state: Mutex::new(State { current: 0, stages }),
            stopped: AtomicBool::new(false),
        });
        let weak = Arc::downgrade(&value);
        value.source.subscribe(weak);
        value
    }

    /// Source feeding this value.
    #[must_use]
    pub fn source(&self) -> &Arc<Source> {
        &self.source
    }

    /// Reset behaviour.
    #[must_use]
    pub fn reset(&self) -> Reset {
        self.reset
    }

    /// Current state. With [`Reset::OnRead`] the state is reset afterwards.
    pub fn value(&self) -> i64 {
        let mut state = self.state.lock();
        let current = state.current;
        if let Reset::OnRead(n) = self.reset {
            state.reset_to(n);
        }
        current
    }

    /// Current state without resetting it.
    #[must_use]
    pub fn peek(&self) -> i64 {
        self.state.lock().current
    }

    /// Detach from the source; later observations are ignored.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    /// Whether [`Value::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

impl ObservationListener for Value {
    fn on_observation(&self, observation: i64) {
        if self.is_stopped() {
            return;
        }
        self.state.lock().observe(observation);
    }
}
