//! Periodic clocks.
//!
//! A clock fans each tick out to its subscribers. Once started, a tokio task
//! ticks it every interval until [`Clock::stop`] cancels the task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SimError};

/// Receives clock ticks.
pub trait TickListener: Send + Sync {
    /// Called once per tick, on the clock's task.
    fn on_tick(&self);
}

/// A periodic clock.
///
/// Subscribers are held weakly; a dropped subscriber is pruned on the next
/// tick.
pub struct Clock {
    interval: Duration,
    listeners: Mutex<Vec<Weak<dyn TickListener>>>,
    running: Mutex<Option<CancellationToken>>,
    ticks: AtomicU64,
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("interval", &self.interval)
            .field("ticks", &self.ticks())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Clock {
    /// Periodic clock ticking every `interval`.
    pub fn periodic(interval: Duration) -> Result<Arc<Self>> {
        if interval.is_zero() {
            return Err(SimError::InvalidInterval);
        }
        Ok(Arc::new(Self {
            interval,
            listeners: Mutex::new(Vec::new()),
            running: Mutex::new(None),
            ticks: AtomicU64::new(0),
        }))
    }

    /// Build a clock from its configured type name.
    pub fn from_kind(kind: &str, interval: Duration) -> Result<Arc<Self>> {
        match kind {
            "periodic" => Self::periodic(interval),
            other => Err(SimError::UnknownClockType(other.to_owned())),
        }
    }

    /// Tick interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of ticks so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Whether the background task is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Register a tick subscriber.
    pub fn subscribe(&self, listener: Weak<dyn TickListener>) {
        self.listeners.lock().push(listener);
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners
            .lock()
            .iter()
            .filter(|l| l.strong_count() > 0)
            .count()
    }

    /// Deliver one tick to every live subscriber.
    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        let live: Vec<Arc<dyn TickListener>> = {
            let mut listeners = self.listeners.lock();
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            listener.on_tick();
        }
    }

    /// Spawn the ticking task on the current tokio runtime.
    ///
    /// The first tick fires one interval after start. Starting a running
    /// clock does nothing.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        let mut running = self.running.lock();
        if running.is_some() {
            return Ok(());
        }
        let handle = tokio::runtime::Handle::try_current().map_err(|_| SimError::NoRuntime)?;

        let period = self.interval;
        // Two periods ahead must be representable: the ticker schedules one past the next.
        let first = Instant::now()
            .checked_add(period)
            .filter(|first| first.checked_add(period).is_some())
            .ok_or(SimError::IntervalTooLong(period))?;

        let token = CancellationToken::new();
        let cancel = token.clone();
        let clock = Arc::downgrade(self);
        handle.spawn(async move {
            let mut ticker = interval_at(first, period);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => match clock.upgrade() {
                        Some(clock) => clock.tick(),
                        None => break,
                    },
                }
            }
        });

        *running = Some(token);
        tracing::debug!(interval = ?period, "clock started");
        Ok(())
    }

    /// Cancel the ticking task. Does nothing if the clock is not running.
    pub fn stop(&self) {
        if let Some(token) = self.running.lock().take() {
            token.cancel();
            tracing::debug!(ticks = self.ticks(), "clock stopped");
        }
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        if let Some(token) = self.running.get_mut().take() {
            token.cancel();
        }
    }
}
