//! Time sources and the debounce primitive.
//!
//! Everything time-dependent in the crate reads a [`TimeSource`] instead of the wall clock, so
//! playback, history commits and export settling can be driven deterministically in tests.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::{Duration, Instant};

/// Monotonic milliseconds plus a way to wait.
pub trait TimeSource {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> f64;
    /// Block the caller for `d`. Fake sources advance their own clock instead.
    fn sleep(&self, d: Duration);
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }

    fn sleep(&self, d: Duration) {
        (**self).sleep(d)
    }
}

/// Real monotonic time anchored at construction.
#[derive(Clone, Debug)]
pub struct SystemTimeSource {
    epoch: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Hand-driven time. Clones share the same clock.
#[derive(Clone, Debug, Default)]
pub struct ManualTimeSource {
    bits: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new(start_ms: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start_ms.to_bits())),
        }
    }

    pub fn set_ms(&self, ms: f64) {
        self.bits.store(ms.to_bits(), Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: f64) {
        self.set_ms(self.now_ms() + ms);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }

    fn sleep(&self, d: Duration) {
        self.advance_ms(d.as_secs_f64() * 1000.0);
    }
}

/// Trailing-edge debounce: every [`Debouncer::arm`] pushes the deadline out again.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms: delay_ms as f64,
            deadline: None,
        }
    }

    pub fn arm(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once per armed period, when `now_ms` reaches the deadline.
    pub fn fire_if_due(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
