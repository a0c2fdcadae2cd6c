//! Repaint-aligned frame callbacks.
//!
//! The clock never sleeps or spawns. It asks a [`FrameScheduler`] for "the next frame" and the
//! host delivers that callback later by calling `PlaybackClock::on_frame` with the request id and
//! the frame timestamp. Cancelled or superseded ids are simply ignored by the clock.

use crate::foundation::time::TimeSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

pub trait FrameScheduler {
    /// Ask for one callback at the next display refresh.
    fn request_frame(&mut self) -> FrameRequestId;
    /// Withdraw a request. Unknown or already-fired ids are ignored.
    fn cancel_frame(&mut self, id: FrameRequestId);
}

/// Scheduler whose frames fire only when the host says so.
#[derive(Debug, Default)]
pub struct ManualFrameScheduler {
    next_id: u64,
    pending: Vec<FrameRequestId>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &[FrameRequestId] {
        &self.pending
    }

    /// Remove and return every outstanding request, oldest first.
    pub fn take_pending(&mut self) -> Vec<FrameRequestId> {
        std::mem::take(&mut self.pending)
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) -> FrameRequestId {
        self.next_id += 1;
        let id = FrameRequestId(self.next_id);
        self.pending.push(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.pending.retain(|p| *p != id);
    }
}

/// Fires outstanding requests on a fixed display-refresh grid read from a [`TimeSource`].
#[derive(Debug)]
pub struct RefreshScheduler<T: TimeSource> {
    time: T,
    interval_ms: f64,
    next_vsync_ms: f64,
    inner: ManualFrameScheduler,
}

impl<T: TimeSource> RefreshScheduler<T> {
    pub fn new(time: T, refresh_hz: u32) -> Self {
        let interval_ms = 1000.0 / f64::from(refresh_hz.max(1));
        let next_vsync_ms = time.now_ms() + interval_ms;
        Self {
            time,
            interval_ms,
            next_vsync_ms,
            inner: ManualFrameScheduler::new(),
        }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn has_pending(&self) -> bool {
        !self.inner.pending().is_empty()
    }

    /// Return the due requests and the refresh timestamp, if a refresh boundary has passed.
    pub fn poll(&mut self) -> Option<(Vec<FrameRequestId>, f64)> {
        let now = self.time.now_ms();
        if now < self.next_vsync_ms {
            return None;
        }
        let vsync = self.next_vsync_ms;
        let missed = ((now - vsync) / self.interval_ms).floor();
        self.next_vsync_ms = vsync + (missed + 1.0) * self.interval_ms;
        Some((self.inner.take_pending(), vsync + missed * self.interval_ms))
    }

    /// Wait for the next refresh boundary and return its due requests.
    pub fn wait_next(&mut self) -> (Vec<FrameRequestId>, f64) {
        loop {
            if let Some(due) = self.poll() {
                return due;
            }
            let wait_ms = (self.next_vsync_ms - self.time.now_ms()).max(0.001);
            self.time
                .sleep(std::time::Duration::from_secs_f64(wait_ms / 1000.0));
        }
    }
}

impl<T: TimeSource> FrameScheduler for RefreshScheduler<T> {
    fn request_frame(&mut self) -> FrameRequestId {
        self.inner.request_frame()
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        self.inner.cancel_frame(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::time::ManualTimeSource;

    #[test]
    fn manual_cancel_removes_request() {
        let mut s = ManualFrameScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        s.cancel_frame(a);
        assert_eq!(s.pending(), &[b]);
        assert_eq!(s.take_pending(), vec![b]);
        assert!(s.pending().is_empty());
    }

    #[test]
    fn refresh_fires_on_grid() {
        let time = ManualTimeSource::new(0.0);
        let mut s = RefreshScheduler::new(time.clone(), 50);
        let id = s.request_frame();
        assert!(s.poll().is_none());
        time.advance_ms(20.0);
        let (due, ts) = s.poll().unwrap();
        assert_eq!(due, vec![id]);
        assert_eq!(ts, 20.0);
        assert!(s.poll().is_none());
    }

    #[test]
    fn refresh_skips_missed_boundaries() {
        let time = ManualTimeSource::new(0.0);
        let mut s = RefreshScheduler::new(time.clone(), 100);
        time.advance_ms(35.0);
        let (_, ts) = s.poll().unwrap();
        assert_eq!(ts, 30.0);
        time.advance_ms(4.0);
        assert!(s.poll().is_none());
        time.advance_ms(1.0);
        assert!(s.poll().is_some());
    }

    #[test]
    fn wait_next_sleeps_until_boundary() {
        let time = ManualTimeSource::new(0.0);
        let mut s = RefreshScheduler::new(time.clone(), 100);
        let id = s.request_frame();
        let (due, ts) = s.wait_next();
        assert_eq!(due, vec![id]);
        assert_eq!(ts, 10.0);
        assert!(time.now_ms() >= 10.0);
    }
}
