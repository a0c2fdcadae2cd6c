use crate::{
    animation::config::{AnimationConfig, PlaybackState},
    playback::scheduler::{FrameRequestId, FrameScheduler},
};

/// Published to observers whenever the playback position or state changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackTick {
    pub time: f64,
    pub is_playing: bool,
}

type Observer = Box<dyn FnMut(PlaybackTick)>;

/// Drives the normalized animation time forward on repaint-aligned callbacks.
///
/// Only one tick chain exists at a time: the clock holds at most one outstanding
/// [`FrameRequestId`] and ignores callbacks for any other id, so a cancelled request that still
/// fires cannot resurrect playback.
pub struct PlaybackClock<S: FrameScheduler> {
    scheduler: S,
    state: PlaybackState,
    current_time: f64,
    /// Timestamp that corresponds to `current_time == 0` for the running chain. Re-anchored lazily
    /// on the first frame after play/seek so playback continues from `current_time`.
    reference_start_ms: Option<f64>,
    pending: Option<FrameRequestId>,
    duration_ms: f64,
    loop_: bool,
    can_play: bool,
    observers: Vec<Observer>,
}

impl<S: FrameScheduler> PlaybackClock<S> {
    pub fn new(scheduler: S, config: &AnimationConfig) -> Self {
        let mut clock = Self {
            scheduler,
            state: PlaybackState::Stopped,
            current_time: 0.0,
            reference_start_ms: None,
            pending: None,
            duration_ms: 0.0,
            loop_: false,
            can_play: false,
            observers: Vec::new(),
        };
        clock.apply_config(config);
        clock
    }

    /// Pick up duration, loop and enablement changes. Disabling animation stops playback.
    pub fn apply_config(&mut self, config: &AnimationConfig) {
        let duration_ms = f64::from(config.effective_duration_ms());
        if duration_ms != self.duration_ms {
            self.reference_start_ms = None;
        }
        self.duration_ms = duration_ms;
        self.loop_ = config.loop_;
        self.can_play = config.active_preset().is_some();
        if !self.can_play && self.state != PlaybackState::Stopped {
            self.stop();
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(PlaybackTick) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Start or resume. No-op when animation is disabled or already playing.
    pub fn play(&mut self) {
        if !self.can_play {
            tracing::debug!("play ignored: animation disabled or no preset");
            return;
        }
        if self.state == PlaybackState::Playing {
            return;
        }
        if !self.loop_ && self.current_time >= 1.0 {
            self.current_time = 0.0;
        }
        tracing::debug!(from = self.current_time, "playback started");
        self.state = PlaybackState::Playing;
        self.reference_start_ms = None;
        self.schedule();
        self.publish();
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.state = PlaybackState::Paused;
        self.cancel_pending();
        self.reference_start_ms = None;
        tracing::debug!(at = self.current_time, "playback paused");
        self.publish();
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.cancel_pending();
        self.reference_start_ms = None;
        self.current_time = 0.0;
        tracing::debug!("playback stopped");
        self.publish();
    }

    /// Jump to `t` (clamped to `[0, 1]`) without changing the play/pause state.
    pub fn seek(&mut self, t: f64) {
        self.current_time = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        self.reference_start_ms = None;
        self.publish();
    }

    /// Deliver a frame callback. Returns `false` for stale or foreign ids.
    pub fn on_frame(&mut self, id: FrameRequestId, timestamp_ms: f64) -> bool {
        if self.pending != Some(id) {
            tracing::trace!(?id, "ignoring stale frame callback");
            return false;
        }
        self.pending = None;
        if self.state != PlaybackState::Playing {
            return false;
        }

        let duration = self.duration_ms;
        let current = self.current_time;
        let start = *self
            .reference_start_ms
            .get_or_insert(timestamp_ms - current * duration);
        let elapsed = timestamp_ms - start;
        let mut progress = if duration > 0.0 {
            elapsed / duration
        } else {
            1.0
        };

        if self.loop_ {
            progress = progress.rem_euclid(1.0);
        } else if progress >= 1.0 {
            progress = 1.0;
            self.state = PlaybackState::Stopped;
            self.reference_start_ms = None;
            tracing::debug!("one-shot playback finished");
        }

        self.current_time = progress.clamp(0.0, 1.0);
        self.publish();
        if self.state == PlaybackState::Playing {
            self.schedule();
        }
        true
    }

    fn schedule(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            self.scheduler.cancel_frame(id);
        }
    }

    fn publish(&mut self) {
        let tick = PlaybackTick {
            time: self.current_time,
            is_playing: self.is_playing(),
        };
        for observer in &mut self.observers {
            observer(tick);
        }
    }
}

impl<S: FrameScheduler> std::fmt::Debug for PlaybackClock<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("state", &self.state)
            .field("current_time", &self.current_time)
            .field("duration_ms", &self.duration_ms)
            .field("loop", &self.loop_)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
