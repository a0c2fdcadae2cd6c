//! Animated and still export.
//!
//! The GIF pipeline owns playback for its whole run: it drives time through a [`Seek`]
//! collaborator, captures one frame per step, then encodes. [`ExportSession`] is how a caller
//! hands it the live [`PlaybackClock`] without anything else being able to play meanwhile.

pub mod gif;
pub mod still;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::{
    animation::config::AnimationConfig,
    foundation::{
        error::{MockshotError, MockshotResult},
        time::TimeSource,
    },
    playback::{clock::PlaybackClock, scheduler::FrameScheduler},
    render::surface::RenderSurface,
    scene::{project::ScreenConfig, projection::SceneFrame},
};

pub use self::gif::{FramePlan, GifAsset, GifExportConfig, export_gif};
pub use self::still::{
    BatchAsset, EXPORT_SIZES, ExportSize, StillFormat, export_batch, export_still,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportPhase {
    Capturing,
    Encoding,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportProgress {
    pub phase: ExportPhase,
    pub current: u32,
    pub total: u32,
    /// Overall completion in `[0, 1]`: capture covers the first half, encoding the second.
    pub fraction: f64,
}

/// Cooperative cancellation, checked between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> MockshotResult<()> {
        if self.is_cancelled() {
            return Err(MockshotError::Cancelled);
        }
        Ok(())
    }
}

/// Moves the scene to normalized time `t` and returns once the change has been handed to the
/// surface and given time to settle.
pub trait Seek<S: RenderSurface + ?Sized> {
    fn seek(&mut self, surface: &mut S, t: f64) -> MockshotResult<()>;
}

impl<S, F> Seek<S> for F
where
    S: RenderSurface + ?Sized,
    F: FnMut(&mut S, f64) -> MockshotResult<()>,
{
    fn seek(&mut self, surface: &mut S, t: f64) -> MockshotResult<()> {
        self(surface, t)
    }
}

/// Exclusive hold on the playback clock for the duration of an export.
///
/// Playback is paused on entry. On drop the clock goes back to where it was and resumes if it
/// had been playing.
pub struct ExportSession<'a, Sch: FrameScheduler> {
    clock: &'a mut PlaybackClock<Sch>,
    resume_at: f64,
    was_playing: bool,
}

impl<'a, Sch: FrameScheduler> ExportSession<'a, Sch> {
    pub fn new(clock: &'a mut PlaybackClock<Sch>) -> Self {
        let was_playing = clock.is_playing();
        let resume_at = clock.current_time();
        clock.pause();
        tracing::debug!(was_playing, resume_at, "export took playback control");
        Self {
            clock,
            resume_at,
            was_playing,
        }
    }

    /// The standard seek collaborator for `screen`, bound to this session's clock.
    pub fn seeker<'s, T: TimeSource>(
        &'s mut self,
        screen: &'s ScreenConfig,
        animation: &AnimationConfig,
        time: T,
        settle: Duration,
    ) -> ClockSeek<'s, Sch, T> {
        ClockSeek::new(self.clock, screen, animation, time, settle)
    }
}

impl<Sch: FrameScheduler> Drop for ExportSession<'_, Sch> {
    fn drop(&mut self) {
        self.clock.seek(self.resume_at);
        if self.was_playing {
            self.clock.play();
        }
    }
}

/// Seeks a [`PlaybackClock`], projects the screen at the new time, submits it, then waits out
/// the settle delay.
///
/// The settle delay is a fixed margin on top of the two paint cycles capture waits for; it does
/// not prove anything has painted.
pub struct ClockSeek<'a, Sch: FrameScheduler, T: TimeSource> {
    clock: &'a mut PlaybackClock<Sch>,
    screen: &'a ScreenConfig,
    animation: AnimationConfig,
    time: T,
    settle: Duration,
}

impl<'a, Sch: FrameScheduler, T: TimeSource> ClockSeek<'a, Sch, T> {
    /// Export renders the configured preset even while live preview is switched off.
    pub fn new(
        clock: &'a mut PlaybackClock<Sch>,
        screen: &'a ScreenConfig,
        animation: &AnimationConfig,
        time: T,
        settle: Duration,
    ) -> Self {
        Self {
            clock,
            screen,
            animation: AnimationConfig {
                enabled: true,
                ..animation.clone()
            },
            time,
            settle,
        }
    }
}

impl<S, Sch, T> Seek<S> for ClockSeek<'_, Sch, T>
where
    S: RenderSurface + ?Sized,
    Sch: FrameScheduler,
    T: TimeSource,
{
    fn seek(&mut self, surface: &mut S, t: f64) -> MockshotResult<()> {
        self.clock.seek(t);
        let mut frame =
            SceneFrame::from_screen(self.screen, &self.animation, self.clock.current_time());
        frame.canvas = surface.logical_size();
        surface.submit(frame);
        if !self.settle.is_zero() {
            self.time.sleep(self.settle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        foundation::{core::Canvas, time::ManualTimeSource},
        playback::scheduler::ManualFrameScheduler,
        render::cpu::CpuSurface,
    };

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(a.check().is_ok());
        b.cancel();
        assert!(matches!(a.check(), Err(MockshotError::Cancelled)));
    }

    #[test]
    fn session_pauses_and_restores_the_clock() {
        let cfg = AnimationConfig::for_preset("fade-in");
        let mut clock = PlaybackClock::new(ManualFrameScheduler::new(), &cfg);
        clock.seek(0.4);
        clock.play();
        {
            let mut session = ExportSession::new(&mut clock);
            let screen = ScreenConfig::new_default("s");
            let time = ManualTimeSource::new(0.0);
            let mut seek = session.seeker(&screen, &cfg, time.clone(), Duration::from_millis(50));
            let mut surface = CpuSurface::new(Canvas::new(60, 120).unwrap());
            seek.seek(&mut surface, 0.75).unwrap();
            assert_eq!(time.now_ms(), 50.0);
        }
        assert!(clock.is_playing());
        assert_eq!(clock.current_time(), 0.4);
    }

    #[test]
    fn clock_seek_submits_the_projected_frame() {
        let cfg = AnimationConfig {
            enabled: false,
            ..AnimationConfig::for_preset("slide-in-bottom")
        };
        let mut clock = PlaybackClock::new(ManualFrameScheduler::new(), &cfg);
        let screen = ScreenConfig::new_default("s");
        let canvas = Canvas::new(60, 120).unwrap();
        let mut surface = CpuSurface::new(canvas);
        let mut seek = ClockSeek::new(
            &mut clock,
            &screen,
            &cfg,
            ManualTimeSource::new(0.0),
            Duration::ZERO,
        );
        seek.seek(&mut surface, 1.5).unwrap();
        surface.wait_for_paint().unwrap();
        surface.wait_for_paint().unwrap();
        assert_eq!(surface.painted_time(), Some(1.0));
    }
}
