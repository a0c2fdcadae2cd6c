use crate::{
    animation::config::AnimationConfig,
    capture::{CaptureOpts, capture_frame},
    export::{CancelToken, ExportPhase, ExportProgress, Seek},
    foundation::error::{MockshotError, MockshotResult},
    render::surface::RenderSurface,
    scene::project::now_millis,
};

pub const GIF_MIME: &str = "image/gif";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GifExportConfig {
    pub fps: u32,
    /// `1..=10`; higher trades encode time for palette quality.
    pub quality: u8,
    pub width: u32,
    pub height: u32,
}

impl Default for GifExportConfig {
    fn default() -> Self {
        Self {
            fps: 15,
            quality: 8,
            width: 414,
            height: 736,
        }
    }
}

impl GifExportConfig {
    pub fn validate(&self) -> MockshotResult<()> {
        if !(1..=60).contains(&self.fps) {
            return Err(MockshotError::validation(format!(
                "gif fps must be in 1..=60, got {}",
                self.fps
            )));
        }
        if !(1..=10).contains(&self.quality) {
            return Err(MockshotError::validation(format!(
                "gif quality must be in 1..=10, got {}",
                self.quality
            )));
        }
        let max = u32::from(u16::MAX);
        if self.width == 0 || self.height == 0 || self.width > max || self.height > max {
            return Err(MockshotError::validation(format!(
                "gif size {}x{} is out of range",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// NeuQuant sampling factor for the `gif` encoder (1 is slowest and best).
    pub fn encoder_speed(&self) -> i32 {
        1 + (10 - i32::from(self.quality.clamp(1, 10))) * 3
    }
}

/// How many frames an export captures and how long each is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramePlan {
    pub total_frames: u32,
    pub frame_delay_ms: u32,
}

impl FramePlan {
    /// `ceil(duration_s * fps)` frames, each shown for `round(1000 / fps)` ms.
    pub fn new(duration_ms: u32, fps: u32) -> MockshotResult<Self> {
        if fps == 0 {
            return Err(MockshotError::validation("fps must be positive"));
        }
        let total = (u64::from(duration_ms) * u64::from(fps)).div_ceil(1000);
        let total_frames = u32::try_from(total)
            .map_err(|_| MockshotError::validation("frame count overflows u32"))?;
        Ok(Self {
            total_frames,
            frame_delay_ms: (1000 + fps / 2) / fps,
        })
    }

    /// Normalized time of frame `i`. The first frame is at 0 and the last at 1.
    pub fn time_at(&self, i: u32) -> f64 {
        if self.total_frames <= 1 {
            return 0.0;
        }
        f64::from(i) / f64::from(self.total_frames - 1)
    }
}

/// An encoded animation ready to be written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GifAsset {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub file_name: String,
}

/// Capture every frame of the selected preset and encode them as one animated GIF.
///
/// Frames are captured strictly in order, each only after its seek has settled. Any capture
/// failure aborts the export.
#[tracing::instrument(
    skip(surface, animation, seek, on_progress, cancel),
    fields(preset = ?animation.preset_id)
)]
pub fn export_gif<S, K>(
    surface: &mut S,
    animation: &AnimationConfig,
    config: &GifExportConfig,
    seek: &mut K,
    mut on_progress: impl FnMut(ExportProgress),
    cancel: &CancelToken,
) -> MockshotResult<GifAsset>
where
    S: RenderSurface + ?Sized,
    K: Seek<S> + ?Sized,
{
    let preset = animation
        .preset()
        .ok_or_else(|| MockshotError::no_preset("no animation preset selected"))?;
    config.validate()?;

    let plan = FramePlan::new(animation.effective_duration_ms(), config.fps)?;
    tracing::info!(
        preset = preset.id,
        frames = plan.total_frames,
        delay_ms = plan.frame_delay_ms,
        "exporting gif"
    );

    let mut frames = Vec::with_capacity(plan.total_frames as usize);
    for i in 0..plan.total_frames {
        cancel.check()?;
        seek.seek(surface, plan.time_at(i))?;
        frames.push(capture_frame(surface, config.width, config.height, CaptureOpts::GIF)?);
        on_progress(ExportProgress {
            phase: ExportPhase::Capturing,
            current: i + 1,
            total: plan.total_frames,
            fraction: f64::from(i + 1) / f64::from(plan.total_frames) * 0.5,
        });
    }

    let bytes = encode_gif(
        frames,
        config,
        plan.frame_delay_ms,
        animation.loop_,
        cancel,
        &mut on_progress,
    )?;
    Ok(GifAsset {
        bytes,
        mime: GIF_MIME,
        file_name: format!("mockup-animation-{}.gif", now_millis()),
    })
}

/// Encode captured frames, all `config.width x config.height`.
pub fn encode_gif(
    frames: Vec<image::RgbaImage>,
    config: &GifExportConfig,
    frame_delay_ms: u32,
    looping: bool,
    cancel: &CancelToken,
    on_progress: &mut dyn FnMut(ExportProgress),
) -> MockshotResult<Vec<u8>> {
    if frames.is_empty() {
        return Err(MockshotError::encode("no frames to encode"));
    }
    let w: u16 = config
        .width
        .try_into()
        .map_err(|_| MockshotError::encode("gif width exceeds u16"))?;
    let h: u16 = config
        .height
        .try_into()
        .map_err(|_| MockshotError::encode("gif height exceeds u16"))?;
    let delay_cs = u16::try_from((frame_delay_ms + 5) / 10)
        .map_err(|_| MockshotError::encode("frame delay too long for gif"))?;
    let speed = config.encoder_speed();
    let total = frames.len() as u32;

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, w, h, &[])?;
        // No loop extension means "play once".
        if looping {
            encoder.set_repeat(gif::Repeat::Infinite)?;
        }
        for (i, img) in frames.into_iter().enumerate() {
            cancel.check()?;
            if img.dimensions() != (config.width, config.height) {
                return Err(MockshotError::encode(format!(
                    "frame {i} is {}x{}, expected {}x{}",
                    img.width(),
                    img.height(),
                    config.width,
                    config.height
                )));
            }
            let mut rgba = img.into_raw();
            let mut frame = gif::Frame::from_rgba_speed(w, h, &mut rgba, speed);
            frame.delay = delay_cs;
            encoder.write_frame(&frame)?;

            let done = i as u32 + 1;
            on_progress(ExportProgress {
                phase: ExportPhase::Encoding,
                current: done,
                total,
                fraction: 0.5 + f64::from(done) / f64::from(total) * 0.5,
            });
        }
    }
    tracing::debug!(bytes = out.len(), "gif encoded");
    Ok(out)
}
