//! Mockshot builds app-store screenshot mockups: device frames over styled backgrounds,
//! animated with keyframe presets and exported as stills or animated GIFs.
//!
//! The pieces fit together like this:
//!
//! - A [`Project`] holds screens; each [`ScreenConfig`] places devices on a background.
//! - An [`AnimationConfig`] picks a preset; [`project`](scene::projection::project) turns it into
//!   per-device transforms at a normalized time, and a [`PlaybackClock`] advances that time.
//! - A [`RenderSurface`] paints [`SceneFrame`]s; [`capture_frame`] reads them back once settled.
//! - [`export_gif`] and [`export_still`] drive capture into encoded assets.
//! - [`History`] keeps debounced undo/redo; a [`ProjectStore`] persists the project; an
//!   [`EditorSession`] ties the two together.
#![forbid(unsafe_code)]

pub mod animation;
pub mod capture;
pub mod config;
pub mod editor;
pub mod export;
pub mod foundation;
pub mod history;
pub mod logging;
pub mod playback;
pub mod render;
pub mod scene;
pub mod storage;

pub use crate::animation::config::{AnimationConfig, PlaybackState};
pub use crate::animation::keyframe::{
    AnimProperty, Keyframe, KeyframeProps, TransformValues, interpolate,
};
pub use crate::animation::preset::{AnimationPreset, find_preset, presets};
pub use crate::capture::{CaptureOpts, CropRect, capture_frame, cover_crop_rect};
pub use crate::config::{EditorConfig, RenderSettings};
pub use crate::editor::EditorSession;
pub use crate::export::{
    BatchAsset, CancelToken, ClockSeek, EXPORT_SIZES, ExportPhase, ExportProgress, ExportSession,
    ExportSize, FramePlan, GifAsset, GifExportConfig, Seek, StillFormat, export_batch,
    export_gif, export_still,
};
pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{MockshotError, MockshotResult};
pub use crate::foundation::time::{ManualTimeSource, SystemTimeSource, TimeSource};
pub use crate::history::{History, HistoryOptions};
pub use crate::playback::clock::{PlaybackClock, PlaybackTick};
pub use crate::playback::scheduler::{
    FrameRequestId, FrameScheduler, ManualFrameScheduler, RefreshScheduler,
};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::surface::{RenderSurface, ViewTransform, with_neutralized_transform};
pub use crate::render::text::{TextBlock, TextRenderer};
pub use crate::scene::device::{DeviceDescriptor, DeviceModel, Platform, ShadowConfig};
pub use crate::scene::project::{
    BackgroundConfig, BackgroundKind, Project, Screen, ScreenConfig, ScreenTemplate,
    TemplateDevice, TextAlign, TextConfig, TextPosition, find_template, templates,
};
pub use crate::scene::projection::{AnimatedDevice, SceneFrame};
pub use crate::storage::{
    JsonFileStore, MemoryStore, ProjectStore, export_project, import_project,
};
