use std::ops::{Deref, DerefMut};

use crate::{
    foundation::{
        core::{Affine, Canvas, Vec2},
        error::MockshotResult,
    },
    render::frame::FrameRGBA,
    scene::projection::SceneFrame,
};

/// Editor viewport zoom and pan applied on top of the logical canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan: Vec2,
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        zoom: 1.0,
        pan: Vec2::new(0.0, 0.0),
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Zoom about the canvas center, then pan.
    pub fn to_affine(self, canvas: Canvas) -> Affine {
        let c = Vec2::new(f64::from(canvas.width) / 2.0, f64::from(canvas.height) / 2.0);
        Affine::translate(self.pan + c) * Affine::scale(self.zoom) * Affine::translate(-c)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A paint target whose visible content lags behind logical state.
///
/// `submit` hands over new scene content; it becomes visible only after the surface's own paint
/// cycles run, which callers observe through [`RenderSurface::wait_for_paint`]. `rasterize` reads
/// back whatever is currently painted.
pub trait RenderSurface {
    /// `false` once the surface has been torn down; nothing can be painted or read back.
    fn is_attached(&self) -> bool;

    fn logical_size(&self) -> Canvas;

    fn submit(&mut self, frame: SceneFrame);

    /// Block until the next paint-aligned callback has run.
    fn wait_for_paint(&mut self) -> MockshotResult<()>;

    /// Read back the painted content at `pixel_ratio` times the logical size.
    fn rasterize(&mut self, pixel_ratio: f64) -> MockshotResult<FrameRGBA>;

    fn view_transform(&self) -> ViewTransform;

    fn set_view_transform(&mut self, view: ViewTransform);
}

/// Scoped identity view transform. The previous transform comes back on drop, including during
/// unwinding.
pub struct NeutralizedTransform<'a, S: RenderSurface + ?Sized> {
    surface: &'a mut S,
    saved: ViewTransform,
}

impl<'a, S: RenderSurface + ?Sized> NeutralizedTransform<'a, S> {
    pub fn new(surface: &'a mut S) -> Self {
        let saved = surface.view_transform();
        surface.set_view_transform(ViewTransform::IDENTITY);
        Self { surface, saved }
    }
}

impl<S: RenderSurface + ?Sized> Deref for NeutralizedTransform<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: RenderSurface + ?Sized> DerefMut for NeutralizedTransform<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: RenderSurface + ?Sized> Drop for NeutralizedTransform<'_, S> {
    fn drop(&mut self) {
        self.surface.set_view_transform(self.saved);
    }
}

/// Run `f` with the surface's view transform reset to identity.
pub fn with_neutralized_transform<S, R>(surface: &mut S, f: impl FnOnce(&mut S) -> R) -> R
where
    S: RenderSurface + ?Sized,
{
    let mut guard = NeutralizedTransform::new(surface);
    f(&mut *guard)
}
