//! Frame capture: settle the surface, read it back, cover-crop to the requested size.

use image::imageops::FilterType;

use crate::{
    foundation::error::{MockshotError, MockshotResult},
    render::surface::{RenderSurface, with_neutralized_transform},
};

/// Paint cycles awaited after a submit before reading back. The first only styles the new
/// content; the second paints it.
pub const SETTLE_PAINT_CYCLES: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureOpts {
    /// Lower bound on the intermediate raster's scale over the logical canvas.
    pub min_pixel_ratio: f64,
    pub filter: FilterType,
}

impl CaptureOpts {
    pub const GIF: CaptureOpts = CaptureOpts {
        min_pixel_ratio: 1.0,
        filter: FilterType::Triangle,
    };

    pub const STILL: CaptureOpts = CaptureOpts {
        min_pixel_ratio: 2.0,
        filter: FilterType::Lanczos3,
    };
}

impl Default for CaptureOpts {
    fn default() -> Self {
        Self::GIF
    }
}

/// Source region, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The centered region of a `src_w x src_h` raster that fills `dst_w x dst_h` exactly when
/// scaled: the shorter side (relative to the target aspect) is kept whole and the overflow of
/// the other side is split evenly.
pub fn cover_crop_rect(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> CropRect {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return CropRect {
            x: 0,
            y: 0,
            width: src_w,
            height: src_h,
        };
    }
    let scale = (f64::from(dst_w) / f64::from(src_w)).max(f64::from(dst_h) / f64::from(src_h));
    let width = ((f64::from(dst_w) / scale).round() as u32).clamp(1, src_w);
    let height = ((f64::from(dst_h) / scale).round() as u32).clamp(1, src_h);
    CropRect {
        x: (src_w - width) / 2,
        y: (src_h - height) / 2,
        width,
        height,
    }
}

/// Capture whatever the surface shows once its pending content has painted.
///
/// The view transform is neutralized for the whole capture and restored on every exit path. A
/// detached surface fails with a capture error; callers abort rather than skip the frame.
#[tracing::instrument(skip(surface), fields(opts = ?opts))]
pub fn capture_frame<S>(
    surface: &mut S,
    width: u32,
    height: u32,
    opts: CaptureOpts,
) -> MockshotResult<image::RgbaImage>
where
    S: RenderSurface + ?Sized,
{
    if width == 0 || height == 0 {
        return Err(MockshotError::validation(format!(
            "capture size must be non-empty, got {width}x{height}"
        )));
    }
    if !surface.is_attached() {
        return Err(MockshotError::capture("render target is not attached"));
    }

    let canvas = surface.logical_size();
    let ratio = (f64::from(width) / f64::from(canvas.width))
        .max(f64::from(height) / f64::from(canvas.height))
        .max(opts.min_pixel_ratio);

    let frame = with_neutralized_transform(surface, |s| {
        for _ in 0..SETTLE_PAINT_CYCLES {
            s.wait_for_paint()?;
        }
        s.rasterize(ratio)
    })?;
    tracing::debug!(ratio, raster_w = frame.width, raster_h = frame.height, "rasterized");

    let raster = frame.into_rgba_image()?;
    let crop = cover_crop_rect(raster.width(), raster.height(), width, height);
    let cropped =
        image::imageops::crop_imm(&raster, crop.x, crop.y, crop.width, crop.height).to_image();
    if cropped.dimensions() == (width, height) {
        return Ok(cropped);
    }
    Ok(image::imageops::resize(&cropped, width, height, opts.filter))
}
