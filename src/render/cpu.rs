use std::{collections::HashMap, sync::Arc};

use anyhow::Context as _;
use vello_cpu::kurbo::Shape as _;

use crate::{
    foundation::{
        core::{Affine, Canvas, Rgba8, Vec2},
        error::{MockshotError, MockshotResult},
    },
    render::{
        background::{BackgroundFill, Direction, linear_gradient_rgba8},
        frame::{FrameRGBA, premultiply_rgba8_in_place},
        surface::{RenderSurface, ViewTransform},
        text::{SHADOW_OFFSET_Y, TextBlock, TextRenderer},
    },
    scene::{device::DeviceDescriptor, project::TextConfig, projection::SceneFrame},
};

const SCREEN_PLACEHOLDER: Rgba8 = Rgba8::opaque(0x11, 0x18, 0x27);
const SHADOW_LAYERS: u32 = 4;
/// Below this the squash from a 3D tilt would collapse the device to a line.
const MIN_TILT_FACTOR: f64 = 0.05;

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct GradientKey {
    from: Rgba8,
    to: Rgba8,
    dir: Direction,
    canvas: Canvas,
}

/// Software render surface on `vello_cpu`.
///
/// Paint is two-staged like a browser compositor: a paint cycle first styles the most recent
/// submission, and only the following cycle makes it visible. A capture must therefore wait two
/// cycles after a submit to read the new content.
pub struct CpuSurface {
    canvas: Canvas,
    view: ViewTransform,
    attached: bool,
    submitted: Option<SceneFrame>,
    styled: Option<SceneFrame>,
    painted: Option<SceneFrame>,
    paint_cycles: u64,
    ctx: Option<vello_cpu::RenderContext>,
    images: HashMap<String, Option<ImagePaint>>,
    gradient: Option<(GradientKey, vello_cpu::Image)>,
    text: Option<TextRenderer>,
    text_blocks: Option<(TextConfig, Canvas, Vec<TextBlock>)>,
}

impl CpuSurface {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            view: ViewTransform::IDENTITY,
            attached: true,
            submitted: None,
            styled: None,
            painted: None,
            paint_cycles: 0,
            ctx: None,
            images: HashMap::new(),
            gradient: None,
            text: None,
            text_blocks: None,
        }
    }

    /// Draw title/subtitle overlays with `renderer`. Without one, text is skipped.
    pub fn with_text_renderer(mut self, renderer: TextRenderer) -> Self {
        self.set_text_renderer(Some(renderer));
        self
    }

    pub fn set_text_renderer(&mut self, renderer: Option<TextRenderer>) {
        self.text = renderer;
        self.text_blocks = None;
    }

    pub fn has_text_renderer(&self) -> bool {
        self.text.is_some()
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn paint_cycles(&self) -> u64 {
        self.paint_cycles
    }

    /// Animation time of the scene currently visible, if any.
    pub fn painted_time(&self) -> Option<f64> {
        self.painted.as_ref().map(|f| f.time)
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> MockshotResult<R>,
    ) -> MockshotResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn image_paint_for(&mut self, path: &str) -> Option<ImagePaint> {
        if let Some(cached) = self.images.get(path) {
            return cached.clone();
        }
        let loaded = match load_image_paint(path) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(path, error = %e, "screenshot could not be loaded, drawing placeholder");
                None
            }
        };
        self.images.insert(path.to_owned(), loaded.clone());
        loaded
    }

    fn gradient_paint(&mut self, key: GradientKey) -> MockshotResult<vello_cpu::Image> {
        if let Some((k, img)) = &self.gradient
            && *k == key
        {
            return Ok(img.clone());
        }
        let (w, h) = (key.canvas.width, key.canvas.height);
        let mut bytes = linear_gradient_rgba8(key.from, key.to, key.dir, w, h);
        premultiply_rgba8_in_place(&mut bytes);
        let img = rgba_premul_to_image(&bytes, w, h)?;
        self.gradient = Some((key, img.clone()));
        Ok(img)
    }

    fn draw_scene(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        frame: &SceneFrame,
        base: Affine,
    ) -> MockshotResult<()> {
        let (cw, ch) = (f64::from(frame.canvas.width), f64::from(frame.canvas.height));
        ctx.set_transform(affine_to_cpu(base));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        match BackgroundFill::from_config(&frame.background) {
            BackgroundFill::Solid(c) => ctx.set_paint(color(c)),
            BackgroundFill::Linear { from, to, dir } => {
                let img = self.gradient_paint(GradientKey {
                    from,
                    to,
                    dir,
                    canvas: frame.canvas,
                })?;
                ctx.set_paint(img);
            }
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, cw, ch));

        for animated in &frame.devices {
            if animated.opacity <= 0.0 {
                continue;
            }
            let local = device_transform(&animated.device, frame.canvas);
            let image = animated
                .device
                .image
                .as_deref()
                .and_then(|p| self.image_paint_for(p));
            draw_device(
                ctx,
                base * local,
                &animated.device,
                image.as_ref(),
                animated.opacity as f32,
            );
        }
        self.draw_text(ctx, frame, base)
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        frame: &SceneFrame,
        base: Affine,
    ) -> MockshotResult<()> {
        let Some(renderer) = self.text.as_mut() else {
            return Ok(());
        };
        let stale = !matches!(
            &self.text_blocks,
            Some((text, canvas, _)) if *text == frame.text && *canvas == frame.canvas
        );
        if stale {
            let blocks = renderer.layout_overlay(&frame.text, frame.canvas)?;
            self.text_blocks = Some((frame.text.clone(), frame.canvas, blocks));
        }
        let Some((_, _, blocks)) = &self.text_blocks else {
            return Ok(());
        };

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if frame.text.text_shadow {
            let shadow = Rgba8::parse_or(&frame.text.text_shadow_color, Rgba8::BLACK);
            for block in blocks {
                let font = renderer.font();
                draw_text_block(ctx, font, block, base, SHADOW_OFFSET_Y, Some(shadow));
            }
        }
        for block in blocks {
            draw_text_block(ctx, renderer.font(), block, base, 0.0, None);
        }
        Ok(())
    }
}

impl RenderSurface for CpuSurface {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn logical_size(&self) -> Canvas {
        self.canvas
    }

    fn submit(&mut self, frame: SceneFrame) {
        self.submitted = Some(frame);
    }

    fn wait_for_paint(&mut self) -> MockshotResult<()> {
        if !self.attached {
            return Err(MockshotError::capture(
                "render target detached while waiting for paint",
            ));
        }
        if let Some(styled) = self.styled.take() {
            self.painted = Some(styled);
        }
        self.styled = self.submitted.take();
        self.paint_cycles += 1;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(canvas = ?self.canvas))]
    fn rasterize(&mut self, pixel_ratio: f64) -> MockshotResult<FrameRGBA> {
        if !self.attached {
            return Err(MockshotError::capture("render target is detached"));
        }
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 {
            return Err(MockshotError::validation(format!(
                "pixel ratio must be positive, got {pixel_ratio}"
            )));
        }
        let frame = self
            .painted
            .clone()
            .ok_or_else(|| MockshotError::capture("nothing has been painted yet"))?;

        let size = self.canvas.scaled(pixel_ratio);
        let w: u16 = size
            .width
            .try_into()
            .map_err(|_| MockshotError::capture("raster width exceeds u16"))?;
        let h: u16 = size
            .height
            .try_into()
            .map_err(|_| MockshotError::capture("raster height exceeds u16"))?;

        let base = Affine::scale(pixel_ratio) * self.view.to_affine(self.canvas);
        let data = self.with_ctx_mut(w, h, |this, ctx| {
            this.draw_scene(ctx, &frame, base)?;
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(pixmap.data_as_u8_slice().to_vec())
        })?;

        FrameRGBA::new(size.width, size.height, data, true)
    }

    fn view_transform(&self) -> ViewTransform {
        self.view
    }

    fn set_view_transform(&mut self, view: ViewTransform) {
        self.view = view;
    }
}

/// Device-local (frame artwork at layout size) to canvas coordinates.
///
/// 3D tilt is flattened to the squash it produces when viewed head-on.
pub fn device_transform(d: &DeviceDescriptor, canvas: Canvas) -> Affine {
    let size = d.model.layout_size();
    let center = Vec2::new(
        f64::from(canvas.width) / 2.0 + d.x,
        f64::from(canvas.height) / 2.0 + d.y,
    );
    let squash_x = d.rotation_y.to_radians().cos().abs().max(MIN_TILT_FACTOR);
    let squash_y = d.rotation_x.to_radians().cos().abs().max(MIN_TILT_FACTOR);
    Affine::translate(center)
        * Affine::scale_non_uniform(squash_x, squash_y)
        * Affine::rotate(d.rotation_z.to_radians())
        * Affine::scale(d.scale)
        * Affine::translate(-size / 2.0)
}

fn draw_device(
    ctx: &mut vello_cpu::RenderContext,
    transform: Affine,
    d: &DeviceDescriptor,
    image: Option<&ImagePaint>,
    opacity: f32,
) {
    let g = d.model.geometry();
    let size = d.model.layout_size();
    let k = size.x / g.frame_size.x;

    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }

    if d.shadow.enabled && d.shadow.opacity > 0.0 {
        let shadow = Rgba8::parse_or(&d.shadow.color, Rgba8::BLACK);
        let per_layer = d.shadow.opacity.clamp(0.0, 1.0) / f64::from(SHADOW_LAYERS);
        ctx.set_paint(color(shadow.with_alpha(per_layer)));
        for i in 0..SHADOW_LAYERS {
            let spread = d.shadow.blur.max(0.0) * f64::from(i + 1) / f64::from(SHADOW_LAYERS) * 0.5;
            let rr = vello_cpu::kurbo::RoundedRect::new(
                -spread,
                d.shadow.offset_y - spread,
                size.x + spread,
                size.y + d.shadow.offset_y + spread,
                g.corner_radius * k + spread,
            );
            ctx.fill_path(&rr.to_path(0.1));
        }
    }

    let frame = vello_cpu::kurbo::RoundedRect::new(0.0, 0.0, size.x, size.y, g.corner_radius * k);
    ctx.set_paint(color(g.frame_color));
    ctx.fill_path(&frame.to_path(0.1));

    let inset = g.screen_inset * size.x;
    let screen = vello_cpu::kurbo::Rect::new(inset, inset, size.x - inset, size.y - inset);
    let screen_path = screen
        .to_rounded_rect(g.screen_radius * k)
        .to_path(0.1);
    match image {
        Some(img) => {
            let (iw, ih) = (f64::from(img.w), f64::from(img.h));
            let s = (screen.width() / iw).max(screen.height() / ih);
            let offset = Vec2::new(
                screen.x0 + (screen.width() - iw * s) / 2.0,
                screen.y0 + (screen.height() - ih * s) / 2.0,
            );
            ctx.set_paint(img.paint.clone());
            ctx.set_paint_transform(affine_to_cpu(Affine::translate(offset) * Affine::scale(s)));
            ctx.fill_path(&screen_path);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        }
        None => {
            ctx.set_paint(color(SCREEN_PLACEHOLDER));
            ctx.fill_path(&screen_path);
        }
    }

    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

/// Paint one shaped block, optionally as a flat `tint` (for the drop shadow).
fn draw_text_block(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    block: &TextBlock,
    base: Affine,
    dy: f64,
    tint: Option<Rgba8>,
) {
    for line in block.layout.lines() {
        let shift = block.line_shift(line.metrics().advance);
        let origin = block.origin + Vec2::new(shift, dy);
        ctx.set_transform(affine_to_cpu(base * Affine::translate(origin)));
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = tint.unwrap_or_else(|| run.style().brush.into());
            ctx.set_paint(color(brush));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn load_image_paint(path: &str) -> MockshotResult<ImagePaint> {
    let img = image::open(path)
        .with_context(|| format!("decode screenshot '{path}'"))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    let mut bytes = img.into_raw();
    premultiply_rgba8_in_place(&mut bytes);
    Ok(ImagePaint {
        paint: rgba_premul_to_image(&bytes, w, h)?,
        w,
        h,
    })
}

fn color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> MockshotResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| MockshotError::capture("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| MockshotError::capture("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(MockshotError::capture("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn rgba_premul_to_image(bytes: &[u8], width: u32, height: u32) -> MockshotResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
