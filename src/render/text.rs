//! Title/subtitle overlay: shaping with `parley`, placement on the canvas.

use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{Canvas, Rgba8, Vec2},
        error::{MockshotError, MockshotResult},
    },
    scene::project::{TextAlign, TextConfig, TextPosition},
};

/// Horizontal padding of the text column.
pub const SIDE_PADDING: f64 = 80.0;
/// Distance from the anchored edge (top or bottom) to the text block.
pub const EDGE_PADDING: f64 = 128.0;
pub const TITLE_GAP: f64 = 24.0;
pub const SHADOW_OFFSET_Y: f64 = 4.0;
const SUBTITLE_OPACITY: f64 = 0.9;

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrush {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

impl From<TextBrush> for Rgba8 {
    fn from(b: TextBrush) -> Self {
        Self {
            r: b.r,
            g: b.g,
            b: b.b,
            a: b.a,
        }
    }
}

/// One shaped paragraph and where its box sits on the canvas.
pub struct TextBlock {
    pub layout: parley::Layout<TextBrush>,
    /// Top-left corner of the block's box.
    pub origin: Vec2,
    pub box_width: f64,
    pub align: TextAlign,
}

impl TextBlock {
    pub fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }

    /// Offset of a line of width `advance` inside the box.
    pub fn line_shift(&self, advance: f32) -> f64 {
        let slack = (self.box_width - f64::from(advance)).max(0.0);
        match self.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => slack / 2.0,
            TextAlign::Right => slack,
        }
    }
}

/// Where the text box lands: its left edge and width.
pub fn text_box(text: &TextConfig, canvas: Canvas) -> (f64, f64) {
    let column = (f64::from(canvas.width) - 2.0 * SIDE_PADDING).max(1.0);
    let pct = if text.max_width > 0.0 {
        text.max_width.min(100.0)
    } else {
        100.0
    };
    let width = column * pct / 100.0;
    let left = SIDE_PADDING
        + match text.alignment {
            TextAlign::Left => 0.0,
            TextAlign::Center => (column - width) / 2.0,
            TextAlign::Right => column - width,
        };
    (left, width)
}

/// Top of a block of `height` anchored per `position`.
pub fn block_top(position: TextPosition, height: f64, canvas: Canvas) -> f64 {
    match position {
        TextPosition::Top => EDGE_PADDING,
        TextPosition::Bottom => f64::from(canvas.height) - EDGE_PADDING - height,
    }
}

/// Shapes overlay text from one font face.
pub struct TextRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl TextRenderer {
    pub fn from_font_bytes(bytes: Vec<u8>) -> MockshotResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| MockshotError::validation("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MockshotError::validation("registered font family has no name"))?
            .to_owned();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
        })
    }

    pub fn load(path: &Path) -> MockshotResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_font_bytes(bytes)
    }

    /// Load `explicit` if given, else the first common system font that loads.
    pub fn discover(explicit: Option<&Path>) -> Option<Self> {
        let installed = SYSTEM_FONTS.iter().map(Path::new).filter(|p| p.exists());
        for path in explicit.into_iter().chain(installed) {
            match Self::load(path) {
                Ok(r) => {
                    tracing::debug!(path = %path.display(), family = %r.family, "overlay font loaded");
                    return Some(r);
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "font not usable"),
            }
        }
        None
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    #[allow(clippy::too_many_arguments)]
    fn shape(
        &mut self,
        text: &str,
        size_px: f64,
        weight: u16,
        letter_spacing: f64,
        line_height: f64,
        brush: TextBrush,
        max_width: f64,
    ) -> MockshotResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MockshotError::validation(
                "text size must be finite and > 0",
            ));
        }
        let family = self.family.clone();
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px as f32));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(weight)),
        ));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(
            letter_spacing as f32,
        ));
        if line_height > 0.0 {
            builder.push_default(parley::style::StyleProperty::LineHeight(
                parley::style::LineHeight::FontSizeRelative(line_height as f32),
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        let w = max_width as f32;
        layout.break_all_lines(Some(w));
        layout.align(
            Some(w),
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }

    /// Shape the title and subtitle and place them on `canvas`. Empty strings produce no block.
    #[tracing::instrument(skip(self, text), fields(family = %self.family))]
    pub fn layout_overlay(
        &mut self,
        text: &TextConfig,
        canvas: Canvas,
    ) -> MockshotResult<Vec<TextBlock>> {
        let (left, width) = text_box(text, canvas);
        let title_brush = Rgba8::parse_or(&text.title_color, Rgba8::WHITE);
        let subtitle_brush =
            Rgba8::parse_or(&text.subtitle_color, Rgba8::WHITE).with_alpha(SUBTITLE_OPACITY);

        let stock = TextConfig::default();
        let mut blocks = Vec::with_capacity(2);
        for (s, size, fallback, weight, brush) in [
            (&text.title, text.title_size, stock.title_size, text.title_weight, title_brush),
            (
                &text.subtitle,
                text.subtitle_size,
                stock.subtitle_size,
                text.subtitle_weight,
                subtitle_brush,
            ),
        ] {
            if s.trim().is_empty() {
                continue;
            }
            let size = if size.is_finite() && size > 0.0 {
                size
            } else {
                fallback
            };
            let layout = self.shape(
                s,
                size,
                weight,
                text.letter_spacing,
                text.line_height,
                brush.into(),
                width,
            )?;
            blocks.push(TextBlock {
                layout,
                origin: Vec2::ZERO,
                box_width: width,
                align: text.alignment,
            });
        }

        let gaps = blocks.len().saturating_sub(1) as f64 * TITLE_GAP;
        let total = blocks.iter().map(TextBlock::height).sum::<f64>() + gaps;
        let mut y = block_top(text.position, total, canvas);
        for block in &mut blocks {
            block.origin = Vec2::new(left, y);
            y += block.height() + TITLE_GAP;
        }
        Ok(blocks)
    }
}
