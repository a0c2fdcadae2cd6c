use crate::foundation::error::{MockshotError, MockshotResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Logical width of the editor canvas, in CSS-like pixels.
pub const CANVAS_WIDTH: u32 = 1242;
/// Logical height of the editor canvas.
pub const CANVAS_HEIGHT: u32 = 2208;

/// Pixel dimensions of a canvas or raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub const EDITOR: Canvas = Canvas {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
    };

    pub fn new(width: u32, height: u32) -> MockshotResult<Self> {
        if width == 0 || height == 0 {
            return Err(MockshotError::validation(format!(
                "canvas must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn aspect(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Scale this canvas by `ratio`, rounding up so the result never falls below the request.
    pub fn scaled(self, ratio: f64) -> Self {
        Self {
            width: (f64::from(self.width) * ratio).ceil().max(1.0) as u32,
            height: (f64::from(self.height) * ratio).ceil().max(1.0) as u32,
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Rgba8 = Rgba8::opaque(0, 0, 0);
    pub const WHITE: Rgba8 = Rgba8::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn parse_hex(s: &str) -> MockshotResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> MockshotResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| MockshotError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(MockshotError::validation("hex color must be ascii"));
        }
        match s.len() {
            6 => Ok(Self::opaque(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a: hex_byte(&s[6..8])?,
            }),
            _ => Err(MockshotError::validation(
                "hex color must be #RRGGBB or #RRGGBBAA",
            )),
        }
    }

    /// Like [`Rgba8::parse_hex`] but falls back to `fallback` on malformed input.
    pub fn parse_or(s: &str, fallback: Rgba8) -> Self {
        Self::parse_hex(s).unwrap_or(fallback)
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: (f64::from(self.a) * alpha.clamp(0.0, 1.0)).round() as u8,
            ..self
        }
    }

    pub fn lerp(self, other: Rgba8, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }
        Self {
            r: lerp_u8(self.r, other.r, t),
            g: lerp_u8(self.g, other.g, t),
            b: lerp_u8(self.b, other.b, t),
            a: lerp_u8(self.a, other.a, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_rejects_empty() {
        assert!(Canvas::new(0, 10).is_err());
        assert!(Canvas::new(10, 0).is_err());
        assert_eq!(Canvas::new(3, 4).unwrap(), Canvas { width: 3, height: 4 });
    }

    #[test]
    fn scaled_never_shrinks_below_request() {
        let c = Canvas::EDITOR.scaled(414.0 / 1242.0);
        assert!(c.width >= 414);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Rgba8::parse_hex("#4f46e5").unwrap(), Rgba8::opaque(0x4f, 0x46, 0xe5));
        assert_eq!(
            Rgba8::parse_hex("00000080").unwrap(),
            Rgba8 {
                r: 0,
                g: 0,
                b: 0,
                a: 0x80
            }
        );
        assert!(Rgba8::parse_hex("#fff").is_err());
        assert!(Rgba8::parse_hex("#zzzzzz").is_err());
        assert_eq!(Rgba8::parse_or("bogus", Rgba8::BLACK), Rgba8::BLACK);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Rgba8::opaque(0, 0, 0);
        let b = Rgba8::opaque(255, 100, 10);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }
}
