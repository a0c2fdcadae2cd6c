//! Background fills for the software surface.

use crate::{
    foundation::core::{Rgba8, Vec2},
    scene::project::{BackgroundConfig, BackgroundKind},
};

const FALLBACK: Rgba8 = Rgba8::opaque(0x4f, 0x46, 0xe5);

/// What the software surface actually paints for a background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BackgroundFill {
    Solid(Rgba8),
    Linear { from: Rgba8, to: Rgba8, dir: Direction },
}

/// A CSS linear-gradient direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Direction {
    /// `to <side>` or `to <corner>`, as unit steps on each axis (`-1`, `0`, `1`).
    Toward { sx: i8, sy: i8 },
    /// Clockwise from "to top".
    Angle { deg: f64 },
}

impl Direction {
    pub const TO_BOTTOM: Direction = Direction::Toward { sx: 0, sy: 1 };

    /// Parse `to bottom right`, `to left`, `135deg`. Anything else reads as `to bottom`.
    pub fn parse(s: &str) -> Direction {
        let s = s.trim().to_ascii_lowercase();
        if let Some(deg) = s.strip_suffix("deg").and_then(|n| n.trim().parse::<f64>().ok())
            && deg.is_finite()
        {
            return Direction::Angle { deg };
        }
        let Some(rest) = s.strip_prefix("to ") else {
            return Self::TO_BOTTOM;
        };
        let (mut sx, mut sy) = (0i8, 0i8);
        for word in rest.split_whitespace() {
            match word {
                "left" => sx = -1,
                "right" => sx = 1,
                "top" => sy = -1,
                "bottom" => sy = 1,
                _ => return Self::TO_BOTTOM,
            }
        }
        if sx == 0 && sy == 0 {
            return Self::TO_BOTTOM;
        }
        Direction::Toward { sx, sy }
    }

    /// Unit gradient-line direction for a `w x h` box (y down).
    ///
    /// Corner directions follow CSS: the line is perpendicular to the diagonal that does not
    /// touch the target corner, so the corner itself gets the end color.
    pub fn unit(self, w: f64, h: f64) -> Vec2 {
        let v = match self {
            Direction::Toward { sx, sy } if sx != 0 && sy != 0 => {
                Vec2::new(f64::from(sx) * h, f64::from(sy) * w)
            }
            Direction::Toward { sx, sy } => Vec2::new(f64::from(sx), f64::from(sy)),
            Direction::Angle { deg } => {
                let r = deg.to_radians();
                Vec2::new(r.sin(), -r.cos())
            }
        };
        let len = v.hypot();
        if len > 0.0 { v / len } else { Vec2::new(0.0, 1.0) }
    }
}

impl BackgroundFill {
    pub fn from_config(bg: &BackgroundConfig) -> Self {
        let c1 = Rgba8::parse_or(&bg.color1, FALLBACK);
        match bg.kind {
            BackgroundKind::Solid => BackgroundFill::Solid(c1),
            BackgroundKind::Gradient => BackgroundFill::Linear {
                from: c1,
                to: Rgba8::parse_or(&bg.color2, c1),
                dir: Direction::parse(&bg.direction),
            },
            BackgroundKind::Pattern => BackgroundFill::Solid(
                bg.pattern
                    .as_ref()
                    .map_or(c1, |p| Rgba8::parse_or(&p.background_color, c1)),
            ),
            BackgroundKind::Mesh | BackgroundKind::Image => BackgroundFill::Solid(c1),
        }
    }
}

/// Gradient parameter in `[0, 1]` at pixel center `(x, y)` of a `w x h` box.
pub fn gradient_t(dir: Vec2, w: f64, h: f64, x: f64, y: f64) -> f64 {
    let length = (w * dir.x).abs() + (h * dir.y).abs();
    if length <= 0.0 {
        return 0.0;
    }
    let p = Vec2::new(x - w / 2.0, y - h / 2.0);
    (0.5 + p.dot(dir) / length).clamp(0.0, 1.0)
}

/// Render a straight-alpha linear gradient into an RGBA8 buffer.
pub fn linear_gradient_rgba8(from: Rgba8, to: Rgba8, dir: Direction, w: u32, h: u32) -> Vec<u8> {
    let (wf, hf) = (f64::from(w), f64::from(h));
    let unit = dir.unit(wf, hf);
    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    for y in 0..h {
        for x in 0..w {
            let t = gradient_t(unit, wf, hf, f64::from(x) + 0.5, f64::from(y) + 0.5);
            let c = from.lerp(to, t);
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            bytes[idx..idx + 4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_directions() {
        assert_eq!(
            Direction::parse("to bottom right"),
            Direction::Toward { sx: 1, sy: 1 }
        );
        assert_eq!(Direction::parse("to left"), Direction::Toward { sx: -1, sy: 0 });
        assert_eq!(Direction::parse("135deg"), Direction::Angle { deg: 135.0 });
        assert_eq!(Direction::parse("sideways"), Direction::TO_BOTTOM);
        assert_eq!(Direction::parse(""), Direction::TO_BOTTOM);
    }

    #[test]
    fn corner_gradient_hits_both_ends_at_corners() {
        let dir = Direction::parse("to bottom right").unit(100.0, 200.0);
        assert!((gradient_t(dir, 100.0, 200.0, 0.0, 0.0) - 0.0).abs() < 1e-9);
        assert!((gradient_t(dir, 100.0, 200.0, 100.0, 200.0) - 1.0).abs() < 1e-9);
        // The other two corners sit on the midline.
        assert!((gradient_t(dir, 100.0, 200.0, 100.0, 0.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn angle_matches_side_keyword() {
        let a = Direction::parse("90deg").unit(10.0, 10.0);
        let b = Direction::parse("to right").unit(10.0, 10.0);
        assert!((a - b).hypot() < 1e-9);
    }

    #[test]
    fn gradient_buffer_runs_top_to_bottom() {
        let from = Rgba8::opaque(0, 0, 0);
        let to = Rgba8::opaque(255, 255, 255);
        let bytes = linear_gradient_rgba8(from, to, Direction::TO_BOTTOM, 1, 4);
        assert!(bytes[0] < bytes[4] && bytes[4] < bytes[8] && bytes[8] < bytes[12]);
        assert_eq!(bytes[3], 255);
    }

    #[test]
    fn unsupported_kinds_fall_back_to_color1() {
        let bg = BackgroundConfig {
            kind: BackgroundKind::Mesh,
            color1: "#102030".to_owned(),
            ..BackgroundConfig::default()
        };
        assert_eq!(
            BackgroundFill::from_config(&bg),
            BackgroundFill::Solid(Rgba8::opaque(0x10, 0x20, 0x30))
        );
    }
}
