use crate::foundation::error::{JayverseError, JayverseResult};

pub use kurbo::{Affine, Point, Rect};

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    /// Build an opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a CSS hex color: `#RGB`, `#RRGGBB` or `#RRGGBBAA` (the `#` is optional).
    pub fn from_hex(s: &str) -> JayverseResult<Self> {
        let raw = s.trim();
        let hex = raw.strip_prefix('#').unwrap_or(raw);
        let bad = || JayverseError::validation(format!("invalid hex color '{raw}'"));
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| bad());
        match hex.len() {
            3 => {
                let nib = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| bad())
                };
                Ok(Self::opaque(nib(0)?, nib(1)?, nib(2)?))
            }
            6 => Ok(Self::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(bad()),
        }
    }

    /// Format as `#RRGGBB` (or `#RRGGBBAA` when not opaque).
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Fixed axis-aligned rectangle on a mockup template where an overlay is placed.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacementRect {
    /// Left edge in template pixels.
    pub x: f64,
    /// Top edge in template pixels.
    pub y: f64,
    /// Width in template pixels.
    pub width: f64,
    /// Height in template pixels.
    pub height: f64,
}

impl PlacementRect {
    /// Create a validated placement rect (finite, non-negative size).
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> JayverseResult<Self> {
        let all_finite = [x, y, width, height].iter().all(|v| v.is_finite());
        if !all_finite || width <= 0.0 || height <= 0.0 {
            return Err(JayverseError::validation(
                "placement rect must be finite with width and height > 0",
            ));
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Centroid of the rectangle.
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Convert into a `kurbo` rectangle.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
