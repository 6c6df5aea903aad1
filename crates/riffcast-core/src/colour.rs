//! Line colours.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback line colour when none is configured
pub const DEFAULT_LINE_COLOUR: &str = "#EEEEEE";

/// Linear RGBA colour, all channels 0..1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Rgba {
    /// Opaque colour from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Same colour with a different alpha, clamped to 0..1
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// 8-bit channels with colour multiplied by alpha.
    ///
    /// Front-ends without real transparency fade text towards black with this.
    pub fn premultiplied_rgb8(&self) -> [u8; 3] {
        let scale = |c: f32| (c * self.a * 255.0).round().clamp(0.0, 255.0) as u8;
        [scale(self.r), scale(self.g), scale(self.b)]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::from_rgb8(0xEE, 0xEE, 0xEE)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to8 = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
        write!(
            f,
            "#{:02X}{:02X}{:02X}",
            to8(self.r),
            to8(self.g),
            to8(self.b)
        )
    }
}
