use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HueRingError, Result};


/// An 8-bit per channel color with straight (non-premultiplied) alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RgbaColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// A color in Hue/Saturation/Value space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HsvColor {
    pub h: f64, // 0..360
    pub s: f64, // 0..1
    pub v: f64, // 0..1
    pub a: f64, // 0..1
}

impl RgbaColor {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Builds a color from the HSL model.
    ///
    /// `hue` is in `0..=360` degrees, the other components in `0..=1`.
    /// Channels are truncated, not rounded, when converted to bytes.
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Result<Self> {
        check_hue(hue)?;

        let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let m = lightness - 0.5 * chroma;
        Ok(from_sextant(hue, chroma, m, alpha))
    }

    /// Builds a color from the HSV model.
    ///
    /// Same ranges and byte truncation as [`RgbaColor::from_hsl`].
    pub fn from_hsv(hue: f64, saturation: f64, value: f64, alpha: f64) -> Result<Self> {
        check_hue(hue)?;

        let chroma = value * saturation;
        let m = value - chroma;
        Ok(from_sextant(hue, chroma, m, alpha))
    }

    pub fn to_hsv(self) -> HsvColor {
        const TO_UNIT: f64 = 1.0 / 255.0;

        let r = TO_UNIT * self.r as f64;
        let g = TO_UNIT * self.g as f64;
        let b = TO_UNIT * self.b as f64;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let chroma = max - min;

        let h1 = if chroma == 0.0 {
            0.0
        } else if max == r {
            (g - b) / chroma
        } else if max == g {
            2.0 + (b - r) / chroma
        } else {
            4.0 + (r - g) / chroma
        };

        let mut h = 60.0 * h1;
        if h < 0.0 {
            h += 360.0;
        }

        // Saturation is relative to value, so achromatic and black both land on 0.
        let s = if chroma == 0.0 { 0.0 } else { chroma / max };

        HsvColor {
            h,
            s,
            v: max,
            a: TO_UNIT * self.a as f64,
        }
    }

    /// Bytes in `B, G, R, A` order, low address first.
    #[inline]
    pub fn to_bgra8888(self) -> [u8; 4] {
        [self.b, self.g, self.r, self.a]
    }

    /// Bytes in `R, G, B, A` order, low address first.
    #[inline]
    pub fn to_rgba8888(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn from_bgra8888(bytes: [u8; 4]) -> Self {
        Self::new(bytes[2], bytes[1], bytes[0], bytes[3])
    }

    #[inline]
    pub fn from_rgba8888(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

impl HsvColor {
    pub fn to_rgba(self) -> Result<RgbaColor> {
        RgbaColor::from_hsv(self.h, self.s, self.v, self.a)
    }
}

fn check_hue(hue: f64) -> Result<()> {
    if (0.0..=360.0).contains(&hue) {
        Ok(())
    } else {
        Err(HueRingError::HueOutOfRange(hue))
    }
}

fn from_sextant(hue: f64, chroma: f64, m: f64, alpha: f64) -> RgbaColor {
    let h1 = hue / 60.0;
    let x = chroma * (1.0 - ((h1 % 2.0) - 1.0).abs());

    let (r1, g1, b1) = if h1 < 1.0 {
        (chroma, x, 0.0)
    } else if h1 < 2.0 {
        (x, chroma, 0.0)
    } else if h1 < 3.0 {
        (0.0, chroma, x)
    } else if h1 < 4.0 {
        (0.0, x, chroma)
    } else if h1 < 5.0 {
        (x, 0.0, chroma)
    } else {
        (chroma, 0.0, x)
    };

    RgbaColor {
        r: to_byte(r1 + m),
        g: to_byte(g1 + m),
        b: to_byte(b1 + m),
        a: to_byte(alpha),
    }
}

#[inline]
fn to_byte(component: f64) -> u8 {
    (255.0 * component) as u8
}

impl Display for RgbaColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}{:02X}",
            self.r, self.g, self.b, self.a
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color `{0}`, expected #RRGGBB or #RRGGBBAA")]
pub struct ParseColorError(String);

impl FromStr for RgbaColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) || !(hex.len() == 6 || hex.len() == 8) {
            return Err(err());
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

impl TryFrom<String> for RgbaColor {
    type Error = ParseColorError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RgbaColor> for String {
    fn from(color: RgbaColor) -> Self {
        color.to_string()
    }
}
