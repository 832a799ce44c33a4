use std::f64::consts::PI;
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A point in local, top-left origin, Y-down coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A width/height pair; either side may be NaN before the first layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[inline]
pub const fn point(x: f64, y: f64) -> Point {
    Point { x, y }
}

#[inline]
pub const fn size(width: f64, height: f64) -> Size {
    Size { width, height }
}

impl Point {
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Size {
    /// Layout has not produced a size yet.
    pub const UNKNOWN: Self = Self {
        width: f64::NAN,
        height: f64::NAN,
    };

    #[inline]
    pub fn is_nan(&self) -> bool {
        self.width.is_nan() || self.height.is_nan()
    }

    #[inline]
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    #[inline]
    pub fn center(&self) -> Point {
        point(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl Display for Size {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The point at `degrees` on a circle, where 0° points up and angles grow clockwise.
#[inline]
pub fn point_on_circle(center: Point, radius: f64, degrees: f64) -> Point {
    let radians = degrees * PI / 180.0;
    point(
        center.x + radians.sin() * radius,
        center.y - radians.cos() * radius,
    )
}

/// The compass angle of `p` seen from `center`, in `0..360`.
///
/// Inverse of [`point_on_circle`]: 0° is up and angles grow clockwise.
#[inline]
pub fn compass_degrees(center: Point, p: Point) -> f64 {
    let degrees = (p.y - center.y).atan2(p.x - center.x).to_degrees();
    (degrees + 360.0 + 90.0) % 360.0
}
