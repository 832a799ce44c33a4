use crate::geometry::{Point, Size, compass_degrees, point};

/// Mouse buttons held during a pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerButtons {
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

impl PointerButtons {
    pub const NONE: Self = Self {
        left: false,
        middle: false,
        right: false,
    };

    pub const LEFT: Self = Self {
        left: true,
        middle: false,
        right: false,
    };

    #[inline]
    pub fn any(self) -> bool {
        self.left || self.middle || self.right
    }
}

/// Maps a pointer position, local to the ring image, to the hue under it.
///
/// Uses the ring's convention: 0° is straight up from the image center and
/// hue grows clockwise, wrapping at 360.
pub fn pointer_to_hue(pointer: Point, image_size: Size) -> f64 {
    compass_degrees(image_size.center(), pointer)
}

pub(crate) fn coerce_minimum(minimum: f64) -> f64 {
    if minimum < 0.0 { 0.0 } else { minimum }
}

pub(crate) fn coerce_maximum(maximum: f64) -> f64 {
    if maximum > 360.0 { 360.0 } else { maximum }
}

/// Clamps into `minimum..=maximum` without panicking on an inverted range.
pub(crate) fn clamp_value(value: f64, minimum: f64, maximum: f64) -> f64 {
    value.max(minimum).min(maximum)
}

/// Whether `bounds` leaves room for a visible ring plus the thumb border on both sides.
pub(crate) fn fits_ring(bounds: Size, ring_thickness: f64, border_thickness: f64) -> bool {
    let min_side = 2.0 * (ring_thickness + border_thickness);
    !bounds.is_nan() && bounds.width > min_side && bounds.height > min_side
}

/// Side of the square ring image that fits `bounds` with the thumb border around it.
pub(crate) fn ring_image_side(bounds: Size, border_thickness: f64) -> f64 {
    (bounds.width - 2.0 * border_thickness).min(bounds.height - 2.0 * border_thickness)
}

/// Where the thumb sits for a given value, in the thumb's own box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThumbPlacement {
    /// Side of the square box the thumb is drawn in.
    pub box_side: f64,
    pub center: Point,
    pub radius: f64,
    pub inner_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub stroke_thickness: f64,
}

pub(crate) fn thumb_placement(
    bounds: Size,
    ring_thickness: f64,
    border_thickness: f64,
    value: f64,
    arc_angle: f64,
) -> Option<ThumbPlacement> {
    if !fits_ring(bounds, ring_thickness, border_thickness) {
        return None;
    }

    let ring_side = ring_image_side(bounds, border_thickness);
    let half = ring_side / 2.0 + border_thickness;
    // Half the stroke falls outside the radius; pull in by one so it overlaps the ring edge.
    let radius = (ring_side + border_thickness) / 2.0 - 1.0;

    Some(ThumbPlacement {
        box_side: ring_side + 2.0 * border_thickness,
        center: point(half, half),
        radius,
        inner_radius: (radius - ring_thickness - border_thickness + 2.0).max(0.0),
        start_angle: value - arc_angle / 2.0,
        end_angle: value + arc_angle / 2.0,
        stroke_thickness: border_thickness,
    })
}
