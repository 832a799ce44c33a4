use std::ops::{Deref, DerefMut};

use smallvec::SmallVec;

use crate::error::{HueRingError, Result};
use crate::geometry::{Point, point, point_on_circle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepDirection {
    Clockwise,
    CounterClockwise,
}

/// One drawing primitive of a ring slice outline, continuing from the previous end point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    Arc {
        to: Point,
        radius: f64,
        large_arc: bool,
        sweep: SweepDirection,
    },
    Line {
        to: Point,
    },
}

impl PathSegment {
    pub fn end_point(&self) -> Point {
        match self {
            PathSegment::Arc { to, .. } | PathSegment::Line { to } => *to,
        }
    }
}

/// A closed annulus sector: inner arc, radial line, outer arc, then implicitly back to `start`.
#[derive(Clone, Debug, PartialEq)]
pub struct RingSliceOutline {
    pub start: Point,
    pub segments: SmallVec<[PathSegment; 3]>,
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl RingSliceOutline {
    /// Approximates the outline with straight lines, at most `max_step_degrees` apart on each arc.
    ///
    /// The returned polyline is open; the closing edge runs from the last point back to the first.
    pub fn flatten(&self, max_step_degrees: f64) -> Vec<Point> {
        let sweep = self.end_angle - self.start_angle;
        let step = if max_step_degrees.is_finite() && max_step_degrees > 0.0 {
            max_step_degrees
        } else {
            1.0
        };
        let steps = ((sweep.abs() / step).ceil() as usize).max(1);

        let mut points = Vec::with_capacity(2 * (steps + 1));
        for i in 0..=steps {
            let angle = self.start_angle + sweep * i as f64 / steps as f64;
            points.push(point_on_circle(self.center, self.inner_radius, angle));
        }
        for i in 0..=steps {
            let angle = self.end_angle - sweep * i as f64 / steps as f64;
            points.push(point_on_circle(self.center, self.outer_radius, angle));
        }
        points
    }
}

/// The parameters of a ring slice.
///
/// Angles are in degrees, 0° pointing up and growing clockwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingSliceGeometry {
    /// Defaults to the center of the slice's own bounding box when `None`.
    pub center: Option<Point>,
    pub radius: f64,
    pub inner_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub stroke_thickness: f64,
}

impl Default for RingSliceGeometry {
    fn default() -> Self {
        Self {
            center: None,
            radius: 0.0,
            inner_radius: 0.0,
            start_angle: 0.0,
            end_angle: 0.0,
            stroke_thickness: 0.0,
        }
    }
}

impl RingSliceGeometry {
    /// Inner radius pushed outwards by half the stroke, so the stroke stays inside the slice.
    #[inline]
    pub fn effective_inner_radius(&self) -> f64 {
        self.inner_radius + self.stroke_thickness / 2.0
    }

    #[inline]
    pub fn effective_outer_radius(&self) -> f64 {
        self.radius - self.stroke_thickness / 2.0
    }

    /// Builds the outline, or `None` when the slice is degenerate and should not be drawn.
    pub fn outline(&self) -> Option<RingSliceOutline> {
        let inner_radius = self.effective_inner_radius();
        let outer_radius = self.effective_outer_radius();

        if inner_radius.is_nan()
            || outer_radius.is_nan()
            || self.start_angle.is_nan()
            || self.end_angle.is_nan()
            || inner_radius <= 0.0
            || outer_radius < inner_radius
        {
            return None;
        }

        let center = self.center.unwrap_or_else(|| {
            let c = outer_radius + self.stroke_thickness / 2.0;
            point(c, c)
        });
        if !center.is_finite() {
            return None;
        }

        let large_arc = (self.end_angle - self.start_angle) >= 180.0;

        let mut segments = SmallVec::new();
        segments.push(PathSegment::Arc {
            to: point_on_circle(center, inner_radius, self.end_angle),
            radius: inner_radius,
            large_arc,
            sweep: SweepDirection::Clockwise,
        });
        segments.push(PathSegment::Line {
            to: point_on_circle(center, outer_radius, self.end_angle),
        });
        segments.push(PathSegment::Arc {
            to: point_on_circle(center, outer_radius, self.start_angle),
            radius: outer_radius,
            large_arc,
            sweep: SweepDirection::CounterClockwise,
        });

        Some(RingSliceOutline {
            start: point_on_circle(center, inner_radius, self.start_angle),
            segments,
            center,
            inner_radius,
            outer_radius,
            start_angle: self.start_angle,
            end_angle: self.end_angle,
        })
    }
}

/// A ring slice shape that rebuilds its outline whenever a parameter changes.
///
/// Degenerate parameters leave the last good outline (and visibility) in place.
/// Use [`RingSlice::batch`] or [`RingSlice::begin_update`] to change several
/// parameters with a single rebuild.
#[derive(Debug, Default)]
pub struct RingSlice {
    geometry: RingSliceGeometry,
    outline: Option<RingSliceOutline>,
    visible: bool,
    updating: bool,
    revision: u64,
}

impl RingSlice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(&self) -> &RingSliceGeometry {
        &self.geometry
    }

    /// The most recent outline that could be built.
    pub fn outline(&self) -> Option<&RingSliceOutline> {
        self.outline.as_ref()
    }

    /// False until the first outline has been built.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Incremented on every successful rebuild.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    pub fn set_center(&mut self, center: Option<Point>) {
        if self.geometry.center != center {
            self.geometry.center = center;
            self.update_path();
        }
    }

    pub fn set_radius(&mut self, radius: f64) {
        if self.geometry.radius != radius {
            self.geometry.radius = radius;
            self.update_path();
        }
    }

    pub fn set_inner_radius(&mut self, inner_radius: f64) -> Result<()> {
        if inner_radius < 0.0 {
            return Err(HueRingError::NegativeInnerRadius(inner_radius));
        }
        if self.geometry.inner_radius != inner_radius {
            self.geometry.inner_radius = inner_radius;
            self.update_path();
        }
        Ok(())
    }

    pub fn set_start_angle(&mut self, start_angle: f64) {
        if self.geometry.start_angle != start_angle {
            self.geometry.start_angle = start_angle;
            self.update_path();
        }
    }

    pub fn set_end_angle(&mut self, end_angle: f64) {
        if self.geometry.end_angle != end_angle {
            self.geometry.end_angle = end_angle;
            self.update_path();
        }
    }

    pub fn set_stroke_thickness(&mut self, stroke_thickness: f64) {
        if self.geometry.stroke_thickness != stroke_thickness {
            self.geometry.stroke_thickness = stroke_thickness;
            self.update_path();
        }
    }

    /// Suspends rebuilds until [`RingSlice::end_update`].
    pub fn begin_update(&mut self) {
        self.updating = true;
    }

    /// Resumes rebuilds and rebuilds once with every change made since `begin_update`.
    pub fn end_update(&mut self) {
        self.updating = false;
        self.update_path();
    }

    /// Scoped form of `begin_update`/`end_update`; the rebuild happens when the guard drops.
    pub fn batch(&mut self) -> RingSliceBatch<'_> {
        self.begin_update();
        RingSliceBatch { slice: self }
    }

    fn update_path(&mut self) {
        if self.updating {
            return;
        }

        if let Some(outline) = self.geometry.outline() {
            self.outline = Some(outline);
            self.visible = true;
            self.revision += 1;
        }
    }
}

pub struct RingSliceBatch<'a> {
    slice: &'a mut RingSlice,
}

impl Deref for RingSliceBatch<'_> {
    type Target = RingSlice;

    fn deref(&self) -> &RingSlice {
        self.slice
    }
}

impl DerefMut for RingSliceBatch<'_> {
    fn deref_mut(&mut self) -> &mut RingSlice {
        self.slice
    }
}

impl Drop for RingSliceBatch<'_> {
    fn drop(&mut self) {
        self.slice.end_update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) {
        assert!(
            (a - b).abs() < 1e-9,
            "expected {a} ~= {b}, delta={}",
            (a - b).abs()
        );
    }

    fn approx_point(a: Point, b: Point) {
        approx_eq(a.x, b.x);
        approx_eq(a.y, b.y);
    }

    fn slice(start_angle: f64, end_angle: f64) -> RingSliceGeometry {
        RingSliceGeometry {
            center: None,
            radius: 50.0,
            inner_radius: 10.0,
            start_angle,
            end_angle,
            stroke_thickness: 0.0,
        }
    }

    #[test]
    fn test_quarter_slice_outline() {
        let outline = slice(0.0, 90.0).outline().unwrap();
        let center = point(50.0, 50.0);
        approx_point(outline.center, center);
        approx_point(outline.start, point(50.0, 40.0));
        assert_eq!(outline.segments.len(), 3);

        match outline.segments[0] {
            PathSegment::Arc {
                to,
                radius,
                large_arc,
                sweep,
            } => {
                approx_point(to, point(60.0, 50.0));
                approx_eq(radius, 10.0);
                assert!(!large_arc);
                assert_eq!(sweep, SweepDirection::Clockwise);
            }
            other => panic!("expected inner arc, got {other:?}"),
        }
        match outline.segments[1] {
            PathSegment::Line { to } => approx_point(to, point(100.0, 50.0)),
            other => panic!("expected line, got {other:?}"),
        }
        match outline.segments[2] {
            PathSegment::Arc {
                to,
                radius,
                large_arc,
                sweep,
            } => {
                approx_point(to, point(50.0, 0.0));
                approx_eq(radius, 50.0);
                assert!(!large_arc);
                assert_eq!(sweep, SweepDirection::CounterClockwise);
            }
            other => panic!("expected outer arc, got {other:?}"),
        }
    }

    #[test]
    fn test_large_arc_flag() {
        let outline = slice(0.0, 200.0).outline().unwrap();
        for segment in [outline.segments[0], outline.segments[2]] {
            let PathSegment::Arc { large_arc, .. } = segment else {
                panic!("expected an arc, got {segment:?}");
            };
            assert!(large_arc);
        }

        let outline = slice(10.0, 190.0).outline().unwrap();
        assert!(matches!(
            outline.segments[0],
            PathSegment::Arc {
                large_arc: true,
                ..
            }
        ));
    }

    #[test]
    fn test_stroke_shrinks_radii() {
        let geometry = RingSliceGeometry {
            stroke_thickness: 4.0,
            center: Some(point(0.0, 0.0)),
            ..slice(0.0, 90.0)
        };
        let outline = geometry.outline().unwrap();
        approx_eq(outline.inner_radius, 12.0);
        approx_eq(outline.outer_radius, 48.0);
        approx_point(outline.start, point(0.0, -12.0));
        approx_point(outline.segments[2].end_point(), point(0.0, -48.0));
    }

    #[test]
    fn test_degenerate_slices_are_suppressed() {
        let too_thick = RingSliceGeometry {
            stroke_thickness: 41.0,
            ..slice(0.0, 90.0)
        };
        assert!(too_thick.outline().is_none());

        let nan = RingSliceGeometry {
            radius: f64::NAN,
            ..slice(0.0, 90.0)
        };
        assert!(nan.outline().is_none());

        let nan_angle = slice(f64::NAN, 90.0);
        assert!(nan_angle.outline().is_none());

        let no_hole = RingSliceGeometry {
            inner_radius: 0.0,
            ..slice(0.0, 90.0)
        };
        assert!(no_hole.outline().is_none());
    }

    #[test]
    fn test_ring_slice_keeps_last_outline_when_degenerate() {
        let mut ring = RingSlice::new();
        assert!(!ring.is_visible());
        assert!(ring.outline().is_none());

        ring.set_inner_radius(10.0).unwrap();
        ring.set_radius(50.0);
        ring.set_end_angle(90.0);
        assert!(ring.is_visible());
        let good = ring.outline().cloned().unwrap();
        let revision = ring.revision();

        ring.set_stroke_thickness(100.0);
        assert_eq!(ring.revision(), revision);
        assert_eq!(ring.outline(), Some(&good));
        assert!(ring.is_visible());
    }

    #[test]
    fn test_negative_inner_radius_is_rejected() {
        let mut ring = RingSlice::new();
        ring.set_inner_radius(5.0).unwrap();
        assert_eq!(
            ring.set_inner_radius(-1.0),
            Err(HueRingError::NegativeInnerRadius(-1.0))
        );
        assert_eq!(ring.geometry().inner_radius, 5.0);
    }

    #[test]
    fn test_batch_rebuilds_once() {
        let mut ring = RingSlice::new();
        ring.set_inner_radius(10.0).unwrap();
        ring.set_radius(50.0);
        ring.set_end_angle(90.0);
        let revision = ring.revision();

        {
            let mut batch = ring.batch();
            batch.set_center(Some(point(100.0, 100.0)));
            batch.set_radius(80.0);
            batch.set_inner_radius(60.0).unwrap();
            batch.set_start_angle(-10.0);
            batch.set_end_angle(10.0);
            assert!(batch.is_updating());
            assert_eq!(batch.revision(), revision);
        }

        assert!(!ring.is_updating());
        assert_eq!(ring.revision(), revision + 1);
        let outline = ring.outline().unwrap();
        approx_point(outline.center, point(100.0, 100.0));
        approx_eq(outline.outer_radius, 80.0);
        approx_eq(outline.inner_radius, 60.0);
        approx_eq(outline.start_angle, -10.0);
    }

    #[test]
    fn test_begin_end_update() {
        let mut ring = RingSlice::new();
        ring.begin_update();
        ring.set_inner_radius(10.0).unwrap();
        ring.set_radius(50.0);
        ring.set_end_angle(45.0);
        assert!(!ring.is_visible());

        ring.end_update();
        assert!(ring.is_visible());
        assert_eq!(ring.revision(), 1);
    }

    #[test]
    fn test_unchanged_values_do_not_rebuild() {
        let mut ring = RingSlice::new();
        ring.set_inner_radius(10.0).unwrap();
        ring.set_radius(50.0);
        let revision = ring.revision();

        ring.set_radius(50.0);
        ring.set_inner_radius(10.0).unwrap();
        assert_eq!(ring.revision(), revision);
    }

    #[test]
    fn test_flatten() {
        let outline = RingSliceGeometry {
            center: Some(point(0.0, 0.0)),
            ..slice(0.0, 90.0)
        }
        .outline()
        .unwrap();

        let points = outline.flatten(10.0);
        assert_eq!(points.len(), 20);
        approx_point(points[0], outline.start);
        approx_point(points[9], outline.segments[0].end_point());
        approx_point(points[10], outline.segments[1].end_point());
        approx_point(points[19], outline.segments[2].end_point());

        for p in &points[..10] {
            approx_eq(p.distance(outline.center), 10.0);
        }
        for p in &points[10..] {
            approx_eq(p.distance(outline.center), 50.0);
        }
    }
}
