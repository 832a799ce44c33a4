use std::future::Future;
use std::sync::Arc;

use futures::channel::oneshot;
use smol::Executor;

use super::common::{
    PointerButtons, clamp_value, coerce_maximum, coerce_minimum, pointer_to_hue, ring_image_side,
    thumb_placement,
};
use super::regen::{
    RegenerationController, RegenerationPhase, RegenerationStats, RingStyle, RingSurface,
};
use super::ring_slice::RingSlice;
use crate::async_util::{Receiver, Sender, unbounded};
use crate::color::RgbaColor;
use crate::error::{HueRingError, Result};
use crate::geometry::{Point, Size, size};
use crate::settings::HueRingSettings;

#[derive(Clone, Debug, PartialEq)]
pub enum HueRingEvent {
    /// The selected hue changed, in degrees.
    ValueChanged(f64),
    /// The thumb outline or its stroke color was rebuilt.
    ThumbChanged,
}

/// A circular hue picker.
///
/// The host feeds it attach/detach, layout and pointer notifications; the
/// picker keeps the hue ring image (through a [`RingSurface`]) and the thumb
/// outline in sync, and publishes [`HueRingEvent`]s to subscribers.
pub struct HueRingPicker {
    value: f64,
    minimum: f64,
    maximum: f64,
    ring_thickness: f64,
    thumb_arc_angle: f64,
    thumb_border_thickness: f64,
    thumb_border_brush: Option<RgbaColor>,
    thumb_background: Option<RgbaColor>,
    bounds: Size,

    thumb: RingSlice,
    thumb_box_side: Option<f64>,
    thumb_stroke: RgbaColor,

    regeneration: RegenerationController,
    subscribers: Vec<Sender<HueRingEvent>>,
    loaded_waiters: Vec<oneshot::Sender<()>>,
}

impl HueRingPicker {
    pub fn new(executor: Arc<Executor<'static>>) -> Self {
        let defaults = HueRingSettings::default();
        let mut this = Self {
            value: defaults.value,
            minimum: defaults.minimum,
            maximum: defaults.maximum,
            ring_thickness: defaults.ring_thickness,
            thumb_arc_angle: defaults.thumb_arc_angle,
            thumb_border_thickness: defaults.thumb_border_thickness,
            thumb_border_brush: None,
            thumb_background: None,
            bounds: Size::UNKNOWN,
            thumb: RingSlice::new(),
            thumb_box_side: None,
            thumb_stroke: stroke_for_hue(defaults.value).unwrap_or(RgbaColor::WHITE),
            regeneration: RegenerationController::new(executor),
            subscribers: Vec::new(),
            loaded_waiters: Vec::new(),
        };
        let style = this.ring_style();
        this.regeneration.set_style(style);
        this.regeneration.set_recheck_delay(defaults.recheck_delay());
        this
    }

    /// Builds a picker and applies `settings` through the validating setters.
    pub fn with_settings(
        executor: Arc<Executor<'static>>,
        settings: &HueRingSettings,
    ) -> Result<Self> {
        let mut this = Self::new(executor);
        this.set_minimum(settings.minimum);
        this.set_maximum(settings.maximum);
        this.set_ring_thickness(settings.ring_thickness)?;
        this.set_thumb_arc_angle(settings.thumb_arc_angle)?;
        this.set_thumb_border_thickness(settings.thumb_border_thickness)?;
        this.set_thumb_border_brush(settings.thumb_border_brush);
        this.set_thumb_background(settings.thumb_background);
        this.regeneration.set_recheck_delay(settings.recheck_delay());
        this.set_value(settings.value);
        Ok(this)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn ring_thickness(&self) -> f64 {
        self.ring_thickness
    }

    pub fn thumb_arc_angle(&self) -> f64 {
        self.thumb_arc_angle
    }

    pub fn thumb_border_thickness(&self) -> f64 {
        self.thumb_border_thickness
    }

    pub fn thumb_border_brush(&self) -> Option<RgbaColor> {
        self.thumb_border_brush
    }

    pub fn thumb_background(&self) -> Option<RgbaColor> {
        self.thumb_background
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// The thumb shape, positioned inside a box of [`Self::thumb_box_side`].
    pub fn thumb(&self) -> &RingSlice {
        &self.thumb
    }

    /// Side of the square box the thumb is laid out in; `None` before the first fitting layout.
    pub fn thumb_box_side(&self) -> Option<f64> {
        self.thumb_box_side
    }

    pub fn thumb_stroke(&self) -> RgbaColor {
        self.thumb_stroke
    }

    pub fn is_attached(&self) -> bool {
        self.regeneration.is_attached()
    }

    pub fn regeneration_phase(&self) -> RegenerationPhase {
        self.regeneration.phase()
    }

    pub fn regeneration_stats(&self) -> RegenerationStats {
        self.regeneration.stats()
    }

    /// Size of the ring image for the current layout, if it is resolved.
    pub fn ring_image_size(&self) -> Option<Size> {
        let side = ring_image_side(self.bounds, self.thumb_border_thickness).floor();
        if side.is_nan() || side <= 0.0 {
            return None;
        }
        Some(size(side, side))
    }

    pub fn subscribe(&mut self) -> Receiver<HueRingEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Resolves once the picker is attached: immediately if it already is.
    ///
    /// Also resolves if the picker is dropped before it is ever attached.
    pub fn wait_for_loaded(&mut self) -> impl Future<Output = ()> + Send + 'static {
        let receiver = if self.is_attached() {
            None
        } else {
            let (tx, rx) = oneshot::channel();
            self.loaded_waiters.push(tx);
            Some(rx)
        };

        async move {
            if let Some(rx) = receiver {
                _ = rx.await;
            }
        }
    }

    pub fn set_value(&mut self, value: f64) {
        let value = clamp_value(value, self.minimum, self.maximum);
        if self.value == value {
            return;
        }

        self.value = value;
        self.emit(HueRingEvent::ValueChanged(value));
        self.update_thumb();
    }

    /// Values below 0 are stored as 0. The current value is left as is.
    pub fn set_minimum(&mut self, minimum: f64) {
        self.minimum = coerce_minimum(minimum);
    }

    /// Values above 360 are stored as 360. The current value is left as is.
    pub fn set_maximum(&mut self, maximum: f64) {
        self.maximum = coerce_maximum(maximum);
    }

    pub fn set_ring_thickness(&mut self, ring_thickness: f64) -> Result<()> {
        if ring_thickness.is_nan() || ring_thickness < 0.0 {
            return Err(HueRingError::NegativeThickness {
                name: "ring thickness",
                value: ring_thickness,
            });
        }
        if self.ring_thickness != ring_thickness {
            self.ring_thickness = ring_thickness;
            self.update_visuals();
        }
        Ok(())
    }

    pub fn set_thumb_arc_angle(&mut self, thumb_arc_angle: f64) -> Result<()> {
        if !(0.0..=180.0).contains(&thumb_arc_angle) {
            return Err(HueRingError::ThumbArcAngleOutOfRange(thumb_arc_angle));
        }
        if self.thumb_arc_angle != thumb_arc_angle {
            self.thumb_arc_angle = thumb_arc_angle;
            self.update_thumb();
        }
        Ok(())
    }

    pub fn set_thumb_border_thickness(&mut self, thumb_border_thickness: f64) -> Result<()> {
        if thumb_border_thickness.is_nan() || thumb_border_thickness < 0.0 {
            return Err(HueRingError::NegativeThickness {
                name: "thumb border thickness",
                value: thumb_border_thickness,
            });
        }
        if self.thumb_border_thickness != thumb_border_thickness {
            self.thumb_border_thickness = thumb_border_thickness;
            self.update_visuals();
        }
        Ok(())
    }

    /// Fixed thumb outline color; `None` makes the outline follow the value.
    pub fn set_thumb_border_brush(&mut self, brush: Option<RgbaColor>) {
        if self.thumb_border_brush != brush {
            self.thumb_border_brush = brush;
            self.update_thumb();
        }
    }

    pub fn set_thumb_background(&mut self, background: Option<RgbaColor>) {
        if self.thumb_background != background {
            self.thumb_background = background;
            self.emit(HueRingEvent::ThumbChanged);
        }
    }

    /// The picker joined a renderable surface.
    pub fn attach(&mut self) {
        if self.is_attached() {
            return;
        }

        self.regeneration.attach();
        for waiter in self.loaded_waiters.drain(..) {
            _ = waiter.send(());
        }
        self.update_thumb();
    }

    /// The picker left its surface.
    pub fn detach(&mut self) {
        self.regeneration.detach();
    }

    /// Sets where finished ring images are shown.
    pub fn set_ring_surface(&mut self, surface: Option<Arc<dyn RingSurface>>) {
        self.regeneration.set_surface(surface);
    }

    /// Layout pass result for the picker's container.
    pub fn set_bounds(&mut self, bounds: Size) {
        self.bounds = bounds;
        self.update_visuals();
    }

    /// `position` is local to the ring image.
    pub fn pointer_pressed(&mut self, position: Point) {
        self.update_value_for_point(position);
    }

    /// Moves only change the value while a button is held.
    pub fn pointer_moved(&mut self, position: Point, buttons: PointerButtons) {
        if !buttons.any() {
            return;
        }
        self.update_value_for_point(position);
    }

    fn update_value_for_point(&mut self, position: Point) {
        let Some(image_size) = self.ring_image_size() else {
            tracing::trace!("ignoring pointer input before layout");
            return;
        };
        if !position.is_finite() {
            return;
        }

        self.set_value(pointer_to_hue(position, image_size));
    }

    fn ring_style(&self) -> RingStyle {
        RingStyle {
            ring_thickness: self.ring_thickness,
            thumb_border_thickness: self.thumb_border_thickness,
        }
    }

    fn update_visuals(&mut self) {
        let style = self.ring_style();
        self.regeneration.set_style(style);
        self.regeneration.set_bounds(self.bounds);
        self.update_thumb();
    }

    fn update_thumb(&mut self) {
        let Some(placement) = thumb_placement(
            self.bounds,
            self.ring_thickness,
            self.thumb_border_thickness,
            self.value,
            self.thumb_arc_angle,
        ) else {
            return;
        };

        {
            let mut thumb = self.thumb.batch();
            thumb.set_center(Some(placement.center));
            thumb.set_radius(placement.radius);
            if let Err(err) = thumb.set_inner_radius(placement.inner_radius) {
                tracing::warn!("Failed to place the hue ring thumb: {}", err);
            }
            thumb.set_start_angle(placement.start_angle);
            thumb.set_end_angle(placement.end_angle);
            thumb.set_stroke_thickness(placement.stroke_thickness);
        }
        self.thumb_box_side = Some(placement.box_side);

        match self.thumb_border_brush {
            Some(brush) => self.thumb_stroke = brush,
            None => match stroke_for_hue(self.value) {
                Ok(stroke) => self.thumb_stroke = stroke,
                Err(err) => tracing::warn!("Failed to color the hue ring thumb: {}", err),
            },
        }

        self.emit(HueRingEvent::ThumbChanged);
    }

    fn emit(&mut self, event: HueRingEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.try_send(event.clone()).is_ok());
    }
}

fn stroke_for_hue(hue: f64) -> Result<RgbaColor> {
    RgbaColor::from_hsv(hue, 0.5, 1.0, 1.0)
}
