pub(crate) mod common;
pub mod raster;
pub mod regen;
pub mod ring;
pub mod ring_slice;

pub use common::{PointerButtons, pointer_to_hue};
pub use raster::{
    HUE_LIGHTNESS_FORMAT, HUE_RING_FORMAT, render_hue_lightness, render_hue_lightness_async,
    render_hue_ring,
};
pub use regen::{
    DEFAULT_RECHECK_DELAY, RegenerationController, RegenerationPhase, RegenerationStats,
    RingStyle, RingSurface,
};
pub use ring::{HueRingEvent, HueRingPicker};
pub use ring_slice::{
    PathSegment, RingSlice, RingSliceBatch, RingSliceGeometry, RingSliceOutline, SweepDirection,
};
