pub mod async_util;
pub mod color;
pub mod color_ring;
mod error;
pub mod geometry;
pub mod pixel_buffer;
pub mod settings;
pub mod signal;

pub use color::{HsvColor, ParseColorError, RgbaColor};
pub use color_ring::{HueRingEvent, HueRingPicker, RingSurface};
pub use error::{HueRingError, Result};
pub use geometry::{Point, Size, point, size};
pub use pixel_buffer::{PixelBuffer, PixelFormat};
pub use settings::{HueRingSettings, SettingsError};
pub use signal::{CoalescingSignal, SignalState};
