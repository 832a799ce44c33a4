//! A headless host for the hue ring picker.
//!
//! Plays the part of a windowing framework: attaches the picker, runs a
//! layout pass, forwards a pointer press, and composes the ring image and
//! thumb outline into a [`Pixmap`].

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, anyhow};
use hue_ring_ui::async_util::{Receiver, Sender, Timer, bounded};
use hue_ring_ui::{
    HueRingEvent, HueRingPicker, HueRingSettings, PixelBuffer, Point, RingSurface, point, size,
};
use parking_lot::Mutex;
use smol::Executor;
use tiny_skia::{
    ColorU8, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Largest angle between two samples when drawing thumb arcs.
const ARC_STEP_DEGREES: f64 = 2.0;

pub fn init() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hue_ring_ui=debug".parse()?)
                .add_directive("hue_ring_story=info".parse()?),
        )
        .try_init()?;
    Ok(())
}

pub struct StoryOptions {
    pub settings: HueRingSettings,
    pub width: f64,
    pub height: f64,
    /// Pointer press, local to the ring image.
    pub press: Option<Point>,
    pub timeout: Duration,
}

impl Default for StoryOptions {
    fn default() -> Self {
        Self {
            settings: HueRingSettings::default(),
            width: 240.0,
            height: 240.0,
            press: Some(point(200.0, 60.0)),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Keeps the most recently installed ring and announces each install.
pub struct CapturedRing {
    ring: Mutex<Option<PixelBuffer>>,
    installed: Sender<()>,
    installs: Receiver<()>,
}

impl CapturedRing {
    pub fn new() -> Self {
        let (installed, installs) = bounded(1);
        Self {
            ring: Mutex::new(None),
            installed,
            installs,
        }
    }

    pub fn latest(&self) -> Option<PixelBuffer> {
        self.ring.lock().clone()
    }

    /// Waits for the next install, giving up after `timeout`.
    pub async fn next(&self, timeout: Duration) -> Option<PixelBuffer> {
        let installed = smol::future::or(async { self.installs.recv().await.is_ok() }, async {
            Timer::after(timeout).await;
            false
        })
        .await;

        if installed { self.latest() } else { None }
    }
}

impl Default for CapturedRing {
    fn default() -> Self {
        Self::new()
    }
}

impl RingSurface for CapturedRing {
    fn install_ring(&self, ring: PixelBuffer) {
        *self.ring.lock() = Some(ring);
        // A full channel already announces a pending install.
        _ = self.installed.try_send(());
    }
}

/// Drives one picker through attach, layout and a pointer press, then composes it.
pub async fn run(executor: Arc<Executor<'static>>, options: StoryOptions) -> anyhow::Result<Pixmap> {
    let mut picker = HueRingPicker::with_settings(executor, &options.settings)
        .context("invalid hue ring settings")?;
    let surface = Arc::new(CapturedRing::new());
    picker.set_ring_surface(Some(surface.clone()));
    let events = picker.subscribe();

    let loaded = picker.wait_for_loaded();
    picker.attach();
    loaded.await;

    picker.set_bounds(size(options.width, options.height));
    let ring = surface
        .next(options.timeout)
        .await
        .ok_or_else(|| anyhow!("the hue ring was not rendered within {:?}", options.timeout))?;

    if let Some(position) = options.press {
        picker.pointer_pressed(position);
    }

    while let Ok(event) = events.try_recv() {
        match event {
            HueRingEvent::ValueChanged(value) => tracing::info!("value changed to {:.1}", value),
            HueRingEvent::ThumbChanged => tracing::debug!("thumb changed"),
        }
    }

    let pixmap = compose(&picker, &ring)?;
    picker.detach();
    Ok(pixmap)
}

/// Draws the ring image with the thumb on top, both centered in the picker's bounds.
pub fn compose(picker: &HueRingPicker, ring: &PixelBuffer) -> anyhow::Result<Pixmap> {
    let bounds = picker.bounds();
    if bounds.is_nan() {
        anyhow::bail!("the picker has no layout yet");
    }

    let width = bounds.width.ceil() as u32;
    let height = bounds.height.ceil() as u32;
    let mut pixmap = Pixmap::new(width, height)
        .with_context(|| format!("invalid canvas size {width}x{height}"))?;

    let ring_pixmap = ring_to_pixmap(ring)?;
    pixmap.draw_pixmap(
        ((bounds.width - ring.width() as f64) / 2.0) as i32,
        ((bounds.height - ring.height() as f64) / 2.0) as i32,
        ring_pixmap.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    let (Some(outline), Some(box_side)) = (picker.thumb().outline(), picker.thumb_box_side())
    else {
        return Ok(pixmap);
    };

    let points = outline.flatten(ARC_STEP_DEGREES);
    let mut builder = PathBuilder::new();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            builder.move_to(p.x as f32, p.y as f32);
        } else {
            builder.line_to(p.x as f32, p.y as f32);
        }
    }
    builder.close();
    let path = builder
        .finish()
        .context("the thumb outline has no area")?;

    let transform = Transform::from_translate(
        ((bounds.width - box_side) / 2.0) as f32,
        ((bounds.height - box_side) / 2.0) as f32,
    );

    if let Some(background) = picker.thumb_background() {
        let mut paint = Paint::default();
        paint.set_color_rgba8(background.r, background.g, background.b, background.a);
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }

    let stroke_color = picker.thumb_stroke();
    let stroke_width = picker.thumb().geometry().stroke_thickness as f32;
    if stroke_width > 0.0 {
        let mut paint = Paint::default();
        paint.set_color_rgba8(stroke_color.r, stroke_color.g, stroke_color.b, stroke_color.a);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: stroke_width,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, transform, None);
    }

    Ok(pixmap)
}

fn ring_to_pixmap(ring: &PixelBuffer) -> anyhow::Result<Pixmap> {
    let mut pixmap = Pixmap::new(ring.width(), ring.height())
        .with_context(|| format!("invalid ring size {}x{}", ring.width(), ring.height()))?;

    let width = ring.width();
    for (i, pixel) in pixmap.pixels_mut().iter_mut().enumerate() {
        let x = i as u32 % width;
        let y = i as u32 / width;
        if let Some(color) = ring.pixel(x, y) {
            *pixel = ColorU8::from_rgba(color.r, color.g, color.b, color.a).premultiply();
        }
    }

    Ok(pixmap)
}
