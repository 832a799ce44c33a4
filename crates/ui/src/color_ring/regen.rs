use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use smol::{Executor, Task};

use super::common::{fits_ring, ring_image_side};
use super::raster::{HUE_RING_FORMAT, render_hue_ring};
use crate::async_util::delay;
use crate::geometry::Size;
use crate::pixel_buffer::PixelBuffer;
use crate::signal::CoalescingSignal;

/// Default pause before re-checking a container that is too small for the ring.
pub const DEFAULT_RECHECK_DELAY: Duration = Duration::from_millis(50);

/// Where finished ring images go.
///
/// `install_ring` is only ever called with a completely rendered buffer.
pub trait RingSurface: Send + Sync + 'static {
    fn install_ring(&self, ring: PixelBuffer);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegenerationPhase {
    Detached,
    /// Attached, no ring installed yet.
    WaitingForLayout,
    Active,
}

/// Styling inputs that change the ring's pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingStyle {
    pub ring_thickness: f64,
    pub thumb_border_thickness: f64,
}

impl Default for RingStyle {
    fn default() -> Self {
        Self {
            ring_thickness: 20.0,
            thumb_border_thickness: 2.0,
        }
    }
}

/// Counters describing what the regeneration loop has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegenerationStats {
    pub renders_started: usize,
    pub installs: usize,
    pub skipped: usize,
    pub rechecks: usize,
    pub active_loops: usize,
    /// Most renders ever in flight at once for this controller.
    pub peak_concurrent_renders: usize,
}

#[derive(Default)]
struct Counters {
    renders_started: AtomicUsize,
    installs: AtomicUsize,
    skipped: AtomicUsize,
    rechecks: AtomicUsize,
    active_loops: AtomicUsize,
    rendering: AtomicUsize,
    peak_concurrent_renders: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> RegenerationStats {
        RegenerationStats {
            renders_started: self.renders_started.load(Ordering::SeqCst),
            installs: self.installs.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            rechecks: self.rechecks.load(Ordering::SeqCst),
            active_loops: self.active_loops.load(Ordering::SeqCst),
            peak_concurrent_renders: self.peak_concurrent_renders.load(Ordering::SeqCst),
        }
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

struct Layout {
    phase: RegenerationPhase,
    bounds: Size,
    style: RingStyle,
    surface: Option<Arc<dyn RingSurface>>,
    recheck_delay: Duration,
}

/// One attach..detach period. A fresh session per attach keeps a retiring loop
/// from sharing its signal with the next one.
struct Session {
    signal: CoalescingSignal,
    attached: AtomicBool,
}

impl Session {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

struct Shared {
    layout: Mutex<Layout>,
    /// Held from allocation to install, so a retiring loop and its successor
    /// never rasterize at the same time.
    render_gate: smol::lock::Mutex<()>,
    counters: Counters,
}

#[derive(Clone)]
struct Snapshot {
    bounds: Size,
    style: RingStyle,
    surface: Option<Arc<dyn RingSurface>>,
    recheck_delay: Duration,
}

impl Shared {
    fn snapshot(&self) -> Snapshot {
        let layout = self.layout.lock();
        Snapshot {
            bounds: layout.bounds,
            style: layout.style,
            surface: layout.surface.clone(),
            recheck_delay: layout.recheck_delay,
        }
    }

    fn skip(&self, reason: &'static str) {
        tracing::trace!(reason, "skipping hue ring regeneration");
        Counters::bump(&self.counters.skipped);
    }
}

/// Keeps the hue ring image in sync with the widget's size and style.
///
/// Every trigger raises a [`CoalescingSignal`]; a loop running on the
/// executor wakes on it and re-renders at most one ring at a time, so a burst
/// of triggers costs one extra render at most.
pub struct RegenerationController {
    executor: Arc<Executor<'static>>,
    shared: Arc<Shared>,
    session: Option<Arc<Session>>,
}

impl RegenerationController {
    pub fn new(executor: Arc<Executor<'static>>) -> Self {
        Self {
            executor,
            shared: Arc::new(Shared {
                layout: Mutex::new(Layout {
                    phase: RegenerationPhase::Detached,
                    bounds: Size::UNKNOWN,
                    style: RingStyle::default(),
                    surface: None,
                    recheck_delay: DEFAULT_RECHECK_DELAY,
                }),
                render_gate: smol::lock::Mutex::new(()),
                counters: Counters::default(),
            }),
            session: None,
        }
    }

    pub fn phase(&self) -> RegenerationPhase {
        self.shared.layout.lock().phase
    }

    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    pub fn bounds(&self) -> Size {
        self.shared.layout.lock().bounds
    }

    pub fn style(&self) -> RingStyle {
        self.shared.layout.lock().style
    }

    pub fn stats(&self) -> RegenerationStats {
        self.shared.counters.snapshot()
    }

    pub fn set_recheck_delay(&mut self, recheck_delay: Duration) {
        self.shared.layout.lock().recheck_delay = recheck_delay;
    }

    /// The widget joined a renderable surface: start the regeneration loop.
    pub fn attach(&mut self) {
        if self.session.is_some() {
            return;
        }

        let session = Arc::new(Session {
            signal: CoalescingSignal::new(),
            attached: AtomicBool::new(true),
        });
        self.shared.layout.lock().phase = RegenerationPhase::WaitingForLayout;
        session.signal.signal();

        tracing::debug!("hue ring attached, starting regeneration loop");
        let task: Task<()> = self.executor.spawn(regeneration_loop(
            self.shared.clone(),
            session.clone(),
        ));
        task.detach();
        self.session = Some(session);
    }

    /// The widget left its surface: wake the loop so it stops promptly.
    pub fn detach(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        session.attached.store(false, Ordering::SeqCst);
        self.shared.layout.lock().phase = RegenerationPhase::Detached;
        session.signal.signal();
        tracing::debug!("hue ring detached");
    }

    pub fn set_bounds(&mut self, bounds: Size) {
        {
            let mut layout = self.shared.layout.lock();
            if same_size(layout.bounds, bounds) {
                return;
            }
            layout.bounds = bounds;
        }
        self.request_regeneration();
    }

    pub fn set_style(&mut self, style: RingStyle) {
        {
            let mut layout = self.shared.layout.lock();
            if layout.style == style {
                return;
            }
            layout.style = style;
        }
        self.request_regeneration();
    }

    /// Sets (or clears) the surface that shows the ring image.
    pub fn set_surface(&mut self, surface: Option<Arc<dyn RingSurface>>) {
        self.shared.layout.lock().surface = surface;
        self.request_regeneration();
    }

    pub fn has_surface(&self) -> bool {
        self.shared.layout.lock().surface.is_some()
    }

    /// Asks for a new ring; a no-op while detached.
    pub fn request_regeneration(&self) {
        if let Some(session) = &self.session {
            session.signal.signal();
        }
    }
}

impl Drop for RegenerationController {
    fn drop(&mut self) {
        self.detach();
    }
}

fn same_size(a: Size, b: Size) -> bool {
    let same = |x: f64, y: f64| x == y || (x.is_nan() && y.is_nan());
    same(a.width, b.width) && same(a.height, b.height)
}

struct LoopGuard<'a>(&'a Counters);

impl Drop for LoopGuard<'_> {
    fn drop(&mut self) {
        self.0.active_loops.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn regeneration_loop(shared: Arc<Shared>, session: Arc<Session>) {
    Counters::bump(&shared.counters.active_loops);
    let _guard = LoopGuard(&shared.counters);

    loop {
        session.signal.wait().await;
        if !session.is_attached() {
            break;
        }
        regenerate(&shared, &session).await;
    }

    tracing::debug!("hue ring regeneration loop stopped");
}

async fn regenerate(shared: &Shared, session: &Session) {
    let mut snapshot = shared.snapshot();

    if snapshot.surface.is_none() {
        return shared.skip("no surface");
    }
    if snapshot.bounds.is_nan() {
        return shared.skip("layout not resolved");
    }

    if !fits_ring(
        snapshot.bounds,
        snapshot.style.ring_thickness,
        snapshot.style.thumb_border_thickness,
    ) {
        Counters::bump(&shared.counters.rechecks);
        delay(snapshot.recheck_delay).await;

        snapshot = shared.snapshot();
        if !fits_ring(
            snapshot.bounds,
            snapshot.style.ring_thickness,
            snapshot.style.thumb_border_thickness,
        ) {
            return shared.skip("container too small");
        }
    }

    let Some(surface) = snapshot.surface else {
        return shared.skip("no surface");
    };

    let _render = shared.render_gate.lock().await;
    if !session.is_attached() {
        return shared.skip("detached while waiting to render");
    }

    let side = ring_image_side(snapshot.bounds, snapshot.style.thumb_border_thickness).floor();
    let size = side as u32;
    let inner_ring_radius = (size / 2).saturating_sub(snapshot.style.ring_thickness.floor() as u32);

    let buffer = match PixelBuffer::new(size, size, HUE_RING_FORMAT) {
        Ok(buffer) => buffer,
        Err(err) => {
            tracing::error!("Failed to allocate hue ring buffer: {}", err);
            return shared.skip("allocation failed");
        }
    };

    tracing::debug!(size, inner_ring_radius, "rendering hue ring");
    Counters::bump(&shared.counters.renders_started);
    let in_flight = shared.counters.rendering.fetch_add(1, Ordering::SeqCst) + 1;
    shared
        .counters
        .peak_concurrent_renders
        .fetch_max(in_flight, Ordering::SeqCst);
    let rendered = render_hue_ring(buffer, inner_ring_radius, 0).await;
    shared.counters.rendering.fetch_sub(1, Ordering::SeqCst);

    let ring = match rendered {
        Ok(ring) => ring,
        Err(err) => {
            tracing::error!("Failed to render hue ring: {}", err);
            return shared.skip("render failed");
        }
    };

    if !session.is_attached() {
        return shared.skip("detached while rendering");
    }

    surface.install_ring(ring);
    Counters::bump(&shared.counters.installs);
    {
        let mut layout = shared.layout.lock();
        if layout.phase == RegenerationPhase::WaitingForLayout {
            layout.phase = RegenerationPhase::Active;
        }
    }
    tracing::debug!(size, "hue ring installed");
}
