use crate::async_util::run_blocking;
use crate::color::RgbaColor;
use crate::error::Result;
use crate::pixel_buffer::{PixelBuffer, PixelFormat};

/// Format required by the hue ring renderer.
pub const HUE_RING_FORMAT: PixelFormat = PixelFormat::Bgra8888;
/// Format required by the hue/lightness rectangle renderer.
pub const HUE_LIGHTNESS_FORMAT: PixelFormat = PixelFormat::Rgba8888;

/// Renders the hue (x axis) by lightness (y axis, light on top) rectangle.
///
/// Blocks until every pixel is written; use [`render_hue_lightness_async`]
/// from a context that must stay responsive.
pub fn render_hue_lightness(target: &mut PixelBuffer, saturation: f64) -> Result<()> {
    target.ensure_format("render_hue_lightness", HUE_LIGHTNESS_FORMAT)?;
    render_hue_lightness_core(target, saturation)
}

/// Same output as [`render_hue_lightness`], computed on the blocking worker pool.
pub async fn render_hue_lightness_async(
    mut target: PixelBuffer,
    saturation: f64,
) -> Result<PixelBuffer> {
    target.ensure_format("render_hue_lightness_async", HUE_LIGHTNESS_FORMAT)?;
    run_blocking(move || {
        render_hue_lightness_core(&mut target, saturation)?;
        Ok(target)
    })
    .await
}

/// Renders the hue ring on the blocking worker pool and hands the buffer back when done.
///
/// A radius of `0` derives a default: the outer radius becomes half the
/// shorter side and the inner radius two thirds of the outer one. Pixels
/// outside the ring keep whatever the buffer held before.
pub async fn render_hue_ring(
    mut target: PixelBuffer,
    inner_ring_radius: u32,
    outer_ring_radius: u32,
) -> Result<PixelBuffer> {
    target.ensure_format("render_hue_ring", HUE_RING_FORMAT)?;
    run_blocking(move || {
        render_hue_ring_core(&mut target, inner_ring_radius, outer_ring_radius)?;
        Ok(target)
    })
    .await
}

fn render_hue_lightness_core(target: &mut PixelBuffer, saturation: f64) -> Result<()> {
    let format = target.format();
    let pw = target.width();
    let ph = target.height();
    // A single row or column has nothing to interpolate across.
    let xmax = pw.saturating_sub(1).max(1) as f64;
    let ymax = ph.saturating_sub(1).max(1) as f64;

    for y in 0..ph {
        let lightness = (ph - 1 - y) as f64 / ymax;
        let Some(row) = target.row_mut(y) else {
            break;
        };

        for (x, pixel) in row.enumerate() {
            let hue = 360.0 * x as f64 / xmax;
            let color = RgbaColor::from_hsl(hue, saturation, lightness, 1.0)?;
            pixel.copy_from_slice(&format.pack(color));
        }
    }

    Ok(())
}

pub(crate) fn resolve_ring_radii(
    width: u32,
    height: u32,
    inner_ring_radius: u32,
    outer_ring_radius: u32,
) -> (i64, i64) {
    let outer = if outer_ring_radius == 0 {
        width.min(height) as i64 / 2
    } else {
        outer_ring_radius as i64
    };
    let inner = if inner_ring_radius == 0 {
        outer * 2 / 3
    } else {
        inner_ring_radius as i64
    };
    (inner, outer)
}

fn render_hue_ring_core(
    target: &mut PixelBuffer,
    inner_ring_radius: u32,
    outer_ring_radius: u32,
) -> Result<()> {
    let format = target.format();
    let pw = target.width();
    let ph = target.height();
    let pch = pw as i64 / 2;
    let pcv = ph as i64 / 2;

    let (inner, outer) = resolve_ring_radii(pw, ph, inner_ring_radius, outer_ring_radius);
    let orr2 = outer * outer;
    let irr2 = inner * inner;

    for y in 0..ph {
        let dy = y as i64 - pcv;
        let Some(row) = target.row_mut(y) else {
            break;
        };

        for (x, pixel) in row.enumerate() {
            let dx = x as i64 - pch;
            let r2 = dx * dx + dy * dy;
            if r2 < irr2 || r2 > orr2 {
                continue;
            }

            let degrees = ((dy as f64).atan2(dx as f64).to_degrees() + 90.0 + 360.0) % 360.0;
            let color = RgbaColor::from_hsl(degrees, 1.0, 0.5, 1.0)?;
            pixel.copy_from_slice(&format.pack(color));
        }
    }

    Ok(())
}
