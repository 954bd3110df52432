use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::CaptionResult;
use crate::render::composite::over;

/// Scrim coverage for pixel row `y`: `opacity` at the bottom edge fading linearly to zero at
/// the vertical midpoint, sampled at the pixel center.
pub fn scrim_alpha(canvas_height: u32, y: u32, opacity: f32) -> f32 {
    let h = f64::from(canvas_height);
    let mid = h / 2.0;
    let cy = f64::from(y) + 0.5;
    if cy < mid {
        return 0.0;
    }
    let t = ((h - cy) / (h - mid)).clamp(0.0, 1.0);
    (f64::from(opacity.clamp(0.0, 1.0)) * (1.0 - t)) as f32
}

/// Composite the bottom-half gradient onto `dst` in place.
pub fn apply_scrim(dst: &mut [u8], canvas: Canvas, color: Rgba8, opacity: f32) -> CaptionResult<()> {
    if opacity <= 0.0 || color.a == 0 {
        return Ok(());
    }
    let stride = canvas.width as usize * 4;
    let start_row = canvas.height / 2;
    for y in start_row..canvas.height {
        let alpha = scrim_alpha(canvas.height, y, opacity);
        let px = color.with_opacity(alpha * f32::from(color.a) / 255.0).to_premul().to_array();
        if px[3] == 0 {
            continue;
        }
        let row = &mut dst[y as usize * stride..(y as usize + 1) * stride];
        for d in row.chunks_exact_mut(4) {
            let out = over([d[0], d[1], d[2], d[3]], px, 1.0);
            d.copy_from_slice(&out);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/scrim.rs"]
mod tests;
