//! Separable Gaussian blur over premultiplied RGBA8, fixed-point Q16 weights.

use crate::foundation::error::{CaptionError, CaptionResult};

/// Canvas-style `shadowBlur` to a Gaussian `(radius, sigma)` pair.
pub fn shadow_blur_params(shadow_blur: u32) -> Option<(u32, f32)> {
    if shadow_blur == 0 {
        return None;
    }
    let sigma = shadow_blur as f32 / 2.0;
    let radius = (sigma * 3.0).ceil() as u32;
    Some((radius, sigma))
}

pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> CaptionResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| CaptionError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(CaptionError::render(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Blur only the area that can change: the bounding box of non-transparent pixels grown by
/// `radius`. Everything else in a sparse layer stays transparent either way.
pub fn blur_sparse_in_place(
    buf: &mut [u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> CaptionResult<()> {
    if buf.len() != (width as usize) * (height as usize) * 4 {
        return Err(CaptionError::render(
            "blur_sparse_in_place expects buf matching width*height*4",
        ));
    }
    let Some((x0, y0, x1, y1)) = opaque_bounds(buf, width, height) else {
        return Ok(());
    };
    let x0 = x0.saturating_sub(radius);
    let y0 = y0.saturating_sub(radius);
    let x1 = (x1 + radius + 1).min(width);
    let y1 = (y1 + radius + 1).min(height);
    let (rw, rh) = (x1 - x0, y1 - y0);

    let stride = width as usize * 4;
    let mut region = Vec::with_capacity(rw as usize * rh as usize * 4);
    for y in y0..y1 {
        let start = y as usize * stride + x0 as usize * 4;
        region.extend_from_slice(&buf[start..start + rw as usize * 4]);
    }

    let blurred = blur_rgba8_premul(&region, rw, rh, radius, sigma)?;
    for (row, y) in (y0..y1).enumerate() {
        let start = y as usize * stride + x0 as usize * 4;
        let src = row * rw as usize * 4;
        buf[start..start + rw as usize * 4].copy_from_slice(&blurred[src..src + rw as usize * 4]);
    }
    Ok(())
}

fn opaque_bounds(buf: &[u8], width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..height {
        for x in 0..width {
            let a = buf[((y * width + x) as usize) * 4 + 3];
            if a == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((bx0, by0, bx1, by1)) => (bx0.min(x), by0.min(y), bx1.max(x), by1.max(y)),
            });
        }
    }
    bounds
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CaptionResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CaptionError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(CaptionError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| (((wf / sum) * 65536.0).round() as i64).clamp(0, 65536) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        // Push rounding drift into the center tap so the kernel sums to exactly 1.0.
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
