use crate::foundation::core::{Affine, Canvas, Point, Vec2};
use crate::foundation::error::{CaptionError, CaptionResult};

/// Placement of the background image inside the canvas.
///
/// The scaled image always covers the canvas: each offset component stays within
/// `[canvas_dim - image_dim * scale, 0]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub offset: Vec2,
    image_size: (f64, f64),
    canvas: Canvas,
}

impl Viewport {
    /// Cover-fit `image_w x image_h` into `canvas`, centered along the axis with excess.
    pub fn cover(canvas: Canvas, image_w: u32, image_h: u32) -> CaptionResult<Self> {
        if image_w == 0 || image_h == 0 {
            return Err(CaptionError::validation(format!(
                "cannot fit a {image_w}x{image_h} image"
            )));
        }
        let (cw, ch) = (canvas.width_f64(), canvas.height_f64());
        let (iw, ih) = (f64::from(image_w), f64::from(image_h));

        let (scale, offset) = if iw / ih > cw / ch {
            let scale = ch / ih;
            (scale, Vec2::new((cw - iw * scale) / 2.0, 0.0))
        } else {
            let scale = cw / iw;
            (scale, Vec2::new(0.0, (ch - ih * scale) / 2.0))
        };

        Ok(Self {
            scale,
            offset,
            image_size: (iw, ih),
            canvas,
        })
    }

    /// Lowest allowed offset per axis; the upper bound is always zero.
    pub fn min_offset(&self) -> Vec2 {
        Vec2::new(
            (self.canvas.width_f64() - self.image_size.0 * self.scale).min(0.0),
            (self.canvas.height_f64() - self.image_size.1 * self.scale).min(0.0),
        )
    }

    pub fn clamp_offset(&self, candidate: Vec2) -> Vec2 {
        let min = self.min_offset();
        Vec2::new(
            clamp_axis(candidate.x, min.x),
            clamp_axis(candidate.y, min.y),
        )
    }

    /// Move to `candidate` (clamped). Returns whether the offset changed.
    pub fn pan_to(&mut self, candidate: Vec2) -> bool {
        let next = self.clamp_offset(candidate);
        if next == self.offset {
            return false;
        }
        self.offset = next;
        true
    }

    /// Image space to canvas space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Canvas point to image pixel coordinates.
    pub fn canvas_to_image(&self, p: Point) -> Point {
        self.transform().inverse() * p
    }

    pub fn image_size(&self) -> (f64, f64) {
        self.image_size
    }
}

/// NaN candidates land on `min`.
fn clamp_axis(v: f64, min: f64) -> f64 {
    v.max(min).min(0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/editor/viewport.rs"]
mod tests;
