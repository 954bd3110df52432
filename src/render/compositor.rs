//! Fixed z-order frame assembly: background, scrim, shadowed caption.

use crate::assets::decode::PreparedImage;
use crate::assets::placeholder::PlaceholderRenderer;
use crate::foundation::core::{Affine, Canvas, Point, Rgba8, Vec2};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::FrameRGBA;
use crate::render::blur::{blur_sparse_in_place, shadow_blur_params};
use crate::render::composite::{fill_in_place, over_in_place};
use crate::render::raster::{draw_image, paint_layer};
use crate::render::scrim::apply_scrim;
use crate::text::engine::TextShaper;
use crate::text::linebreak::Line;
use crate::text::style::{CaptionStyle, TextAlign};

/// Placement constants shared by layout and painting.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Left/right inset of the text block; wrap width is `canvas_width - 2 * margin_x`.
    pub margin_x: f64,
    /// Distance from the canvas bottom to the bottom of the last caption line.
    pub baseline_inset: f64,
    pub shadow_offset: Vec2,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            margin_x: 50.0,
            baseline_inset: 90.0,
            shadow_offset: Vec2::new(2.0, 2.0),
        }
    }
}

impl LayoutMetrics {
    pub fn validate(&self, canvas: Canvas) -> CaptionResult<()> {
        if !self.margin_x.is_finite() || self.margin_x < 0.0 {
            return Err(CaptionError::validation("margin_x must be finite and >= 0"));
        }
        if self.max_line_width(canvas) <= 0.0 {
            return Err(CaptionError::validation(
                "margin_x leaves no room for text",
            ));
        }
        if !self.baseline_inset.is_finite() {
            return Err(CaptionError::validation("baseline_inset must be finite"));
        }
        if !self.shadow_offset.x.is_finite() || !self.shadow_offset.y.is_finite() {
            return Err(CaptionError::validation("shadow_offset must be finite"));
        }
        Ok(())
    }

    pub fn max_line_width(&self, canvas: Canvas) -> f64 {
        canvas.width_f64() - 2.0 * self.margin_x
    }
}

/// Left edge and bottom of each line, in canvas pixels.
pub fn place_lines(
    lines: &[Line],
    canvas: Canvas,
    metrics: &LayoutMetrics,
    style: &CaptionStyle,
) -> Vec<Point> {
    let n = lines.len();
    let last_bottom = canvas.height_f64() - metrics.baseline_inset;
    let line_height = f64::from(style.line_height);
    let first_bottom = last_bottom - (n.saturating_sub(1) as f64) * line_height;

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let x = match style.align {
                TextAlign::Left => metrics.margin_x,
                TextAlign::Center => canvas.width_f64() / 2.0 - line.width / 2.0,
                TextAlign::Right => canvas.width_f64() - metrics.margin_x - line.width,
            };
            Point::new(x, first_bottom + i as f64 * line_height)
        })
        .collect()
}

#[derive(Clone, Copy, Debug)]
pub enum Background<'a> {
    /// Image not decoded yet; only the clear color shows.
    Pending,
    Image {
        image: &'a PreparedImage,
        /// Image space to canvas space.
        transform: Affine,
    },
    Failed {
        message: &'a str,
    },
}

/// Everything one frame depends on.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub canvas: Canvas,
    pub metrics: &'a LayoutMetrics,
    pub style: &'a CaptionStyle,
    pub background: Background<'a>,
    pub lines: &'a [Line],
}

pub struct Compositor {
    placeholder: PlaceholderRenderer,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(PlaceholderRenderer::default())
    }
}

impl Compositor {
    pub fn new(placeholder: PlaceholderRenderer) -> Self {
        Self { placeholder }
    }

    /// Render `scene` into a fresh frame. Identical scenes produce identical bytes.
    #[tracing::instrument(skip(self, scene, shaper), fields(w = scene.canvas.width, h = scene.canvas.height, lines = scene.lines.len()))]
    pub fn render(
        &mut self,
        scene: &Scene<'_>,
        shaper: &mut dyn TextShaper,
    ) -> CaptionResult<FrameRGBA> {
        let canvas = scene.canvas;

        if let Background::Failed { message } = scene.background {
            let data = self.placeholder.render(canvas, message)?;
            return Ok(FrameRGBA {
                width: canvas.width,
                height: canvas.height,
                data,
                premultiplied: true,
            });
        }

        let mut data = vec![0u8; canvas.byte_len()];
        fill_in_place(&mut data, [0, 0, 0, 255]);

        if let Background::Image { image, transform } = scene.background {
            let layer = paint_layer(canvas, |ctx| draw_image(ctx, image, transform))?;
            over_in_place(&mut data, &layer, 1.0)?;
        }

        apply_scrim(
            &mut data,
            canvas,
            scene.style.gradient_color,
            scene.style.gradient_opacity,
        )?;

        if !scene.lines.is_empty() {
            self.draw_caption(&mut data, scene, shaper)?;
        }

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }

    fn draw_caption(
        &mut self,
        dst: &mut [u8],
        scene: &Scene<'_>,
        shaper: &mut dyn TextShaper,
    ) -> CaptionResult<()> {
        let canvas = scene.canvas;
        let origins = place_lines(scene.lines, canvas, scene.metrics, scene.style);
        let offset = scene.metrics.shadow_offset;

        // The shadow lives in its own layer, so nothing about it outlives this pass.
        let mut shadow = paint_layer(canvas, |ctx| {
            paint_lines(ctx, scene.lines, &origins, offset, Some(Rgba8::BLACK), &mut *shaper)
        })?;
        if let Some((radius, sigma)) = shadow_blur_params(scene.style.shadow_blur) {
            blur_sparse_in_place(&mut shadow, canvas.width, canvas.height, radius, sigma)?;
        }
        over_in_place(dst, &shadow, 1.0)?;

        let text = paint_layer(canvas, |ctx| {
            paint_lines(ctx, scene.lines, &origins, Vec2::ZERO, None, &mut *shaper)
        })?;
        over_in_place(dst, &text, 1.0)
    }
}

/// Paint every run. `ink` overrides run colors (keeping their alpha) for the shadow pass.
fn paint_lines(
    ctx: &mut vello_cpu::RenderContext,
    lines: &[Line],
    origins: &[Point],
    offset: Vec2,
    ink: Option<Rgba8>,
    shaper: &mut dyn TextShaper,
) -> CaptionResult<()> {
    for (line, origin) in lines.iter().zip(origins) {
        let mut pen = *origin + offset;
        for run in &line.runs {
            let color = match ink {
                Some(ink) => Rgba8 { a: run.color.a, ..ink },
                None => run.color,
            };
            if let Err(err) = shaper.fill_text(ctx, &run.word, &run.font, color, pen) {
                tracing::warn!(word = %run.word, error = %err, "skipping unpaintable word");
            }
            pen.x += run.width;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
