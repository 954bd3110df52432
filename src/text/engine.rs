//! Text measurement and painting.
//!
//! Layout math only needs advance widths, so the line breaker and compositor talk to a
//! [`TextShaper`]. The production implementation shapes with Parley and paints glyphs through
//! `vello_cpu`; [`FixedAdvanceShaper`] is a font-free stand-in with deterministic metrics.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{Point, Rgba8};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::raster::affine_to_cpu;
use crate::text::style::{FontSlant, FontSpec, FontWeight};

pub trait TextShaper {
    /// Advance width of `text` in canvas pixels.
    fn measure(&mut self, text: &str, font: &FontSpec) -> CaptionResult<f64>;

    /// Paint `text` with its left edge at `origin.x` and its line box bottom at `origin.y`.
    fn fill_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        font: &FontSpec,
        color: Rgba8,
        origin: Point,
    ) -> CaptionResult<()>;
}

struct RegisteredFace {
    family: String,
    weight: FontWeight,
    slant: FontSlant,
    font: vello_cpu::peniko::FontData,
}

/// Parley-backed shaper over explicitly registered font files.
pub struct ParleyTextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    faces: Vec<RegisteredFace>,
    width_cache: HashMap<(String, u32, FontWeight, FontSlant), f64>,
}

impl Default for ParleyTextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyTextEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: Vec::new(),
            width_cache: HashMap::new(),
        }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Register one font face and return its family name.
    pub fn register_face(
        &mut self,
        font_bytes: Vec<u8>,
        weight: FontWeight,
        slant: FontSlant,
    ) -> CaptionResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            CaptionError::validation("no font families registered from font bytes")
        })?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CaptionError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        self.faces.push(RegisteredFace {
            family: family.clone(),
            weight,
            slant,
            font,
        });
        self.width_cache.clear();
        tracing::debug!(%family, ?weight, ?slant, "registered font face");
        Ok(family)
    }

    pub fn register_file(
        &mut self,
        path: &Path,
        weight: FontWeight,
        slant: FontSlant,
    ) -> CaptionResult<String> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        self.register_face(bytes, weight, slant)
    }

    /// Register every `.ttf`/`.otf` in `dir`, guessing weight and slant from the file name
    /// (`Roboto-BoldItalic.ttf`). Returns the number of faces added.
    pub fn register_dir(&mut self, dir: &Path) -> CaptionResult<usize> {
        let rd = std::fs::read_dir(dir)
            .with_context(|| format!("read font dir '{}'", dir.display()))?;
        let mut paths: Vec<_> = rd
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|s| s.to_str())
                        .is_some_and(|ext| {
                            ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf")
                        })
            })
            .collect();
        paths.sort();

        let mut added = 0usize;
        for path in paths {
            let (weight, slant) = face_from_file_name(&path);
            match self.register_file(&path, weight, slant) {
                Ok(_) => added += 1,
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping font"),
            }
        }
        Ok(added)
    }

    /// Closest registered face: exact match, then same weight, then same slant, then any.
    fn face_index(&self, font: &FontSpec) -> CaptionResult<usize> {
        if self.faces.is_empty() {
            return Err(CaptionError::measurement("no font faces registered"));
        }
        let faces = &self.faces;
        let idx = faces
            .iter()
            .position(|f| f.weight == font.weight && f.slant == font.slant)
            .or_else(|| faces.iter().position(|f| f.weight == font.weight))
            .or_else(|| faces.iter().position(|f| f.slant == font.slant))
            .unwrap_or(0);
        Ok(idx)
    }

    fn layout(&mut self, text: &str, font: &FontSpec) -> CaptionResult<(usize, parley::Layout<()>)> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(CaptionError::measurement(
                "font size must be finite and > 0",
            ));
        }
        let idx = self.face_index(font)?;
        let face = &self.faces[idx];

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(match face.weight {
            FontWeight::Normal => parley::style::FontWeight::NORMAL,
            FontWeight::Bold => parley::style::FontWeight::BOLD,
        }));
        builder.push_default(parley::style::StyleProperty::FontStyle(match face.slant {
            FontSlant::Normal => parley::style::FontStyle::Normal,
            FontSlant::Italic => parley::style::FontStyle::Italic,
        }));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        Ok((idx, layout))
    }
}

impl TextShaper for ParleyTextEngine {
    fn measure(&mut self, text: &str, font: &FontSpec) -> CaptionResult<f64> {
        let key = (text.to_owned(), font.size_px.to_bits(), font.weight, font.slant);
        if let Some(w) = self.width_cache.get(&key) {
            return Ok(*w);
        }
        let (_, layout) = self.layout(text, font)?;
        let width = f64::from(layout.full_width());
        if !width.is_finite() {
            return Err(CaptionError::measurement(format!(
                "non-finite width for '{text}'"
            )));
        }
        self.width_cache.insert(key, width);
        Ok(width)
    }

    fn fill_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        font: &FontSpec,
        color: Rgba8,
        origin: Point,
    ) -> CaptionResult<()> {
        let (idx, layout) = self.layout(text, font)?;
        let face = &self.faces[idx].font;
        let top = origin.y - f64::from(layout.height());

        ctx.set_transform(affine_to_cpu(kurbo::Affine::translate((origin.x, top))));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(face)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

fn face_from_file_name(path: &Path) -> (FontWeight, FontSlant) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let weight = if stem.contains("bold") || stem.contains("black") || stem.contains("heavy") {
        FontWeight::Bold
    } else {
        FontWeight::Normal
    };
    let slant = if stem.contains("italic") || stem.contains("oblique") {
        FontSlant::Italic
    } else {
        FontSlant::Normal
    };
    (weight, slant)
}

/// Font-free shaper: every character advances by `advance_em * size` and paints as a box.
///
/// Spaces advance but paint nothing. Bold boxes are full width, regular ones are narrower.
#[derive(Clone, Copy, Debug)]
pub struct FixedAdvanceShaper {
    pub advance_em: f64,
}

impl Default for FixedAdvanceShaper {
    fn default() -> Self {
        Self { advance_em: 0.6 }
    }
}

impl FixedAdvanceShaper {
    fn advance(&self, font: &FontSpec) -> f64 {
        self.advance_em * f64::from(font.size_px)
    }
}

impl TextShaper for FixedAdvanceShaper {
    fn measure(&mut self, text: &str, font: &FontSpec) -> CaptionResult<f64> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(CaptionError::measurement(
                "font size must be finite and > 0",
            ));
        }
        Ok(self.advance(font) * text.chars().count() as f64)
    }

    fn fill_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        font: &FontSpec,
        color: Rgba8,
        origin: Point,
    ) -> CaptionResult<()> {
        let adv = self.advance(font);
        let size = f64::from(font.size_px);
        let inset = match font.weight {
            FontWeight::Bold => 0.05,
            FontWeight::Normal => 0.2,
        } * adv;
        let skew = match font.slant {
            FontSlant::Normal => 0.0,
            FontSlant::Italic => -0.2,
        };

        ctx.set_transform(vello_cpu::kurbo::Affine::new([
            1.0, 0.0, skew, 1.0, origin.x, origin.y,
        ]));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        for (i, c) in text.chars().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let x0 = adv * i as f64 + inset;
            let x1 = adv * (i + 1) as f64 - inset;
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(x0, -0.8 * size, x1, -0.1 * size));
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/engine.rs"]
mod tests;
