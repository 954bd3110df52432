//! Error placeholder shown in place of a background image that failed to load.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{CaptionError, CaptionResult};

const PLACEHOLDER_FILL: &str = "#f0f0f0";
const PLACEHOLDER_INK: &str = "#666666";
const PLACEHOLDER_FONT_PX: u32 = 24;

/// Rasterizes the placeholder frame through `usvg`/`resvg`, which brings its own text stack
/// backed by system fonts.
#[derive(Default)]
pub struct PlaceholderRenderer {
    font_dirs: Vec<PathBuf>,
    fontdb: Option<Arc<usvg::fontdb::Database>>,
}

impl PlaceholderRenderer {
    pub fn new(font_dirs: Vec<PathBuf>) -> Self {
        Self {
            font_dirs,
            fontdb: None,
        }
    }

    /// Render the placeholder into premultiplied RGBA8 bytes of `canvas` size.
    pub fn render(&mut self, canvas: Canvas, message: &str) -> CaptionResult<Vec<u8>> {
        let svg = placeholder_svg(canvas, message);
        let opts = usvg::Options {
            fontdb: self.fontdb(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
            .context("parse placeholder svg")
            .map_err(CaptionError::from)?;
        rasterize_svg_to_premul_rgba8(&tree, canvas.width, canvas.height)
    }

    fn fontdb(&mut self) -> Arc<usvg::fontdb::Database> {
        if let Some(db) = &self.fontdb {
            return db.clone();
        }
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in &self.font_dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        let db = Arc::new(db);
        self.fontdb = Some(db.clone());
        db
    }
}

pub(crate) fn placeholder_svg(canvas: Canvas, message: &str) -> String {
    let (w, h) = (canvas.width, canvas.height);
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect x="0" y="0" width="{w}" height="{h}" fill="{PLACEHOLDER_FILL}"/><text x="{cx}" y="{cy}" text-anchor="middle" font-family="Arial, sans-serif" font-size="{PLACEHOLDER_FONT_PX}" fill="{PLACEHOLDER_INK}">{msg}</text></svg>"#,
        cx = f64::from(w) / 2.0,
        cy = f64::from(h) / 2.0,
        msg = escape_xml(message),
    )
}

fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> CaptionResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CaptionError::render("failed to allocate placeholder pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

pub(crate) fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}

/// Escape text for HTML/XML content and attribute positions.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/placeholder.rs"]
mod tests;
