//! Editor configuration, loaded from JSON.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::placeholder::PlaceholderRenderer;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::compositor::LayoutMetrics;
use crate::text::engine::{FixedAdvanceShaper, ParleyTextEngine, TextShaper};
use crate::text::style::{CaptionStyle, FontSlant, FontWeight};

/// Extra font directory, appended to the configured ones.
pub const FONT_DIR_ENV: &str = "CAPTION_FONT_DIR";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontFileConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub weight: FontWeight,
    #[serde(default)]
    pub slant: FontSlant,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub canvas: Canvas,
    pub metrics: LayoutMetrics,
    /// Style every control resets to when a session opens.
    pub default_style: CaptionStyle,
    pub font_files: Vec<FontFileConfig>,
    pub font_dirs: Vec<PathBuf>,
}

impl EditorConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> CaptionResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| CaptionError::validation(format!("parse editor config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> CaptionResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CaptionError::validation(format!("open editor config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> CaptionResult<()> {
        self.canvas.validate()?;
        self.metrics.validate(self.canvas)?;
        self.default_style.validate()?;
        Ok(())
    }

    /// Configured font directories plus `CAPTION_FONT_DIR` when set.
    pub fn resolved_font_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.font_dirs.clone();
        if let Some(extra) = std::env::var_os(FONT_DIR_ENV).filter(|v| !v.is_empty()) {
            dirs.push(PathBuf::from(extra));
        }
        dirs
    }

    /// Parley engine over every configured face, or the fixed-advance stand-in when no font
    /// could be registered.
    pub fn build_shaper(&self) -> CaptionResult<Box<dyn TextShaper>> {
        let mut engine = ParleyTextEngine::new();
        for f in &self.font_files {
            engine.register_file(&f.path, f.weight, f.slant)?;
        }
        for dir in self.resolved_font_dirs() {
            match engine.register_dir(&dir) {
                Ok(n) => tracing::debug!(dir = %dir.display(), faces = n, "font dir loaded"),
                Err(err) => tracing::warn!(dir = %dir.display(), error = %err, "font dir skipped"),
            }
        }

        if engine.face_count() == 0 {
            tracing::warn!("no fonts registered, captions use fixed-advance box glyphs");
            return Ok(Box::new(FixedAdvanceShaper::default()));
        }
        Ok(Box::new(engine))
    }

    pub fn placeholder_renderer(&self) -> PlaceholderRenderer {
        PlaceholderRenderer::new(self.resolved_font_dirs())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
