use crate::foundation::core::Rgba8;
use crate::foundation::error::{CaptionError, CaptionResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    Normal,
    #[default]
    Bold,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Resolved font for one run: size plus face selection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub size_px: f32,
    pub weight: FontWeight,
    pub slant: FontSlant,
}

impl FontSpec {
    /// CSS-like shorthand, e.g. `italic 700 50px`.
    pub fn css(&self) -> String {
        let slant = match self.slant {
            FontSlant::Normal => "normal",
            FontSlant::Italic => "italic",
        };
        let weight = match self.weight {
            FontWeight::Normal => 400,
            FontWeight::Bold => 700,
        };
        format!("{slant} {weight} {}px", self.size_px)
    }
}

/// Every style control of the editor, applied to the whole caption.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    pub font_size: u32,
    pub line_height: u32,
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub text_color: Rgba8,
    pub align: TextAlign,
    pub shadow_blur: u32,
    pub gradient_color: Rgba8,
    pub gradient_opacity: f32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font_size: 50,
            line_height: 60,
            weight: FontWeight::Bold,
            slant: FontSlant::Normal,
            text_color: Rgba8::WHITE,
            align: TextAlign::Center,
            shadow_blur: 0,
            gradient_color: Rgba8::BLACK,
            gradient_opacity: 0.7,
        }
    }
}

impl CaptionStyle {
    pub fn validate(&self) -> CaptionResult<()> {
        if self.font_size == 0 {
            return Err(CaptionError::validation("font_size must be > 0"));
        }
        if self.line_height == 0 {
            return Err(CaptionError::validation("line_height must be > 0"));
        }
        if !self.gradient_opacity.is_finite() || !(0.0..=1.0).contains(&self.gradient_opacity) {
            return Err(CaptionError::validation(
                "gradient_opacity must be within 0..=1",
            ));
        }
        Ok(())
    }

    /// Font of an unformatted word.
    pub fn base_font(&self) -> FontSpec {
        FontSpec {
            size_px: self.font_size as f32,
            weight: self.weight,
            slant: self.slant,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/style.rs"]
mod tests;
