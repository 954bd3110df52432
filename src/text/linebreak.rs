use crate::foundation::core::Rgba8;
use crate::text::engine::TextShaper;
use crate::text::runs::CaptionToken;
use crate::text::style::FontSpec;

/// A measured word ready to paint.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleRun {
    pub word: String,
    pub font: FontSpec,
    pub color: Rgba8,
    /// Advance of the word plus one trailing space.
    pub width: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub runs: Vec<StyleRun>,
    pub width: f64,
}

impl Line {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Words joined with single spaces.
    pub fn text(&self) -> String {
        self.runs
            .iter()
            .map(|r| r.word.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

struct LineBuilder {
    max_width: f64,
    lines: Vec<Line>,
    line: Line,
}

impl LineBuilder {
    fn push_run(&mut self, run: StyleRun) {
        if !self.line.is_empty() && self.line.width + run.width > self.max_width {
            self.close_line();
        }
        self.line.width += run.width;
        self.line.runs.push(run);
    }

    /// Close the current line if it carries any words.
    fn close_line(&mut self) {
        if self.line.is_empty() {
            return;
        }
        self.lines.push(std::mem::take(&mut self.line));
    }

    fn finish(mut self) -> Vec<Line> {
        self.close_line();
        self.lines
    }
}

/// Greedy word wrap.
///
/// A word is measured with one trailing space and starts a new line when it would push a
/// non-empty line past `max_width`. A word wider than `max_width` sits alone on its line. An
/// explicit break closes the current line; consecutive breaks do not produce empty lines.
/// Words the shaper cannot measure are dropped.
#[tracing::instrument(skip(tokens, shaper), fields(tokens = tokens.len()))]
pub fn break_lines(
    tokens: &[CaptionToken],
    font_size: f32,
    max_width: f64,
    shaper: &mut dyn TextShaper,
) -> Vec<Line> {
    let mut builder = LineBuilder {
        max_width,
        lines: Vec::new(),
        line: Line::default(),
    };

    for token in tokens {
        match token {
            CaptionToken::Break => builder.close_line(),
            CaptionToken::Word(w) => {
                let font = FontSpec {
                    size_px: font_size,
                    weight: w.weight,
                    slant: w.slant,
                };
                let measured = format!("{} ", w.text);
                match shaper.measure(&measured, &font) {
                    Ok(width) => builder.push_run(StyleRun {
                        word: w.text.clone(),
                        font,
                        color: w.color,
                        width,
                    }),
                    Err(err) => {
                        tracing::warn!(word = %w.text, error = %err, "skipping unmeasurable word");
                    }
                }
            }
        }
    }

    builder.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/text/linebreak.rs"]
mod tests;
