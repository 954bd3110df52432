use crate::foundation::core::Rgba8;
use crate::text::markup::{MarkupNode, parse_markup};
use crate::text::style::{CaptionStyle, FontSlant, FontWeight};

/// One caption word with its resolved formatting. Text is already uppercased.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledWord {
    pub text: String,
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub color: Rgba8,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CaptionToken {
    Word(StyledWord),
    Break,
}

#[derive(Clone, Copy)]
struct Inherited {
    weight: FontWeight,
    slant: FontSlant,
    color: Rgba8,
}

/// Fold a parsed tree into words and explicit breaks, in source order.
///
/// The innermost formatting node wins; anything unset falls back to the caption defaults.
pub fn fold_tokens(nodes: &[MarkupNode], style: &CaptionStyle) -> Vec<CaptionToken> {
    let mut out = Vec::new();
    let base = Inherited {
        weight: style.weight,
        slant: style.slant,
        color: style.text_color,
    };
    fold_into(nodes, base, &mut out);
    out
}

fn fold_into(nodes: &[MarkupNode], cur: Inherited, out: &mut Vec<CaptionToken>) {
    for node in nodes {
        match node {
            MarkupNode::Text(text) => {
                for word in text.split_whitespace() {
                    out.push(CaptionToken::Word(StyledWord {
                        text: word.to_uppercase(),
                        weight: cur.weight,
                        slant: cur.slant,
                        color: cur.color,
                    }));
                }
            }
            MarkupNode::Bold(children) => fold_into(
                children,
                Inherited {
                    weight: FontWeight::Bold,
                    ..cur
                },
                out,
            ),
            MarkupNode::Italic(children) => fold_into(
                children,
                Inherited {
                    slant: FontSlant::Italic,
                    ..cur
                },
                out,
            ),
            MarkupNode::ColorSpan { color, children } => fold_into(
                children,
                Inherited {
                    color: *color,
                    ..cur
                },
                out,
            ),
            MarkupNode::Break => out.push(CaptionToken::Break),
        }
    }
}

/// Parse caption markup and resolve every word's formatting.
pub fn extract_tokens(markup: &str, style: &CaptionStyle) -> Vec<CaptionToken> {
    fold_tokens(&parse_markup(markup), style)
}

#[cfg(test)]
#[path = "../../tests/unit/text/runs.rs"]
mod tests;
