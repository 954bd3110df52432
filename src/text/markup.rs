//! Caption markup parser.
//!
//! Rich-text editors emit loose HTML (`<br>` without a close tag, unquoted attributes, named
//! entities), so the reader runs in a forgiving mode and repairs nesting on the fly. The result
//! is a small typed tree that later passes fold without looking at tag names again.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::assets::color::parse_color;
use crate::foundation::core::Rgba8;

#[derive(Clone, Debug, PartialEq)]
pub enum MarkupNode {
    Text(String),
    Bold(Vec<MarkupNode>),
    Italic(Vec<MarkupNode>),
    ColorSpan {
        color: Rgba8,
        children: Vec<MarkupNode>,
    },
    Break,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum FrameKind {
    Bold,
    Italic,
    Color(Rgba8),
    Block,
    Transparent,
}

struct Frame {
    name: String,
    kind: FrameKind,
    children: Vec<MarkupNode>,
    /// Whether the last child is a text node still accepting characters. Any element
    /// boundary ends it, so text on either side of a tag stays two nodes.
    text_open: bool,
}

impl Frame {
    fn new(name: String, kind: FrameKind) -> Self {
        Self {
            name,
            kind,
            children: Vec::new(),
            text_open: false,
        }
    }

    fn root() -> Self {
        Self::new(String::new(), FrameKind::Transparent)
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.children.last_mut() {
            Some(MarkupNode::Text(last)) if self.text_open => last.push_str(text),
            _ => self.children.push(MarkupNode::Text(text.to_owned())),
        }
        self.text_open = true;
    }

    fn push_node(&mut self, node: MarkupNode) {
        self.children.push(node);
        self.text_open = false;
    }

    fn into_nodes(self, out: &mut Vec<MarkupNode>) {
        match self.kind {
            FrameKind::Bold => out.push(MarkupNode::Bold(self.children)),
            FrameKind::Italic => out.push(MarkupNode::Italic(self.children)),
            FrameKind::Color(color) => out.push(MarkupNode::ColorSpan {
                color,
                children: self.children,
            }),
            FrameKind::Block => {
                out.push(MarkupNode::Break);
                out.extend(self.children);
                out.push(MarkupNode::Break);
            }
            FrameKind::Transparent => out.extend(self.children),
        }
    }
}

struct TreeBuilder {
    stack: Vec<Frame>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Frame::root()],
        }
    }

    fn top(&mut self) -> &mut Frame {
        // The root frame is never popped.
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn open(&mut self, name: String, kind: FrameKind) {
        self.top().text_open = false;
        self.stack.push(Frame::new(name, kind));
    }

    fn close(&mut self, name: &str) {
        let Some(pos) = self.stack.iter().rposition(|f| f.name == name) else {
            tracing::debug!(tag = name, "ignoring stray end tag");
            return;
        };
        if pos == 0 {
            return;
        }
        while self.stack.len() > pos {
            self.pop_frame();
        }
    }

    fn pop_frame(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            let parent = self.top();
            let mut nodes = std::mem::take(&mut parent.children);
            frame.into_nodes(&mut nodes);
            parent.children = nodes;
            parent.text_open = false;
        }
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while self.stack.len() > 1 {
            self.pop_frame();
        }
        self.stack.pop().map(|f| f.children).unwrap_or_default()
    }
}

fn is_void(name: &str) -> bool {
    matches!(
        name,
        "br" | "img" | "hr" | "input" | "wbr" | "meta" | "link" | "area" | "col" | "source"
    )
}

fn frame_kind(name: &str, e: &BytesStart<'_>) -> FrameKind {
    match name {
        "b" | "strong" => FrameKind::Bold,
        "i" | "em" => FrameKind::Italic,
        "div" | "p" => FrameKind::Block,
        "font" => attribute(e, "color")
            .and_then(|v| parse_color(&v).ok())
            .map_or(FrameKind::Transparent, FrameKind::Color),
        "span" => attribute(e, "style")
            .and_then(|v| color_from_style(&v))
            .map_or(FrameKind::Transparent, FrameKind::Color),
        _ => FrameKind::Transparent,
    }
}

fn attribute(e: &BytesStart<'_>, key: &str) -> Option<String> {
    for attr in e.html_attributes().flatten() {
        if attr.key.as_ref().eq_ignore_ascii_case(key.as_bytes()) {
            return Some(String::from_utf8_lossy(&attr.value).into_owned());
        }
    }
    None
}

/// Pull `color` out of an inline `style` attribute.
fn color_from_style(style: &str) -> Option<Rgba8> {
    style.split(';').find_map(|decl| {
        let (prop, value) = decl.split_once(':')?;
        if prop.trim().eq_ignore_ascii_case("color") {
            parse_color(value.trim()).ok()
        } else {
            None
        }
    })
}

fn resolve_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    named_entity(name).map(String::from)
}

/// Named entities a pasted caption realistically carries: XML basics, typography and the
/// Latin-1 letters.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("laquo", '«'),
    ("raquo", '»'),
    ("lsquo", '‘'),
    ("rsquo", '’'),
    ("ldquo", '“'),
    ("rdquo", '”'),
    ("ndash", '–'),
    ("mdash", '—'),
    ("hellip", '…'),
    ("euro", '€'),
    ("copy", '©'),
    ("reg", '®'),
    ("deg", '°'),
    ("middot", '·'),
    ("szlig", 'ß'),
];

/// Lowercase Latin-1 letters; the capitalised entity name (`Eacute`, `AElig`) gives the
/// uppercase letter.
const LATIN1_LETTERS: &[(&str, char)] = &[
    ("agrave", 'à'),
    ("aacute", 'á'),
    ("acirc", 'â'),
    ("atilde", 'ã'),
    ("auml", 'ä'),
    ("aring", 'å'),
    ("aelig", 'æ'),
    ("ccedil", 'ç'),
    ("egrave", 'è'),
    ("eacute", 'é'),
    ("ecirc", 'ê'),
    ("euml", 'ë'),
    ("igrave", 'ì'),
    ("iacute", 'í'),
    ("icirc", 'î'),
    ("iuml", 'ï'),
    ("eth", 'ð'),
    ("ntilde", 'ñ'),
    ("ograve", 'ò'),
    ("oacute", 'ó'),
    ("ocirc", 'ô'),
    ("otilde", 'õ'),
    ("ouml", 'ö'),
    ("oslash", 'ø'),
    ("ugrave", 'ù'),
    ("uacute", 'ú'),
    ("ucirc", 'û'),
    ("uuml", 'ü'),
    ("yacute", 'ý'),
    ("yuml", 'ÿ'),
    ("thorn", 'þ'),
];

fn named_entity(name: &str) -> Option<char> {
    let lookup = |table: &[(&str, char)], key: &str| {
        table.iter().find(|(n, _)| *n == key).map(|&(_, c)| c)
    };
    if let Some(c) = lookup(NAMED_ENTITIES, name).or_else(|| lookup(LATIN1_LETTERS, name)) {
        return Some(c);
    }

    let lowered = match name {
        "AElig" => "aelig".to_owned(),
        "ETH" => "eth".to_owned(),
        "THORN" => "thorn".to_owned(),
        _ => {
            let mut chars = name.chars();
            let first = chars.next().filter(char::is_ascii_uppercase)?;
            let rest = chars.as_str();
            if rest.chars().any(|c| c.is_ascii_uppercase()) {
                return None;
            }
            format!("{}{rest}", first.to_ascii_lowercase())
        }
    };
    let lower = lookup(LATIN1_LETTERS, &lowered)?;
    let mut upper = lower.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Decode entity references in text the reader could not tokenize.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let resolved =
            entity_len(tail).and_then(|len| resolve_entity(&tail[..len]).map(|r| (r, len)));
        match resolved {
            Some((r, len)) => {
                out.push_str(&r);
                rest = &tail[len + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Length of the entity name at the start of `s` (the text after `&`) when it is followed by
/// `;`: `#123`, `#x1F` or an alphanumeric name.
fn entity_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let len = match bytes.first()? {
        b'#' => {
            let digits = match bytes.get(1) {
                Some(b'x' | b'X') => {
                    bytes[2..]
                        .iter()
                        .take_while(|b| b.is_ascii_hexdigit())
                        .count()
                        + 1
                }
                _ => bytes[1..].iter().take_while(|b| b.is_ascii_digit()).count(),
            };
            if digits == 0 || (digits == 1 && matches!(bytes.get(1), Some(b'x' | b'X'))) {
                return None;
            }
            digits + 1
        }
        b if b.is_ascii_alphabetic() => bytes
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count(),
        _ => return None,
    };
    (bytes.get(len) == Some(&b';')).then_some(len)
}

/// Escape the characters browsers read as text but an XML reader rejects: a `<` that cannot
/// start a tag (`5 < 6`, or a tag never closed by `>`) and an `&` that does not start an
/// entity reference (`Tom & Jerry`).
fn escape_loose_text(markup: &str) -> Cow<'_, str> {
    let needs_escape = |i: usize, b: u8| match b {
        b'<' => !starts_tag(&markup[i..]),
        b'&' => entity_len(&markup[i + 1..]).is_none(),
        _ => false,
    };
    if !markup.bytes().enumerate().any(|(i, b)| needs_escape(i, b)) {
        return Cow::Borrowed(markup);
    }

    let mut out = String::with_capacity(markup.len() + 16);
    let mut last = 0;
    for (i, b) in markup.bytes().enumerate() {
        if !needs_escape(i, b) {
            continue;
        }
        out.push_str(&markup[last..i]);
        out.push_str(if b == b'<' { "&lt;" } else { "&amp;" });
        last = i + 1;
    }
    out.push_str(&markup[last..]);
    Cow::Owned(out)
}

/// `s` begins with `<`. A tag needs a letter, `/`, `!` or `?` next and a closing `>` later.
fn starts_tag(s: &str) -> bool {
    let bytes = s.as_bytes();
    let opens = matches!(
        bytes.get(1),
        Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?')
    );
    opens && s[1..].contains('>')
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// Parse caption markup into a node tree. Never fails: unclosed elements are closed at the end
/// of input, stray end tags are dropped, stray `<` and `&` are literal text, and anything the
/// reader still rejects is kept as text from the point of the error.
pub fn parse_markup(markup: &str) -> Vec<MarkupNode> {
    let source = escape_loose_text(markup);
    let mut reader = Reader::from_str(&source);
    {
        let cfg = reader.config_mut();
        cfg.trim_text(false);
        cfg.expand_empty_elements = false;
        cfg.check_end_names = false;
        cfg.allow_unmatched_ends = true;
    }

    let mut tree = TreeBuilder::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = tag_name(e.name().as_ref());
                if name == "br" {
                    tree.top().push_node(MarkupNode::Break);
                } else if is_void(&name) {
                    tree.top().text_open = false;
                } else {
                    let kind = frame_kind(&name, &e);
                    tree.open(name, kind);
                }
            }
            Ok(Event::Empty(e)) => {
                let name = tag_name(e.name().as_ref());
                match name.as_str() {
                    "br" => tree.top().push_node(MarkupNode::Break),
                    "div" | "p" => {
                        tree.top().push_node(MarkupNode::Break);
                        tree.top().push_node(MarkupNode::Break);
                    }
                    _ => tree.top().text_open = false,
                }
            }
            Ok(Event::End(e)) => {
                let name = tag_name(e.name().as_ref());
                if !is_void(&name) {
                    tree.close(&name);
                }
            }
            Ok(Event::Text(e)) => match e.decode() {
                Ok(text) => tree.top().push_text(&text),
                Err(err) => tracing::warn!(error = %err, "undecodable caption text skipped"),
            },
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                tree.top().push_text(&text);
            }
            Ok(Event::GeneralRef(e)) => match e.decode() {
                Ok(name) => match resolve_entity(&name) {
                    Some(resolved) => tree.top().push_text(&resolved),
                    None => tree.top().push_text(&format!("&{name};")),
                },
                Err(err) => tracing::warn!(error = %err, "undecodable entity skipped"),
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                let at = usize::try_from(reader.error_position()).unwrap_or(usize::MAX);
                tracing::warn!(
                    error = %err,
                    position = at,
                    "caption markup kept as text after syntax error"
                );
                if let Some(rest) = source.get(at..) {
                    tree.top().push_text(&decode_entities(rest));
                }
                break;
            }
        }
    }
    tree.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/text/markup.rs"]
mod tests;
