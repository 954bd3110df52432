use xxhash_rust::xxh3::Xxh3;

use crate::editor::session::{ImageState, Session};
use crate::foundation::core::Rgba8;
use crate::text::style::CaptionStyle;

const XXH3_SEED: u64 = 0x5c1a_77e0_b3d4_91c2;

/// Digest of everything a rendered frame depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn write_color(&mut self, c: Rgba8) {
        self.write_bytes(&[c.r, c.g, c.b, c.a]);
    }

    fn finish(self) -> FrameFingerprint {
        let v = self.inner.digest128();
        FrameFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

pub fn fingerprint_session(session: &Session) -> FrameFingerprint {
    let mut h = StableHasher::new();
    h.write_u64(session.id().0);

    let canvas = session.canvas();
    h.write_u32(canvas.width);
    h.write_u32(canvas.height);

    let m = session.metrics();
    h.write_f64(m.margin_x);
    h.write_f64(m.baseline_inset);
    h.write_f64(m.shadow_offset.x);
    h.write_f64(m.shadow_offset.y);

    write_style(&mut h, session.style());
    h.write_str(session.caption());

    match session.image() {
        ImageState::Unloaded | ImageState::Loading { .. } => h.write_u8(0),
        ImageState::Ready {
            viewport, ticket, ..
        } => {
            h.write_u8(1);
            h.write_u64(ticket.seq);
            h.write_f64(viewport.scale);
            h.write_f64(viewport.offset.x);
            h.write_f64(viewport.offset.y);
        }
        ImageState::Failed { .. } => h.write_u8(2),
    }
    h.finish()
}

fn write_style(h: &mut StableHasher, s: &CaptionStyle) {
    h.write_u32(s.font_size);
    h.write_u32(s.line_height);
    h.write_u8(s.weight as u8);
    h.write_u8(s.slant as u8);
    h.write_u8(s.align as u8);
    h.write_color(s.text_color);
    h.write_u32(s.shadow_blur);
    h.write_color(s.gradient_color);
    h.write_f32(s.gradient_opacity);
}

#[cfg(test)]
#[path = "../../tests/unit/editor/fingerprint.rs"]
mod tests;
