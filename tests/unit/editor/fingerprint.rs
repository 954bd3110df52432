use super::*;
use crate::assets::decode::PreparedImage;
use crate::editor::session::SessionId;
use crate::foundation::core::{Canvas, Vec2};
use crate::render::compositor::LayoutMetrics;

fn session() -> Session {
    Session::new(
        SessionId(3),
        Canvas::new(100, 100).unwrap(),
        LayoutMetrics::default(),
        CaptionStyle::default(),
        String::new(),
        "caption".into(),
        String::new(),
    )
}

#[test]
fn identical_state_has_identical_fingerprint() {
    assert_eq!(fingerprint_session(&session()), fingerprint_session(&session()));
}

#[test]
fn caption_style_and_pan_changes_are_observed() {
    let base = session();
    let fp = fingerprint_session(&base);

    let mut s = base.clone();
    s.set_caption("other".into());
    assert_ne!(fingerprint_session(&s), fp);

    let mut s = base.clone();
    s.style.shadow_blur = 3;
    assert_ne!(fingerprint_session(&s), fp);

    let mut s = base.clone();
    let t = s.begin_load();
    s.finish_load(t, PreparedImage::solid(50, 100, [0, 0, 0, 255]).unwrap())
        .unwrap();
    let loaded = fingerprint_session(&s);
    assert_ne!(loaded, fp);
    s.viewport_mut().unwrap().pan_to(Vec2::new(0.0, -10.0));
    assert_ne!(fingerprint_session(&s), loaded);
}

#[test]
fn body_does_not_affect_fingerprint() {
    let a = session();
    let b = Session::new(
        SessionId(3),
        Canvas::new(100, 100).unwrap(),
        LayoutMetrics::default(),
        CaptionStyle::default(),
        String::new(),
        "caption".into(),
        "some body".into(),
    );
    assert_eq!(fingerprint_session(&a), fingerprint_session(&b));
}
