use super::*;
use crate::text::engine::FixedAdvanceShaper;

fn session(caption: &str, body: &str) -> Session {
    Session::new(
        SessionId(1),
        Canvas::new(200, 200).unwrap(),
        LayoutMetrics::default(),
        CaptionStyle::default(),
        "photo.png".into(),
        caption.into(),
        body.into(),
    )
}

#[test]
fn starts_unloaded_and_tickets_supersede() {
    let mut s = session("", "");
    assert!(matches!(s.image(), ImageState::Unloaded));
    let first = s.begin_load();
    assert!(s.awaits(first));
    let second = s.begin_load();
    assert!(!s.awaits(first));
    assert!(s.awaits(second));
}

#[test]
fn finish_load_builds_cover_viewport() {
    let mut s = session("", "");
    let t = s.begin_load();
    s.finish_load(t, PreparedImage::solid(100, 400, [0, 0, 0, 255]).unwrap())
        .unwrap();
    let vp = s.viewport().unwrap();
    assert_eq!(vp.scale, 2.0);
    assert_eq!(vp.offset.y, -300.0);
    assert!(!s.awaits(t));
}

#[test]
fn failed_load_has_no_viewport() {
    let mut s = session("", "");
    s.begin_load();
    s.fail_load("404");
    assert!(s.viewport().is_none());
    assert!(matches!(s.image(), ImageState::Failed { message } if message == "404"));
}

#[test]
fn body_preview_escapes_and_breaks_lines() {
    let s = session("", "a < b\nc & \"d\"\r\ne");
    assert_eq!(
        s.body_preview_html(),
        "a &lt; b<br>c &amp; &quot;d&quot;<br>e"
    );
}

#[test]
fn layout_wraps_inside_margins() {
    // 200 wide canvas, 50px margins: 100px column. Size 50 fixed advance: 30px per char.
    let s = session("a bb", "");
    let lines = s.layout(&mut FixedAdvanceShaper::default());
    let words: Vec<String> = lines.iter().map(|l| l.text()).collect();
    assert_eq!(words, vec!["A", "BB"]);
}

#[test]
fn render_before_load_is_black_with_caption() {
    let s = session("x", "");
    let frame = s
        .render(&mut Compositor::default(), &mut FixedAdvanceShaper::default())
        .unwrap();
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 255]));
    assert!(frame.data.chunks_exact(4).any(|px| px == [255, 255, 255, 255]));
}

#[test]
fn oversized_image_is_refused_before_ready() {
    let mut s = session("", "");
    let t = s.begin_load();
    let wide = PreparedImage::solid(70_000, 1, [0, 0, 0, 255]).unwrap();
    assert!(matches!(
        s.finish_load(t, wide),
        Err(CaptionError::ImageLoad(_))
    ));
    assert!(s.viewport().is_none());
}
