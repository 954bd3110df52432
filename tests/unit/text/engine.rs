use super::*;

fn font(size: f32) -> FontSpec {
    FontSpec {
        size_px: size,
        weight: FontWeight::Bold,
        slant: FontSlant::Normal,
    }
}

fn system_font() -> Option<std::path::PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/Library/Fonts/Arial.ttf",
    ]
    .iter()
    .map(std::path::PathBuf::from)
    .find(|p| p.is_file())
}

#[test]
fn fixed_advance_counts_chars() {
    let mut s = FixedAdvanceShaper::default();
    let w = s.measure("ABC ", &font(10.0)).unwrap();
    assert!((w - 24.0).abs() < 1e-9);
}

#[test]
fn fixed_advance_rejects_bad_size() {
    let mut s = FixedAdvanceShaper::default();
    assert!(matches!(
        s.measure("A", &font(0.0)),
        Err(CaptionError::Measurement(_))
    ));
}

#[test]
fn fixed_advance_paints_boxes_above_origin() {
    let mut s = FixedAdvanceShaper::default();
    let mut ctx = vello_cpu::RenderContext::new(40, 40);
    s.fill_text(
        &mut ctx,
        "A",
        &font(20.0),
        Rgba8::WHITE,
        Point::new(10.0, 30.0),
    )
    .unwrap();
    let mut pixmap = vello_cpu::Pixmap::new(40, 40);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    let data = pixmap.data_as_u8_slice();

    // Box spans x 10.6..21.4, y 14..28.
    let inside = ((20 * 40 + 15) * 4) as usize;
    assert_eq!(data[inside + 3], 255);
    let below = ((35 * 40 + 15) * 4) as usize;
    assert_eq!(data[below + 3], 0);
}

#[test]
fn parley_without_faces_is_a_measurement_error() {
    let mut engine = ParleyTextEngine::new();
    assert!(matches!(
        engine.measure("A ", &font(50.0)),
        Err(CaptionError::Measurement(_))
    ));
}

#[test]
fn face_names_guess_weight_and_slant() {
    assert_eq!(
        face_from_file_name(Path::new("Roboto-BoldItalic.ttf")),
        (FontWeight::Bold, FontSlant::Italic)
    );
    assert_eq!(
        face_from_file_name(Path::new("DejaVuSans.ttf")),
        (FontWeight::Normal, FontSlant::Normal)
    );
}

#[test]
fn parley_measures_trailing_space_and_scales_with_size() {
    let Some(path) = system_font() else {
        return;
    };
    let mut engine = ParleyTextEngine::new();
    engine
        .register_file(&path, FontWeight::Normal, FontSlant::Normal)
        .unwrap();

    let word = engine.measure("NEWS", &font(50.0)).unwrap();
    let spaced = engine.measure("NEWS ", &font(50.0)).unwrap();
    let small = engine.measure("NEWS ", &font(25.0)).unwrap();
    assert!(word > 0.0);
    assert!(spaced > word);
    assert!((spaced / small - 2.0).abs() < 0.05);
}

#[test]
fn parley_fill_text_touches_pixels() {
    let Some(path) = system_font() else {
        return;
    };
    let mut engine = ParleyTextEngine::new();
    engine
        .register_file(&path, FontWeight::Normal, FontSlant::Normal)
        .unwrap();

    let mut ctx = vello_cpu::RenderContext::new(200, 80);
    engine
        .fill_text(
            &mut ctx,
            "HI",
            &font(40.0),
            Rgba8::WHITE,
            Point::new(10.0, 70.0),
        )
        .unwrap();
    let mut pixmap = vello_cpu::Pixmap::new(200, 80);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    let painted = pixmap
        .data_as_u8_slice()
        .chunks_exact(4)
        .filter(|px| px[3] != 0)
        .count();
    assert!(painted > 50);
}
