use super::*;

#[test]
fn defaults_match_editor_controls() {
    let s = CaptionStyle::default();
    assert_eq!(s.font_size, 50);
    assert_eq!(s.line_height, 60);
    assert_eq!(s.weight, FontWeight::Bold);
    assert_eq!(s.align, TextAlign::Center);
    assert_eq!(s.text_color, Rgba8::WHITE);
    assert_eq!(s.gradient_color, Rgba8::BLACK);
    assert!((s.gradient_opacity - 0.7).abs() < f32::EPSILON);
    s.validate().unwrap();
}

#[test]
fn validate_rejects_out_of_range_opacity() {
    let s = CaptionStyle {
        gradient_opacity: 1.5,
        ..CaptionStyle::default()
    };
    assert!(matches!(s.validate(), Err(CaptionError::Validation(_))));
}

#[test]
fn style_deserializes_from_partial_json() {
    let s: CaptionStyle =
        serde_json::from_str(r##"{"align":"left","text_color":"#ff0000","slant":"italic"}"##)
            .unwrap();
    assert_eq!(s.align, TextAlign::Left);
    assert_eq!(s.slant, FontSlant::Italic);
    assert_eq!(s.text_color, Rgba8::opaque(255, 0, 0));
    assert_eq!(s.font_size, 50);
}

#[test]
fn font_css_shorthand() {
    let f = FontSpec {
        size_px: 50.0,
        weight: FontWeight::Bold,
        slant: FontSlant::Italic,
    };
    assert_eq!(f.css(), "italic 700 50px");
}
