use super::*;

#[test]
fn empty_object_is_the_default_config() {
    let cfg = EditorConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, EditorConfig::default());
    assert_eq!(cfg.canvas, Canvas::new(1080, 1080).unwrap());
    assert_eq!(cfg.metrics.margin_x, 50.0);
    assert_eq!(cfg.metrics.baseline_inset, 90.0);
}

#[test]
fn partial_config_overrides_fields() {
    let json = r##"{
        "canvas": {"width": 800, "height": 600},
        "metrics": {"margin_x": 20.0},
        "default_style": {"font_size": 40, "gradient_color": "#112233"},
        "font_files": [{"path": "fonts/Bold.ttf", "weight": "bold"}]
    }"##;
    let cfg = EditorConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.canvas.width, 800);
    assert_eq!(cfg.metrics.margin_x, 20.0);
    assert_eq!(cfg.metrics.baseline_inset, 90.0);
    assert_eq!(cfg.default_style.font_size, 40);
    assert_eq!(cfg.default_style.line_height, 60);
    assert_eq!(cfg.font_files[0].weight, FontWeight::Bold);
    assert_eq!(cfg.font_files[0].slant, FontSlant::Normal);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = EditorConfig::from_reader(r#"{"canvass": {}}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, CaptionError::Validation(_)));
}

#[test]
fn invalid_values_fail_validation() {
    let err =
        EditorConfig::from_reader(r#"{"canvas": {"width": 0, "height": 10}}"#.as_bytes())
            .unwrap_err();
    assert!(err.to_string().contains("canvas"));

    let err = EditorConfig::from_reader(
        r#"{"default_style": {"gradient_opacity": 2.0}}"#.as_bytes(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("gradient_opacity"));
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = EditorConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.json"));
}

#[test]
fn shaper_falls_back_without_fonts() {
    let cfg = EditorConfig {
        font_dirs: vec![PathBuf::from("/definitely/not/a/font/dir")],
        ..EditorConfig::default()
    };
    let mut shaper = cfg.build_shaper().unwrap();
    let font = cfg.default_style.base_font();
    // Fixed advance: 0.6em per char.
    if std::env::var_os(FONT_DIR_ENV).is_none() {
        assert_eq!(shaper.measure("AB", &font).unwrap(), 60.0);
    }
}
