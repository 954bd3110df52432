use super::*;

#[test]
fn parses_hex_forms() {
    assert_eq!(parse_color("#ff0000").unwrap(), Rgba8::opaque(255, 0, 0));
    assert_eq!(parse_color("#FFF").unwrap(), Rgba8::WHITE);
    let c = parse_color("#0000ff80").unwrap();
    assert_eq!((c.b, c.a), (255, 128));
    assert!(parse_color("#12345").is_err());
    assert!(parse_color("#gg0000").is_err());
}

#[test]
fn parses_rgb_functions_from_inline_styles() {
    assert_eq!(
        parse_color("rgb(255, 204, 0)").unwrap(),
        Rgba8::opaque(255, 204, 0)
    );
    let c = parse_color("rgba(10, 20, 30, 0.5)").unwrap();
    assert_eq!((c.r, c.g, c.b, c.a), (10, 20, 30, 128));
    assert!(parse_color("rgb(1, 2)").is_err());
}

#[test]
fn parses_named_colors_case_insensitively() {
    assert_eq!(parse_color(" Yellow ").unwrap(), Rgba8::opaque(255, 255, 0));
    assert!(parse_color("chartreuse-ish").is_err());
}
