use super::*;

fn words(tokens: &[CaptionToken]) -> Vec<&str> {
    tokens
        .iter()
        .filter_map(|t| match t {
            CaptionToken::Word(w) => Some(w.text.as_str()),
            CaptionToken::Break => None,
        })
        .collect()
}

fn plain_style() -> CaptionStyle {
    CaptionStyle {
        weight: FontWeight::Normal,
        ..CaptionStyle::default()
    }
}

#[test]
fn words_are_uppercased_and_whitespace_collapsed() {
    let tokens = extract_tokens("  breaking \n news\ttonight  ", &plain_style());
    assert_eq!(words(&tokens), vec!["BREAKING", "NEWS", "TONIGHT"]);
}

#[test]
fn whitespace_only_input_yields_nothing() {
    assert!(extract_tokens("   \n ", &plain_style()).is_empty());
    assert!(extract_tokens("", &plain_style()).is_empty());
}

#[test]
fn defaults_come_from_caption_style() {
    let style = CaptionStyle {
        weight: FontWeight::Normal,
        slant: FontSlant::Italic,
        text_color: Rgba8::opaque(1, 2, 3),
        ..CaptionStyle::default()
    };
    let tokens = extract_tokens("hi", &style);
    assert_eq!(
        tokens,
        vec![CaptionToken::Word(StyledWord {
            text: "HI".into(),
            weight: FontWeight::Normal,
            slant: FontSlant::Italic,
            color: Rgba8::opaque(1, 2, 3),
        })]
    );
}

#[test]
fn nested_formatting_resolves_per_word() {
    let tokens = extract_tokens(
        r##"plain <b>bold <font color="#00ff00"><i>green</i></font></b>"##,
        &plain_style(),
    );
    let CaptionToken::Word(plain) = &tokens[0] else {
        panic!("expected word");
    };
    assert_eq!(plain.weight, FontWeight::Normal);
    assert_eq!(plain.color, Rgba8::WHITE);

    let CaptionToken::Word(bold) = &tokens[1] else {
        panic!("expected word");
    };
    assert_eq!(bold.weight, FontWeight::Bold);
    assert_eq!(bold.slant, FontSlant::Normal);

    let CaptionToken::Word(green) = &tokens[2] else {
        panic!("expected word");
    };
    assert_eq!(green.text, "GREEN");
    assert_eq!(green.weight, FontWeight::Bold);
    assert_eq!(green.slant, FontSlant::Italic);
    assert_eq!(green.color, Rgba8::opaque(0, 255, 0));
}

#[test]
fn innermost_color_wins() {
    let tokens = extract_tokens(
        r#"<font color="red">a <font color="blue">b</font> c</font>"#,
        &plain_style(),
    );
    let colors: Vec<Rgba8> = tokens
        .iter()
        .filter_map(|t| match t {
            CaptionToken::Word(w) => Some(w.color),
            CaptionToken::Break => None,
        })
        .collect();
    assert_eq!(
        colors,
        vec![
            Rgba8::opaque(255, 0, 0),
            Rgba8::opaque(0, 0, 255),
            Rgba8::opaque(255, 0, 0)
        ]
    );
}

#[test]
fn breaks_are_preserved_in_order() {
    let tokens = extract_tokens("hello<br>world", &plain_style());
    assert_eq!(tokens.len(), 3);
    assert!(matches!(tokens[1], CaptionToken::Break));
}

#[test]
fn words_split_at_element_boundaries() {
    let style = plain_style();
    assert_eq!(words(&extract_tokens("HEL<u>LO</u>", &style)), vec!["HEL", "LO"]);
    assert_eq!(words(&extract_tokens("HEL<b>LO</b>", &style)), vec!["HEL", "LO"]);
}

#[test]
fn ampersands_and_comparisons_keep_every_word() {
    let style = plain_style();
    assert_eq!(
        words(&extract_tokens("Tom & Jerry tonight", &style)),
        vec!["TOM", "&", "JERRY", "TONIGHT"]
    );
    assert_eq!(
        words(&extract_tokens("5 < 6 is true", &style)),
        vec!["5", "<", "6", "IS", "TRUE"]
    );
}
