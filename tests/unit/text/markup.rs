use super::*;

fn text(s: &str) -> MarkupNode {
    MarkupNode::Text(s.to_owned())
}

#[test]
fn plain_text_is_a_single_node() {
    assert_eq!(parse_markup("breaking news"), vec![text("breaking news")]);
}

#[test]
fn empty_input_is_empty_tree() {
    assert!(parse_markup("").is_empty());
}

#[test]
fn formatting_elements_nest() {
    let nodes = parse_markup("a <b>bold <i>both</i></b> <strong>s</strong><em>e</em>");
    assert_eq!(
        nodes,
        vec![
            text("a "),
            MarkupNode::Bold(vec![text("bold "), MarkupNode::Italic(vec![text("both")])]),
            text(" "),
            MarkupNode::Bold(vec![text("s")]),
            MarkupNode::Italic(vec![text("e")]),
        ]
    );
}

#[test]
fn html_br_without_close_is_a_break() {
    assert_eq!(
        parse_markup("HELLO<br>WORLD"),
        vec![text("HELLO"), MarkupNode::Break, text("WORLD")]
    );
    assert_eq!(
        parse_markup("HELLO<br/>WORLD"),
        vec![text("HELLO"), MarkupNode::Break, text("WORLD")]
    );
}

#[test]
fn blocks_break_before_and_after() {
    assert_eq!(
        parse_markup("one<div>two</div>three"),
        vec![
            text("one"),
            MarkupNode::Break,
            text("two"),
            MarkupNode::Break,
            text("three"),
        ]
    );
}

#[test]
fn font_color_and_span_style_become_color_spans() {
    let nodes = parse_markup(
        r##"<font color="#ff0000">red</font><span style="font-size: 3px; color: rgb(0, 0, 255)">blue</span>"##,
    );
    assert_eq!(
        nodes,
        vec![
            MarkupNode::ColorSpan {
                color: Rgba8::opaque(255, 0, 0),
                children: vec![text("red")],
            },
            MarkupNode::ColorSpan {
                color: Rgba8::opaque(0, 0, 255),
                children: vec![text("blue")],
            },
        ]
    );
}

#[test]
fn unquoted_color_attribute_is_accepted() {
    let nodes = parse_markup("<font color=yellow>x</font>");
    assert_eq!(
        nodes,
        vec![MarkupNode::ColorSpan {
            color: Rgba8::opaque(255, 255, 0),
            children: vec![text("x")],
        }]
    );
}

#[test]
fn unknown_elements_and_bad_colors_are_transparent() {
    assert_eq!(
        parse_markup(r#"<u>under</u> <font color="nope">x</font>"#),
        vec![text("under"), text(" "), text("x")]
    );
}

#[test]
fn element_boundaries_split_text_nodes() {
    assert_eq!(parse_markup("HEL<u>LO</u>"), vec![text("HEL"), text("LO")]);
    assert_eq!(
        parse_markup("HEL<b>LO</b>"),
        vec![text("HEL"), MarkupNode::Bold(vec![text("LO")])]
    );
    assert_eq!(
        parse_markup("a<img src=x>b<wbr/>c"),
        vec![text("a"), text("b"), text("c")]
    );
}

#[test]
fn entities_are_decoded_and_merged_into_text() {
    assert_eq!(
        parse_markup("R&amp;D &lt;3 &#39;q&#x41;&apos;"),
        vec![text("R&D <3 'qA'")]
    );
    assert_eq!(parse_markup("a&nbsp;b"), vec![text("a\u{a0}b")]);
}

#[test]
fn unknown_entity_stays_literal() {
    assert_eq!(parse_markup("x &bogus; y"), vec![text("x &bogus; y")]);
}

#[test]
fn unclosed_tags_close_at_end_and_stray_ends_are_ignored() {
    assert_eq!(
        parse_markup("<b>open</i> still"),
        vec![MarkupNode::Bold(vec![text("open still")])]
    );
}

#[test]
fn mismatched_close_unwinds_inner_frames() {
    assert_eq!(
        parse_markup("<b>x<i>y</b>z"),
        vec![
            MarkupNode::Bold(vec![text("x"), MarkupNode::Italic(vec![text("y")])]),
            text("z"),
        ]
    );
}

#[test]
fn tag_names_are_case_insensitive() {
    assert_eq!(
        parse_markup("<B>x</B><BR>"),
        vec![MarkupNode::Bold(vec![text("x")]), MarkupNode::Break]
    );
}

#[test]
fn bare_ampersand_is_literal_text() {
    assert_eq!(
        parse_markup("Tom & Jerry tonight"),
        vec![text("Tom & Jerry tonight")]
    );
    assert_eq!(
        parse_markup("AT&T <b>R&D</b>"),
        vec![text("AT&T "), MarkupNode::Bold(vec![text("R&D")])]
    );
    assert_eq!(parse_markup("trailing &"), vec![text("trailing &")]);
}

#[test]
fn stray_less_than_is_literal_text() {
    assert_eq!(parse_markup("5 < 6 is true"), vec![text("5 < 6 is true")]);
    assert_eq!(
        parse_markup("5 < 6 and 7 > 3"),
        vec![text("5 < 6 and 7 > 3")]
    );
    assert_eq!(parse_markup("x <3"), vec![text("x <3")]);
}

#[test]
fn tag_never_closed_by_angle_bracket_is_text() {
    assert_eq!(
        parse_markup("<b>bold</b> then a<b"),
        vec![MarkupNode::Bold(vec![text("bold")]), text(" then a<b")]
    );
}

#[test]
fn latin1_entities_are_decoded() {
    assert_eq!(
        parse_markup("perch&eacute; &Egrave; citt&agrave; &AElig;"),
        vec![text("perché È città Æ")]
    );
    assert_eq!(
        parse_markup("&laquo;s&igrave;&raquo; &ndash; stra&szlig;e"),
        vec![text("«sì» – straße")]
    );
    assert_eq!(parse_markup("&EACUTE;"), vec![text("&EACUTE;")]);
}

#[test]
fn loose_text_escaping_leaves_real_markup_alone() {
    assert!(matches!(
        escape_loose_text("<b>a</b> &amp; &#39; &#x41;"),
        Cow::Borrowed(_)
    ));
    assert_eq!(escape_loose_text("a & b < c"), "a &amp; b &lt; c");
    assert_eq!(escape_loose_text("&#;&#x;"), "&amp;#;&amp;#x;");
}

#[test]
fn entity_decoding_for_unparsed_remainder() {
    assert_eq!(decode_entities("R&amp;D &eacute; & &bogus;"), "R&D é & &bogus;");
}
