use super::*;

/// Three-row font: each printable glyph is `cc / c<fill> / <fill><fill>`, space is two
/// hardblanks wide.
fn synthetic_flf(fill: char, extra: &str) -> String {
    let mut out = String::from("flf2a$ 3 2 8 0 2\ncomment one\ncomment two\n");
    for code in 32u32..=126 {
        let c = char::from_u32(code).unwrap();
        if c == ' ' {
            out.push_str("$$@\n$$@\n$$@@\n");
        } else {
            out.push_str(&format!("{c}{c}@\n{c}{fill}@\n{fill}{fill}@@\n"));
        }
    }
    out.push_str(extra);
    out
}

#[test]
fn parses_required_ascii_glyphs() {
    let font = FigFont::parse(&synthetic_flf('#', "")).unwrap();
    assert_eq!(font.height(), 3);
    assert!(font.has_glyph('A'));
    assert!(font.has_glyph('~'));
    assert!(!font.has_glyph('é'));
}

#[test]
fn renders_glyphs_side_by_side() {
    let font = FigFont::parse(&synthetic_flf('#', "")).unwrap();
    let rows = font.render_line("AB").unwrap();
    assert_eq!(rows, vec!["AABB", "A#B#", "####"]);
    assert_eq!(font.measure("AB"), 4);
}

#[test]
fn hardblank_renders_as_space() {
    let font = FigFont::parse(&synthetic_flf('#', "")).unwrap();
    let rows = font.render_line("A B").unwrap();
    assert_eq!(rows[0], "AA  BB");
}

#[test]
fn unknown_characters_are_skipped() {
    let font = FigFont::parse(&synthetic_flf('#', "")).unwrap();
    assert_eq!(font.render_line("AéB"), font.render_line("AB"));
    assert!(font.render_line("ééé").is_none());
}

#[test]
fn glyph_rows_are_padded_to_equal_width() {
    let mut src = synthetic_flf('#', "");
    src = src.replacen("!!@\n!#@\n##@@", "!!!@\n!@\n@@", 1);
    let font = FigFont::parse(&src).unwrap();
    assert_eq!(font.render_line("!").unwrap(), vec!["!!!", "!  ", "   "]);
}

#[test]
fn deutsch_and_code_tagged_glyphs_are_loaded() {
    let mut extra = String::new();
    for _ in DEUTSCH_CODES {
        extra.push_str("DD@\nDD@\nDD@@\n");
    }
    extra.push_str("0x263A  SMILE\n:)@\n:)@\n:)@@\n");
    let font = FigFont::parse(&synthetic_flf('#', &extra)).unwrap();
    assert!(font.has_glyph('Ä'));
    assert!(font.has_glyph('ß'));
    assert_eq!(font.render_line("☺").unwrap(), vec![":)", ":)", ":)"]);
}

#[test]
fn code_tags_without_deutsch_block_are_loaded() {
    let font = FigFont::parse(&synthetic_flf('#', "169 COPYRIGHT\n(c)@\n(c)@\n(c)@@\n")).unwrap();
    assert!(font.has_glyph('©'));
    assert!(!font.has_glyph('Ä'));
}

#[test]
fn code_tag_forms() {
    assert_eq!(parse_code_tag("65 LATIN A"), Some(Some(65)));
    assert_eq!(parse_code_tag("0x41"), Some(Some(65)));
    assert_eq!(parse_code_tag("0101"), Some(Some(65)));
    assert_eq!(parse_code_tag("-2 private"), Some(None));
    assert_eq!(parse_code_tag("__@"), None);
}

#[test]
fn endmarks_are_stripped() {
    assert_eq!(strip_endmark(" _ @"), " _ ");
    assert_eq!(strip_endmark("|_|@@"), "|_|");
    assert_eq!(strip_endmark("abc#  "), "abc");
    assert_eq!(strip_endmark(""), "");
}

#[test]
fn rejects_bad_headers() {
    assert_eq!(FigFont::parse("").unwrap_err(), FontError::Empty);
    assert_eq!(
        FigFont::parse("tlf2a$ 3 2 8 0 0").unwrap_err(),
        FontError::BadSignature
    );
    assert!(matches!(
        FigFont::parse("flf2a$ x 2 8 0 0"),
        Err(FontError::BadHeader(_))
    ));
    assert!(matches!(
        FigFont::parse("flf2a$ 3 2 8 0"),
        Err(FontError::BadHeader(_))
    ));
}

#[test]
fn truncated_glyph_table_is_an_error() {
    assert_eq!(
        FigFont::parse("flf2a$ 2 1 4 0 3\nonly one comment\n").unwrap_err(),
        FontError::Truncated { code: 32 }
    );
    assert_eq!(
        FigFont::parse("flf2a$ 2 1 4 0 0\n$@\n$@@\n").unwrap_err(),
        FontError::Truncated { code: 33 }
    );

    let mut src = synthetic_flf('#', "");
    let cut = src.find("AA@").unwrap();
    src.truncate(cut);
    assert_eq!(
        FigFont::parse(&src).unwrap_err(),
        FontError::Truncated { code: 65 }
    );
}

#[test]
fn implausible_height_is_a_header_error() {
    for src in [
        "flf2a$ 4611686018427387904 2 8 0 0\n",
        "flf2a$ 2 1 4 0 0\n",
        "flf2a$ 4 1 4 0 1\ncomment\na@\nb@\nc@@\n",
    ] {
        assert!(
            matches!(FigFont::parse(src), Err(FontError::BadHeader(_))),
            "{src:?}"
        );
    }
}
