mod common;

use shout::{Alignment, Border, FontCache, RenderOptions, ShoutError, render, render_lines};

fn opts(font: &str) -> RenderOptions {
    RenderOptions {
        font: font.to_string(),
        ..RenderOptions::default()
    }
}

#[test]
fn renders_glyphs_side_by_side() {
    let cache = common::loaded_cache("render_basic");
    let art = render("AB", &opts("standard"), Some(&cache)).unwrap();
    assert_eq!(art, "AABB\nA#B#\n####");

    let art = render("A", &opts("doom"), Some(&cache)).unwrap();
    assert_eq!(art, "AA\nA%\n%%");
}

#[test]
fn empty_text_renders_nothing() {
    let cache = common::loaded_cache("render_empty");
    assert_eq!(render("", &opts("standard"), Some(&cache)).unwrap(), "");
}

#[test]
fn spaces_render_with_the_space_glyph() {
    let cache = common::loaded_cache("render_spaces");
    assert_eq!(
        render(" ", &opts("standard"), Some(&cache)).unwrap(),
        "  \n  \n  "
    );

    let double = render("A  B", &opts("standard"), Some(&cache)).unwrap();
    assert_eq!(double, "AA    BB\nA#    B#\n##    ##");
    assert_ne!(double, render("A B", &opts("standard"), Some(&cache)).unwrap());
}

#[test]
fn unknown_font_matches_default_output() {
    let cache = common::loaded_cache("render_unknown");
    let fallback = render("HI", &opts("comic-sans"), Some(&cache)).unwrap();
    let default = render("HI", &opts("standard"), Some(&cache)).unwrap();
    assert_eq!(fallback, default);

    let unnamed = render("HI", &opts(""), Some(&cache)).unwrap();
    assert_eq!(unnamed, default);
}

#[test]
fn missing_cache_is_an_error() {
    let err = render("HI", &opts("standard"), None).unwrap_err();
    assert!(matches!(err, ShoutError::NoCache));
}

#[test]
fn empty_cache_reports_no_fonts() {
    let cache = FontCache::new();
    let err = render("HI", &opts("standard"), Some(&cache)).unwrap_err();
    assert!(matches!(err, ShoutError::NoFontsLoaded));
}

#[test]
fn text_without_glyphs_is_a_render_error() {
    let cache = common::loaded_cache("render_unsupported");
    let err = render("\u{2603}", &opts("standard"), Some(&cache)).unwrap_err();
    assert!(matches!(err, ShoutError::Render(_)));
    assert!(err.to_string().contains("standard"));
}

#[test]
fn explicit_lines_and_border_frame_the_block() {
    let cache = common::loaded_cache("render_border");
    let o = RenderOptions {
        font: "standard".to_string(),
        align: Alignment::Center,
        border: Border::Ascii,
        ..RenderOptions::default()
    };
    let lines = render_lines("AB\nC", &o, Some(&cache)).unwrap();
    assert_eq!(lines, vec![
        "+------+",
        "| AABB |",
        "| A#B# |",
        "| #### |",
        "|  CC  |",
        "|  C#  |",
        "|  ##  |",
        "+------+",
    ]);
}

#[test]
fn concurrent_renders_agree() {
    let cache = common::loaded_cache("render_concurrent");
    let expected = render("SHOUT", &opts("doom"), Some(&cache)).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| render("SHOUT", &opts("doom"), Some(&cache)).unwrap()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}
