use super::*;

fn font() -> FigFont {
    let mut src = String::from("flf2a$ 3 2 8 0 0\n");
    for code in 32u32..=126 {
        let c = char::from_u32(code).unwrap();
        if c == ' ' {
            src.push_str("$$@\n$$@\n$$@@\n");
        } else {
            src.push_str(&format!("{c}{c}@\n{c}#@\n##@@\n"));
        }
    }
    FigFont::parse(&src).unwrap()
}

fn layout(width: usize, align: Alignment, border: Border) -> Layout {
    Layout {
        width,
        align,
        border,
    }
}

#[test]
fn wraps_on_rendered_width() {
    let f = font();
    assert_eq!(wrap_words(&f, "AB CD EF", 10), vec!["AB CD", "EF"]);
    assert_eq!(wrap_words(&f, "AB CD EF", 0), vec!["AB CD EF"]);
    assert_eq!(wrap_words(&f, "ABCDEFG", 4), vec!["ABCDEFG"]);
    assert!(wrap_words(&f, "", 4).is_empty());
}

#[test]
fn space_runs_survive_wrapping_except_at_breaks() {
    let f = font();
    assert_eq!(wrap_words(&f, "AB  CD", 0), vec!["AB  CD"]);
    assert_eq!(wrap_words(&f, "AB  CD", 4), vec!["AB", "CD"]);
    assert_eq!(wrap_words(&f, " ", 4), vec![" "]);
    assert_eq!(wrap_words(&f, "  A", 0), vec!["  A"]);
}

#[test]
fn hardblank_columns_are_not_trimmed() {
    let lines = arrange(&font(), "A ", layout(0, Alignment::Left, Border::None)).unwrap();
    assert_eq!(lines, vec!["AA  ", "A#  ", "##  "]);
}

#[test]
fn wrapped_groups_stack_vertically() {
    let lines = arrange(&font(), "AB CD", layout(6, Alignment::Left, Border::None)).unwrap();
    assert_eq!(lines, vec!["AABB", "A#B#", "####", "CCDD", "C#D#", "####"]);
}

#[test]
fn narrower_blocks_are_aligned_as_a_unit() {
    let f = font();
    let centered = arrange(&f, "ABC D", layout(7, Alignment::Center, Border::None)).unwrap();
    assert_eq!(&centered[3..], &["  DD", "  D#", "  ##"]);

    let right = arrange(&f, "ABC D", layout(7, Alignment::Right, Border::None)).unwrap();
    assert_eq!(&right[3..], &["    DD", "    D#", "    ##"]);

    let left = arrange(&f, "ABC D", layout(7, Alignment::Left, Border::None)).unwrap();
    assert_eq!(&left[3..], &["DD", "D#", "##"]);
}

#[test]
fn over_wide_words_are_truncated() {
    let lines = arrange(&font(), "ABCDEF", layout(5, Alignment::Left, Border::None)).unwrap();
    assert_eq!(lines, vec!["AABBC", "A#B#C", "#####"]);
}

#[test]
fn single_border_wraps_the_block() {
    let lines = arrange(&font(), "A", layout(0, Alignment::Left, Border::Single)).unwrap();
    assert_eq!(
        lines,
        vec!["┌────┐", "│ AA │", "│ A# │", "│ ## │", "└────┘"]
    );
}

#[test]
fn bordered_width_includes_the_frame() {
    let lines = arrange(&font(), "AB CD", layout(8, Alignment::Left, Border::Ascii)).unwrap();
    assert_eq!(lines.first().unwrap(), "+------+");
    assert_eq!(lines[1], "| AABB |");
    assert!(lines.iter().all(|l| l.chars().count() == 8));
}

#[test]
fn bordered_rows_are_padded_to_block_width() {
    let lines = arrange(&font(), "ABC\nD", layout(0, Alignment::Left, Border::Double)).unwrap();
    assert_eq!(lines[4], "║ DD     ║");
    assert!(lines.iter().all(|l| l.chars().count() == 10));
}

#[test]
fn text_without_glyphs_is_unsupported() {
    assert_eq!(
        arrange(&font(), "ééé", layout(0, Alignment::Left, Border::None)),
        Err(FontError::UnsupportedGlyphs)
    );
}
