use crate::fonts::figfont::{FigFont, FontError};
use crate::foundation::options::{Alignment, Border};

/// Columns a border adds on each side (`│ ` and ` │`).
const BORDER_PAD: usize = 2;

/// Layout parameters applied after glyph rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Maximum total width including any border; `0` is unlimited.
    pub width: usize,
    pub align: Alignment,
    pub border: Border,
}

impl Layout {
    fn content_width(self) -> usize {
        match (self.width, self.border) {
            (0, _) => 0,
            (w, Border::None) => w,
            (w, _) => w.saturating_sub(BORDER_PAD * 2).max(1),
        }
    }
}

/// Greedy word wrap measured in rendered columns.
///
/// Runs of spaces inside a group are kept and rendered with the font's space glyph; spaces at
/// a wrap point are dropped. A word wider than `width` on its own still gets its own group;
/// truncation happens later.
pub fn wrap_words(font: &FigFont, line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return Vec::new();
    }
    let mut groups = Vec::new();
    let mut current: Option<String> = None;
    for word in line.split(' ') {
        let Some(cur) = current.as_mut() else {
            if groups.is_empty() || !word.is_empty() {
                current = Some(word.to_string());
            }
            continue;
        };
        let candidate = format!("{cur} {word}");
        if width == 0 || font.measure(&candidate) <= width {
            *cur = candidate;
        } else {
            groups.extend(current.take());
            if !word.is_empty() {
                current = Some(word.to_string());
            }
        }
    }
    groups.extend(current);
    groups
}

/// Render `text` with `font` and arrange the result into output lines.
pub fn arrange(font: &FigFont, text: &str, layout: Layout) -> Result<Vec<String>, FontError> {
    let content_width = layout.content_width();

    let mut blocks: Vec<Vec<String>> = Vec::new();
    for line in text.split('\n') {
        for group in wrap_words(font, line, content_width) {
            if let Some(mut rows) = font.render_line(&group) {
                if content_width > 0 {
                    for row in &mut rows {
                        truncate_cols(row, content_width);
                    }
                }
                blocks.push(rows);
            }
        }
    }
    if blocks.is_empty() {
        return Err(FontError::UnsupportedGlyphs);
    }

    let block_width = blocks
        .iter()
        .flat_map(|b| b.iter())
        .map(|r| r.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::with_capacity(blocks.iter().map(Vec::len).sum());
    for block in &blocks {
        let own = block.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let slack = block_width - own;
        let left = match layout.align {
            Alignment::Left => 0,
            Alignment::Center => slack / 2,
            Alignment::Right => slack,
        };
        for row in block {
            let mut line = " ".repeat(left);
            line.push_str(row);
            if layout.border != Border::None {
                let pad = block_width - line.chars().count();
                line.extend(std::iter::repeat_n(' ', pad));
            }
            lines.push(line);
        }
    }

    Ok(apply_border(lines, block_width, layout.border))
}

fn truncate_cols(row: &mut String, cols: usize) {
    if let Some((idx, _)) = row.char_indices().nth(cols) {
        row.truncate(idx);
    }
}

struct BorderChars {
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
    horizontal: char,
    vertical: char,
}

fn border_chars(border: Border) -> Option<BorderChars> {
    let (tl, tr, bl, br, h, v) = match border {
        Border::None => return None,
        Border::Single => ('┌', '┐', '└', '┘', '─', '│'),
        Border::Double => ('╔', '╗', '╚', '╝', '═', '║'),
        Border::Ascii => ('+', '+', '+', '+', '-', '|'),
    };
    Some(BorderChars {
        top_left: tl,
        top_right: tr,
        bottom_left: bl,
        bottom_right: br,
        horizontal: h,
        vertical: v,
    })
}

fn apply_border(lines: Vec<String>, inner_width: usize, border: Border) -> Vec<String> {
    let Some(b) = border_chars(border) else {
        return lines;
    };
    let rule: String = std::iter::repeat_n(b.horizontal, inner_width + 2).collect();

    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!("{}{rule}{}", b.top_left, b.top_right));
    for line in lines {
        out.push(format!("{v} {line} {v}", v = b.vertical));
    }
    out.push(format!("{}{rule}{}", b.bottom_left, b.bottom_right));
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
