//! FIGlet 2 (`flf2a`) font parsing and full-width glyph layout.
//!
//! Only what rendering needs is kept: the hardblank, the glyph height and the glyph rows.
//! Layout is full width (glyphs are placed side by side without smushing), which keeps output
//! deterministic across fonts regardless of their layout flags.

use std::collections::HashMap;
use std::path::Path;

const SIGNATURE: &str = "flf2a";
const DEUTSCH_CODES: [u32; 7] = [196, 214, 220, 228, 246, 252, 223];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    #[error("font file is empty")]
    Empty,

    #[error("missing flf2a signature")]
    BadSignature,

    #[error("malformed header: {0}")]
    BadHeader(String),

    #[error("font ends before glyph {code}")]
    Truncated { code: u32 },

    #[error("no renderable glyphs for input")]
    UnsupportedGlyphs,

    #[error("font file does not exist: {path}")]
    Missing { path: String },

    #[error("font path is not a regular file: {path}")]
    NotAFile { path: String },

    #[error("cannot read font '{path}': {message}")]
    Read { path: String, message: String },
}

/// One glyph: `height` rows of equal display width.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Glyph {
    rows: Vec<String>,
    width: usize,
}

/// A parsed FIGlet font.
#[derive(Clone, Debug)]
pub struct FigFont {
    hardblank: char,
    height: usize,
    glyphs: HashMap<u32, Glyph>,
}

impl FigFont {
    pub fn from_path(path: &Path) -> Result<Self, FontError> {
        let bytes = std::fs::read(path).map_err(|e| FontError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        // Many published fonts are Latin-1; lossy decoding keeps the ASCII art intact.
        Self::parse(&String::from_utf8_lossy(&bytes))
    }

    pub fn parse(source: &str) -> Result<Self, FontError> {
        let mut lines = source.lines().map(|l| l.strip_suffix('\r').unwrap_or(l));
        let header = lines.next().ok_or(FontError::Empty)?;
        let (hardblank, height, comment_lines) = parse_header(header)?;

        for _ in 0..comment_lines {
            if lines.next().is_none() {
                return Err(FontError::Truncated { code: 32 });
            }
        }
        let glyph_lines = source
            .lines()
            .count()
            .saturating_sub(comment_lines.saturating_add(1));
        if height > glyph_lines {
            return Err(FontError::BadHeader(format!(
                "height {height} exceeds the {glyph_lines} glyph lines in the file"
            )));
        }

        let mut glyphs = HashMap::new();
        for code in 32u32..=126 {
            let glyph = read_glyph(&mut lines, height).ok_or(FontError::Truncated { code })?;
            glyphs.insert(code, glyph);
        }

        let mut rest = lines.peekable();
        for code in DEUTSCH_CODES {
            match rest.peek() {
                Some(line) if parse_code_tag(line).is_none() => {}
                _ => break,
            }
            match read_glyph(&mut rest, height) {
                Some(glyph) => {
                    glyphs.insert(code, glyph);
                }
                None => break,
            }
        }

        while let Some(tag_line) = rest.next() {
            let Some(code) = parse_code_tag(tag_line) else {
                continue;
            };
            let Some(glyph) = read_glyph(&mut rest, height) else {
                break;
            };
            if let Some(code) = code {
                glyphs.insert(code, glyph);
            }
        }

        Ok(Self {
            hardblank,
            height,
            glyphs,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn has_glyph(&self, c: char) -> bool {
        self.glyphs.contains_key(&(c as u32))
    }

    /// Display width of `text` laid out on one row of glyphs.
    pub fn measure(&self, text: &str) -> usize {
        text.chars()
            .filter_map(|c| self.glyphs.get(&(c as u32)))
            .map(|g| g.width)
            .sum()
    }

    /// Lay out a single line of text. Characters without a glyph are skipped.
    ///
    /// Returns `None` when no character of `text` has a glyph.
    pub fn render_line(&self, text: &str) -> Option<Vec<String>> {
        let glyphs: Vec<&Glyph> = text
            .chars()
            .filter_map(|c| self.glyphs.get(&(c as u32)))
            .collect();
        if glyphs.is_empty() {
            return None;
        }

        let rows = (0..self.height)
            .map(|row| {
                glyphs
                    .iter()
                    .flat_map(|g| g.rows[row].chars())
                    .map(|c| if c == self.hardblank { ' ' } else { c })
                    .collect::<String>()
            })
            .collect();
        Some(rows)
    }
}

fn parse_header(header: &str) -> Result<(char, usize, usize), FontError> {
    let rest = header.strip_prefix(SIGNATURE).ok_or(FontError::BadSignature)?;
    let mut chars = rest.chars();
    let hardblank = chars
        .next()
        .ok_or_else(|| FontError::BadHeader("missing hardblank".to_string()))?;

    let fields: Vec<&str> = chars.as_str().split_whitespace().collect();
    let field = |idx: usize, name: &str| -> Result<i64, FontError> {
        fields
            .get(idx)
            .ok_or_else(|| FontError::BadHeader(format!("missing {name}")))?
            .parse::<i64>()
            .map_err(|_| FontError::BadHeader(format!("{name} is not a number")))
    };

    let height = field(0, "height")?;
    if height < 1 {
        return Err(FontError::BadHeader("height must be >= 1".to_string()));
    }
    let comment_lines = field(4, "comment line count")?.max(0);
    Ok((hardblank, height as usize, comment_lines as usize))
}

/// Parse a code-tag line. `Some(None)` is a well-formed tag whose code cannot map to a char.
fn parse_code_tag(line: &str) -> Option<Option<u32>> {
    let token = line.split_whitespace().next()?;
    let (negative, digits) = match token.strip_prefix('-') {
        Some(d) => (true, d),
        None => (false, token),
    };
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        u32::from_str_radix(&digits[1..], 8).ok()?
    } else {
        digits.parse::<u32>().ok()?
    };
    if negative || char::from_u32(value).is_none() {
        return Some(None);
    }
    Some(Some(value))
}

fn read_glyph<'a>(lines: &mut impl Iterator<Item = &'a str>, height: usize) -> Option<Glyph> {
    let mut rows = Vec::new();
    for _ in 0..height {
        rows.push(strip_endmark(lines.next()?));
    }
    let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    for row in &mut rows {
        let pad = width - row.chars().count();
        row.extend(std::iter::repeat_n(' ', pad));
    }
    Some(Glyph { rows, width })
}

fn strip_endmark(line: &str) -> String {
    let line = line.trim_end_matches([' ', '\t']);
    match line.chars().last() {
        Some(mark) => line.trim_end_matches(mark).to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/figfont.rs"]
mod tests;
