//! Color schemes and frame painting.
//!
//! Each scheme is a pure function of `(frame, line, column)` onto a 256-color ANSI code, so a
//! given frame index always paints identically.

use std::fmt::Write as _;

/// Clear the screen and home the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
/// Move the cursor to the top-left cell without clearing.
pub const CURSOR_HOME: &str = "\x1b[H";
/// Reset all SGR attributes.
pub const RESET: &str = "\x1b[0m";
pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";

const RAINBOW: &[u8] = &[
    196, 202, 208, 214, 220, 226, 190, 154, 118, 82, 46, 47, 48, 49, 50, 51, 45, 39, 33, 27, 21,
    57, 93, 129, 165, 201, 200, 199, 198, 197,
];
const FIRE: &[u8] = &[52, 88, 124, 160, 196, 202, 208, 214, 220, 226, 227, 228];
const OCEAN: &[u8] = &[17, 18, 19, 20, 21, 27, 33, 39, 45, 51, 87, 123];
const MATRIX: &[u8] = &[22, 28, 34, 40, 46, 82, 118, 154];
const NEON: &[u8] = &[201, 165, 129, 93, 57, 51, 50, 49, 48, 47, 46, 226];
const MONO: &[u8] = &[255, 252, 249, 246, 243, 240, 243, 246, 249, 252];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorScheme {
    /// Diagonal bands sweeping right.
    #[default]
    Rainbow,
    /// Warm colors flickering upward.
    Fire,
    /// Slow horizontal swell.
    Ocean,
    /// Green columns falling down.
    Matrix,
    /// Blocky alternating neon.
    Neon,
    /// Grayscale pulse of the whole block.
    Mono,
}

impl ColorScheme {
    pub const ALL: [ColorScheme; 6] = [
        Self::Rainbow,
        Self::Fire,
        Self::Ocean,
        Self::Matrix,
        Self::Neon,
        Self::Mono,
    ];

    /// Exact, case-insensitive lookup.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Lookup that never fails: unknown names select the default scheme.
    pub fn from_name(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rainbow => "rainbow",
            Self::Fire => "fire",
            Self::Ocean => "ocean",
            Self::Matrix => "matrix",
            Self::Neon => "neon",
            Self::Mono => "mono",
        }
    }

    fn palette(self) -> &'static [u8] {
        match self {
            Self::Rainbow => RAINBOW,
            Self::Fire => FIRE,
            Self::Ocean => OCEAN,
            Self::Matrix => MATRIX,
            Self::Neon => NEON,
            Self::Mono => MONO,
        }
    }

    /// 256-color code for one cell of one frame.
    pub fn color_at(self, frame: u64, line: usize, col: usize) -> u8 {
        let palette = self.palette();
        let n = palette.len() as u64;
        let (line, col) = (line as u64, col as u64);
        let step = match self {
            Self::Rainbow => frame + line + col,
            Self::Fire => frame + line * 2 + (col * 7 + frame) % 3,
            Self::Ocean => frame / 2 + col / 2 + line,
            Self::Matrix => frame + col * 3 + (n - line % n),
            Self::Neon => frame / 2 + col / 4 + line / 2,
            Self::Mono => frame + line / 3,
        };
        palette[(step % n) as usize]
    }
}

/// Paint every non-whitespace cell of `lines` for `frame`.
///
/// An escape is only emitted when the color changes along a line; each line ends with a reset
/// so colors never bleed into padding.
pub fn paint_frame(lines: &[String], scheme: ColorScheme, frame: u64) -> String {
    let cap = lines.iter().map(|l| l.len() * 4 + 8).sum();
    let mut out = String::with_capacity(cap);
    for (y, line) in lines.iter().enumerate() {
        let mut current: Option<u8> = None;
        for (x, c) in line.chars().enumerate() {
            if c.is_whitespace() {
                out.push(c);
                continue;
            }
            let color = scheme.color_at(frame, y, x);
            if current != Some(color) {
                let _ = write!(out, "\x1b[38;5;{color}m");
                current = Some(color);
            }
            out.push(c);
        }
        if current.is_some() {
            out.push_str(RESET);
        }
        out.push('\n');
    }
    out
}
