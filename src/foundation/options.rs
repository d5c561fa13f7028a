use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::foundation::error::{ShoutError, ShoutResult};

/// Horizontal placement of each rendered line inside the art block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for Alignment {
    type Err = ShoutError;

    fn from_str(s: &str) -> ShoutResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "center" | "centre" | "c" => Ok(Self::Center),
            "right" | "r" => Ok(Self::Right),
            other => Err(ShoutError::invalid_option(format!(
                "alignment must be left, center or right, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        })
    }
}

/// Frame drawn around the art block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    #[default]
    None,
    Single,
    Double,
    Ascii,
}

impl FromStr for Border {
    type Err = ShoutError;

    fn from_str(s: &str) -> ShoutResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            "ascii" => Ok(Self::Ascii),
            other => Err(ShoutError::invalid_option(format!(
                "border must be none, single, double or ascii, got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Single => "single",
            Self::Double => "double",
            Self::Ascii => "ascii",
        })
    }
}

/// Options for one render request.
///
/// Built once per request and never mutated afterwards. Call [`RenderOptions::validate`]
/// before allocating anything on behalf of the request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderOptions {
    /// Requested font name. Unknown names fall back to the cache default.
    pub font: String,
    /// Color scheme name. Empty means uncolored for static renders.
    pub color: String,
    /// Maximum output width in columns; `0` disables wrapping.
    pub width: usize,
    /// Requested stream timeout in seconds; `0` selects the server default.
    pub timeout_secs: u64,
    /// Animation speed; clamped into the configured range, never rejected.
    pub speed: u32,
    pub align: Alignment,
    pub border: Border,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font: String::new(),
            color: String::new(),
            width: 0,
            timeout_secs: 0,
            speed: 0,
            align: Alignment::Left,
            border: Border::None,
        }
    }
}

impl RenderOptions {
    /// Reject options that could never produce a valid render.
    ///
    /// Font names are identifiers, not paths: separators and parent segments are refused so a
    /// name can never escape the font directory.
    pub fn validate(&self) -> ShoutResult<()> {
        if !self.font.is_empty() && !is_font_identifier(&self.font) {
            return Err(ShoutError::invalid_option(format!(
                "font name '{}' is not a valid identifier",
                self.font
            )));
        }
        if self.color.len() > 32 {
            return Err(ShoutError::invalid_option("color scheme name is too long"));
        }
        if self.width > MAX_WIDTH {
            return Err(ShoutError::invalid_option(format!(
                "width must be at most {MAX_WIDTH}, got {}",
                self.width
            )));
        }
        Ok(())
    }
}

/// Upper bound for requested output width.
pub const MAX_WIDTH: usize = 1000;

/// `true` for names made of ASCII alphanumerics, `-` and `_`.
pub fn is_font_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Inclusive speed bounds and the delay law derived from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeedRange {
    pub min: u32,
    pub max: u32,
}

/// Delay at speed 1. Higher speeds divide it.
pub const BASE_FRAME_DELAY_MS: u64 = 600;

impl SpeedRange {
    pub fn new(min: u32, max: u32) -> ShoutResult<Self> {
        if min == 0 {
            return Err(ShoutError::config("min speed must be >= 1"));
        }
        if min > max {
            return Err(ShoutError::config(format!(
                "min speed must be <= max speed, got min={min}, max={max}"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn clamp(self, speed: u32) -> u32 {
        speed.clamp(self.min, self.max)
    }

    /// Inter-frame delay for `speed` after clamping.
    pub fn cadence(self, speed: u32) -> Duration {
        let s = u64::from(self.clamp(speed));
        Duration::from_millis((BASE_FRAME_DELAY_MS / s).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_parses_case_insensitively() {
        assert_eq!("LEFT".parse::<Alignment>().unwrap(), Alignment::Left);
        assert_eq!(" center ".parse::<Alignment>().unwrap(), Alignment::Center);
        assert_eq!("r".parse::<Alignment>().unwrap(), Alignment::Right);
        assert!("diagonal".parse::<Alignment>().is_err());
    }

    #[test]
    fn border_parses_and_displays() {
        for b in [Border::None, Border::Single, Border::Double, Border::Ascii] {
            assert_eq!(b.to_string().parse::<Border>().unwrap(), b);
        }
        assert!(matches!(
            "wavy".parse::<Border>(),
            Err(ShoutError::InvalidOption(_))
        ));
    }

    #[test]
    fn font_names_must_be_identifiers() {
        let mut opts = RenderOptions {
            font: "doom".to_string(),
            ..RenderOptions::default()
        };
        assert!(opts.validate().is_ok());

        for bad in ["../etc/passwd", "a/b", "a.b", "a b"] {
            opts.font = bad.to_string();
            assert!(opts.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn speed_is_clamped_not_rejected() {
        let range = SpeedRange::new(1, 10).unwrap();
        assert_eq!(range.clamp(0), 1);
        assert_eq!(range.clamp(999), 10);
        assert_eq!(range.cadence(0), range.cadence(1));
        assert_eq!(range.cadence(999), range.cadence(10));
    }

    #[test]
    fn higher_speed_means_shorter_cadence() {
        let range = SpeedRange::new(1, 10).unwrap();
        assert_eq!(range.cadence(1), Duration::from_millis(600));
        assert_eq!(range.cadence(10), Duration::from_millis(60));
        assert!(range.cadence(6) < range.cadence(5));
    }

    #[test]
    fn speed_range_rejects_inverted_bounds() {
        assert!(SpeedRange::new(0, 10).is_err());
        assert!(SpeedRange::new(5, 4).is_err());
    }
}
