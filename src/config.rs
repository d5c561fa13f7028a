//! Service configuration.
//!
//! Sources are layered: built-in defaults, then an optional JSON file, then `SHOUT_*`
//! variables from the process environment or a `.env` file in the working directory.
//! Command-line flags are applied by the binary on top of the result.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::foundation::error::{ShoutError, ShoutResult};
use crate::foundation::options::{Alignment, Border, SpeedRange};
use crate::stream::session::StreamSettings;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "SHOUT_";

/// Dotenv file consulted by [`Config::load`].
pub const DOTENV_FILE: &str = ".env";

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub fonts: FontConfig,
    pub streaming: StreamingConfig,
    pub text: TextConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// A socket write blocked longer than this counts as a disconnect.
    pub write_timeout_secs: u64,
    /// How long shutdown waits for open streams before abandoning them.
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            write_timeout_secs: 5,
            shutdown_grace_secs: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    pub directory: PathBuf,
    pub default: String,
    pub allowed: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./fonts"),
            default: crate::fonts::cache::DEFAULT_FONT.to_string(),
            allowed: ["standard", "doom", "banner", "slant", "3d", "speed", "starwars"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamingConfig {
    pub max_concurrent_streams: usize,
    pub default_timeout_secs: u64,
    pub max_timeout_secs: u64,
    pub default_speed: u32,
    pub min_speed: u32,
    pub max_speed: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            max_concurrent_streams: 100,
            default_timeout_secs: 30,
            max_timeout_secs: 300,
            default_speed: 5,
            min_speed: 1,
            max_speed: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub max_length: usize,
    pub default_align: Alignment,
    pub default_border: Border,
    /// Default output width; `0` disables wrapping.
    pub default_width: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_length: 100,
            default_align: Alignment::Center,
            default_border: Border::None,
            default_width: 0,
        }
    }
}

impl Config {
    /// Defaults, then `path` (if any), then the environment; validated.
    ///
    /// Process variables win over entries in [`DOTENV_FILE`].
    pub fn load(path: Option<&Path>) -> ShoutResult<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        let dotenv = read_dotenv(Path::new(DOTENV_FILE))?;
        cfg.apply_env(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> ShoutResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ShoutError::config(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
            .map_err(|e| ShoutError::config(format!("parse config '{}': {e}", path.display())))
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Apply `SHOUT_*` overrides. `lookup` returns the value of an environment key.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ShoutResult<()> {
        let get = |suffix: &str| {
            let key = format!("{ENV_PREFIX}{suffix}");
            lookup(&key).map(|v| (key, v))
        };

        if let Some((_, v)) = get("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some((k, v)) = get("SERVER_PORT") {
            self.server.port = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("SERVER_WRITE_TIMEOUT") {
            self.server.write_timeout_secs = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("SERVER_SHUTDOWN_GRACE") {
            self.server.shutdown_grace_secs = parse_env(&k, &v)?;
        }

        if let Some((_, v)) = get("FONTS_PATH") {
            self.fonts.directory = PathBuf::from(v);
        }
        if let Some((_, v)) = get("FONTS_DEFAULT") {
            self.fonts.default = v;
        }
        if let Some((_, v)) = get("FONTS_ALLOWED") {
            self.fonts.allowed = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some((k, v)) = get("STREAMING_MAX_CONCURRENT_STREAMS") {
            self.streaming.max_concurrent_streams = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("STREAMING_DEFAULT_TIMEOUT") {
            self.streaming.default_timeout_secs = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("STREAMING_MAX_TIMEOUT") {
            self.streaming.max_timeout_secs = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("STREAMING_DEFAULT_SPEED") {
            self.streaming.default_speed = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("STREAMING_MIN_SPEED") {
            self.streaming.min_speed = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("STREAMING_MAX_SPEED") {
            self.streaming.max_speed = parse_env(&k, &v)?;
        }

        if let Some((k, v)) = get("TEXT_MAX_LENGTH") {
            self.text.max_length = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("TEXT_DEFAULT_ALIGN") {
            self.text.default_align = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("TEXT_DEFAULT_BORDER") {
            self.text.default_border = parse_env(&k, &v)?;
        }
        if let Some((k, v)) = get("TEXT_DEFAULT_WIDTH") {
            self.text.default_width = parse_env(&k, &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ShoutResult<()> {
        if self.server.port == 0 {
            return Err(ShoutError::config("server port must be between 1 and 65535"));
        }
        if self.fonts.allowed.is_empty() {
            return Err(ShoutError::config("at least one font must be allowed"));
        }
        let s = &self.streaming;
        if s.max_concurrent_streams == 0 {
            return Err(ShoutError::config("max concurrent streams must be >= 1"));
        }
        if s.default_timeout_secs == 0 {
            return Err(ShoutError::config("default stream timeout must be >= 1s"));
        }
        if s.max_timeout_secs < s.default_timeout_secs {
            return Err(ShoutError::config(format!(
                "max timeout must be >= default timeout, got max={}, default={}",
                s.max_timeout_secs, s.default_timeout_secs
            )));
        }
        let speeds = self.speed_range()?;
        if speeds.clamp(s.default_speed) != s.default_speed {
            return Err(ShoutError::config(format!(
                "default speed must be between {} and {}, got {}",
                speeds.min, speeds.max, s.default_speed
            )));
        }
        if self.text.max_length == 0 {
            return Err(ShoutError::config("max text length must be >= 1"));
        }
        Ok(())
    }

    pub fn speed_range(&self) -> ShoutResult<SpeedRange> {
        SpeedRange::new(self.streaming.min_speed, self.streaming.max_speed)
    }

    pub fn stream_settings(&self) -> ShoutResult<StreamSettings> {
        Ok(StreamSettings {
            default_timeout: Duration::from_secs(self.streaming.default_timeout_secs),
            max_duration: Duration::from_secs(self.streaming.max_timeout_secs),
            speeds: self.speed_range()?,
            default_speed: self.streaming.default_speed,
        })
    }
}

/// `KEY=value` pairs from a dotenv file. A missing file yields no pairs.
pub fn read_dotenv(path: &Path) -> ShoutResult<HashMap<String, String>> {
    let bad = |e: dotenvy::Error| ShoutError::config(format!("read '{}': {e}", path.display()));
    match dotenvy::from_path_iter(path) {
        Ok(pairs) => pairs.map(|pair| pair.map_err(bad)).collect(),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(bad(e)),
    }
}

fn parse_env<T: FromStr>(key: &str, raw: &str) -> ShoutResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ShoutError::config(format!("{key}={raw:?}: {e}")))
}
