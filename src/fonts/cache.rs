use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::fonts::figfont::{FigFont, FontError};
use crate::foundation::options::is_font_identifier;

/// File extension of loadable fonts.
pub const FONT_EXTENSION: &str = "flf";

/// Font used for fallback when none is configured.
pub const DEFAULT_FONT: &str = "standard";

/// A named, validated font file.
///
/// The glyph table is parsed on first use and memoized; the name and path never change.
#[derive(Debug)]
pub struct Font {
    name: String,
    path: PathBuf,
    parsed: OnceLock<Result<FigFont, FontError>>,
}

impl Font {
    fn new(name: String, path: PathBuf) -> Self {
        Self {
            name,
            path,
            parsed: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed glyph table, loading it on the first call.
    pub fn glyphs(&self) -> Result<&FigFont, FontError> {
        self.parsed
            .get_or_init(|| {
                tracing::debug!(font = %self.name, path = %self.path.display(), "parsing font");
                FigFont::from_path(&self.path)
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

/// Shared name → [`Font`] mapping.
///
/// Population takes the write lock; every other operation only reads, so concurrent renders
/// never wait on each other.
#[derive(Debug)]
pub struct FontCache {
    fonts: RwLock<BTreeMap<String, Arc<Font>>>,
    default_font: String,
}

impl Default for FontCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FontCache {
    pub fn new() -> Self {
        Self::with_default(DEFAULT_FONT)
    }

    pub fn with_default(default_font: impl Into<String>) -> Self {
        Self {
            fonts: RwLock::new(BTreeMap::new()),
            default_font: default_font.into(),
        }
    }

    pub fn default_font(&self) -> &str {
        &self.default_font
    }

    /// Register every allowed font found as `directory/<name>.flf`.
    ///
    /// Names that fail validation are logged and skipped. Returns how many fonts were loaded
    /// by this call; zero is not an error here, the caller decides whether it is fatal.
    pub fn populate<S: AsRef<str>>(&self, directory: &Path, allowed: &[S]) -> usize {
        let mut fonts = self.fonts.write().unwrap_or_else(PoisonError::into_inner);
        let mut loaded = 0usize;

        for name in allowed {
            let name = name.as_ref();
            if !is_font_identifier(name) {
                tracing::warn!(font = name, "skipping font: name is not a plain identifier");
                continue;
            }
            if fonts.contains_key(name) {
                continue;
            }

            let path = directory.join(format!("{name}.{FONT_EXTENSION}"));
            if let Err(e) = validate_font_file(&path) {
                tracing::warn!(font = name, error = %e, "could not load font");
                continue;
            }

            tracing::debug!(font = name, path = %path.display(), "loaded font");
            fonts.insert(name.to_string(), Arc::new(Font::new(name.to_string(), path)));
            loaded += 1;
        }

        tracing::info!(loaded, requested = allowed.len(), "font cache populated");
        loaded
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<Font>> {
        self.read().get(name).cloned()
    }

    /// The named font, else `default_name`, else `None` (no usable fonts at all).
    pub fn lookup_or_default(&self, name: &str, default_name: &str) -> Option<Arc<Font>> {
        let fonts = self.read();
        fonts
            .get(name)
            .or_else(|| fonts.get(default_name))
            .cloned()
    }

    /// Sorted snapshot of the loaded font names.
    pub fn list(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, Arc<Font>>> {
        self.fonts.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Check that `path` exists, is a regular file and can be opened.
pub fn validate_font_file(path: &Path) -> Result<(), FontError> {
    let display = || path.display().to_string();
    let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FontError::Missing { path: display() },
        _ => FontError::Read {
            path: display(),
            message: e.to_string(),
        },
    })?;
    if !meta.is_file() {
        return Err(FontError::NotAFile { path: display() });
    }
    std::fs::File::open(path).map(|_| ()).map_err(|e| FontError::Read {
        path: display(),
        message: e.to_string(),
    })
}
