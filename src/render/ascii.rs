use crate::fonts::cache::FontCache;
use crate::foundation::error::{ShoutError, ShoutResult};
use crate::foundation::options::RenderOptions;
use crate::render::layout::{Layout, arrange};

/// Render `text` as glyph art with the font selected by `opts`.
///
/// Resolution falls back to the cache's default font when `opts.font` is not loaded. The cache
/// is only read, so any number of callers may render concurrently. Empty text yields an empty
/// string without touching the cache.
pub fn render(text: &str, opts: &RenderOptions, cache: Option<&FontCache>) -> ShoutResult<String> {
    Ok(render_lines(text, opts, cache)?.join("\n"))
}

/// [`render`], returning the art as individual lines.
#[tracing::instrument(level = "debug", skip(opts, cache), fields(font = %opts.font))]
pub fn render_lines(
    text: &str,
    opts: &RenderOptions,
    cache: Option<&FontCache>,
) -> ShoutResult<Vec<String>> {
    let cache = cache.ok_or(ShoutError::NoCache)?;
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let font = cache
        .lookup_or_default(&opts.font, cache.default_font())
        .ok_or(ShoutError::NoFontsLoaded)?;

    let glyphs = font
        .glyphs()
        .map_err(|e| ShoutError::render(format!("font '{}': {e}", font.name())))?;
    let layout = Layout {
        width: opts.width,
        align: opts.align,
        border: opts.border,
    };
    arrange(glyphs, text, layout)
        .map_err(|e| ShoutError::render(format!("font '{}': {e}", font.name())))
}
