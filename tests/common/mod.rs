#![allow(dead_code)]

use std::path::{Path, PathBuf};

use shout::FontCache;

/// Route library logs to the test harness; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "shout_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Three-row font covering printable ASCII. Glyph for `c` is `cc / c<fill> / <fill><fill>`.
pub fn flf(fill: char) -> String {
    let mut src = String::from("flf2a$ 3 2 8 0 1\nsynthetic test font\n");
    for code in 32u32..=126 {
        let c = char::from_u32(code).unwrap();
        if c == ' ' {
            src.push_str("$$@\n$$@\n$$@@\n");
        } else {
            src.push_str(&format!("{c}{c}@\n{c}{fill}@\n{fill}{fill}@@\n"));
        }
    }
    src
}

pub fn write_font(dir: &Path, name: &str, fill: char) {
    std::fs::write(dir.join(format!("{name}.flf")), flf(fill)).unwrap();
}

/// Directory holding `standard` (fill `#`) and `doom` (fill `%`).
pub fn font_dir(name: &str) -> PathBuf {
    let dir = temp_dir(name);
    write_font(&dir, "standard", '#');
    write_font(&dir, "doom", '%');
    dir
}

pub fn loaded_cache(name: &str) -> FontCache {
    let dir = font_dir(name);
    let cache = FontCache::new();
    assert_eq!(cache.populate(&dir, &["standard", "doom"]), 2);
    cache
}
