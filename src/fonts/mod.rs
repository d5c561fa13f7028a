pub mod cache;
pub mod figfont;
