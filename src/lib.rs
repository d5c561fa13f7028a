#![forbid(unsafe_code)]

pub mod config;
pub mod fonts;
pub mod foundation;
pub mod render;
pub mod server;
pub mod stream;

pub use config::Config;
pub use fonts::cache::{DEFAULT_FONT, Font, FontCache};
pub use fonts::figfont::{FigFont, FontError};
pub use foundation::error::{ShoutError, ShoutResult};
pub use foundation::options::{Alignment, Border, RenderOptions, SpeedRange};
pub use foundation::text::clean_text;
pub use render::ascii::{render, render_lines};
pub use render::palette::ColorScheme;
pub use server::Server;
pub use stream::admission::{AdmissionPermit, StreamAdmission};
pub use stream::session::{Animator, SessionState, StreamEnd, StreamReport, StreamSettings};
pub use stream::shutdown::Shutdown;
