use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shout", version, about = "Block-letter text, rendered or animated")]
struct Cli {
    /// JSON configuration file. `SHOUT_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve renders and animated streams over HTTP.
    Serve(ServeArgs),
    /// Render text once to stdout.
    Render(RenderArgs),
    /// Animate text on stdout until the timeout or Ctrl-C.
    Stream(StreamArgs),
    /// List the fonts that load from the configured directory.
    Fonts,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser, Debug)]
struct StyleArgs {
    /// Font name; unknown names fall back to the default font.
    #[arg(long, short)]
    font: Option<String>,

    /// Color scheme (rainbow, fire, ocean, matrix, neon, mono).
    #[arg(long, short)]
    color: Option<String>,

    /// Wrap width in columns; 0 disables wrapping.
    #[arg(long, short)]
    width: Option<usize>,

    #[arg(long, short)]
    align: Option<shout::Alignment>,

    #[arg(long, short)]
    border: Option<shout::Border>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    text: String,

    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Parser, Debug)]
struct StreamArgs {
    text: String,

    #[command(flatten)]
    style: StyleArgs,

    /// Animation speed, clamped to the configured range.
    #[arg(long, short)]
    speed: Option<u32>,

    /// Stream length in seconds, capped by the configured maximum.
    #[arg(long, short)]
    timeout: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = shout::Config::load(cli.config.as_deref()).context("load configuration")?;
    match cli.cmd {
        Command::Serve(args) => {
            if let Some(host) = args.host {
                config.server.host = host;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            cmd_serve(config)
        }
        Command::Render(args) => cmd_render(&config, args),
        Command::Stream(args) => cmd_stream(&config, args),
        Command::Fonts => cmd_fonts(&config),
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_fonts(config: &shout::Config) -> anyhow::Result<Arc<shout::FontCache>> {
    let cache = shout::FontCache::with_default(config.fonts.default.clone());
    let loaded = cache.populate(&config.fonts.directory, &config.fonts.allowed);
    if loaded == 0 {
        anyhow::bail!(
            "no fonts loaded from '{}' (allowed: {})",
            config.fonts.directory.display(),
            config.fonts.allowed.join(", ")
        );
    }
    if cache.lookup(cache.default_font()).is_none() {
        tracing::warn!(
            font = cache.default_font(),
            "default font is not loaded; unknown font names will fail"
        );
    }
    Ok(Arc::new(cache))
}

fn render_options(config: &shout::Config, style: StyleArgs) -> shout::RenderOptions {
    shout::RenderOptions {
        font: style.font.unwrap_or_default(),
        color: style.color.unwrap_or_default(),
        width: style.width.unwrap_or(config.text.default_width),
        align: style.align.unwrap_or(config.text.default_align),
        border: style.border.unwrap_or(config.text.default_border),
        speed: config.streaming.default_speed,
        ..shout::RenderOptions::default()
    }
}

fn cmd_serve(config: shout::Config) -> anyhow::Result<()> {
    let fonts = load_fonts(&config)?;
    let shutdown = shout::Shutdown::new();
    install_signal_handler(shutdown.clone())?;

    let server = shout::Server::new(config, fonts, shutdown)?;
    let listener = server.bind()?;
    server.serve(listener).context("serve")?;
    Ok(())
}

fn cmd_render(config: &shout::Config, args: RenderArgs) -> anyhow::Result<()> {
    let fonts = load_fonts(config)?;
    let text = shout::clean_text(&args.text, config.text.max_length)?;
    let colored = args.style.color.is_some();
    let opts = render_options(config, args.style);
    opts.validate()?;

    let lines = shout::render_lines(&text, &opts, Some(&*fonts))?;
    let mut stdout = std::io::stdout().lock();
    if colored {
        let scheme = shout::ColorScheme::from_name(&opts.color);
        stdout.write_all(shout::render::palette::paint_frame(&lines, scheme, 0).as_bytes())?;
    } else {
        for line in &lines {
            writeln!(stdout, "{line}")?;
        }
    }
    stdout.flush().context("write stdout")?;
    Ok(())
}

fn cmd_stream(config: &shout::Config, args: StreamArgs) -> anyhow::Result<()> {
    let fonts = load_fonts(config)?;
    let text = shout::clean_text(&args.text, config.text.max_length)?;
    let mut opts = render_options(config, args.style);
    if let Some(speed) = args.speed {
        opts.speed = speed;
    }
    opts.timeout_secs = args.timeout.unwrap_or(0);

    let shutdown = shout::Shutdown::new();
    install_signal_handler(shutdown.clone())?;
    let animator = shout::Animator::new(
        fonts,
        Arc::new(shout::StreamAdmission::new(1)),
        config.stream_settings()?,
        shutdown,
    );

    let mut stdout = std::io::stdout().lock();
    let report = animator.run_animated_stream(&text, &opts, &mut stdout)?;
    tracing::debug!(frames = report.frames, end = ?report.end, "stream done");
    Ok(())
}

fn cmd_fonts(config: &shout::Config) -> anyhow::Result<()> {
    let fonts = load_fonts(config)?;
    let mut stdout = std::io::stdout().lock();
    for name in fonts.list() {
        let marker = if name == fonts.default_font() { " (default)" } else { "" };
        writeln!(stdout, "{name}{marker}")?;
    }
    Ok(())
}

/// First SIGINT/SIGTERM cancels gracefully; a second one exits immediately.
#[cfg(unix)]
fn install_signal_handler(shutdown: shout::Shutdown) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("register signal handlers")?;
    std::thread::Builder::new()
        .name("shout-signals".to_string())
        .spawn(move || {
            for (seen, signal) in signals.forever().enumerate() {
                if seen == 0 {
                    tracing::info!(signal, "signal received, shutting down");
                    shutdown.cancel();
                } else {
                    std::process::exit(130);
                }
            }
        })
        .context("spawn signal thread")?;
    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handler(_shutdown: shout::Shutdown) -> anyhow::Result<()> {
    Ok(())
}
