//! Plain-TCP HTTP front end: one thread per connection, streams delimited by connection close.

pub mod http;
pub mod metrics;

use std::fmt::Display;
use std::io::{self, BufReader, BufWriter, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::fonts::cache::FontCache;
use crate::foundation::error::{ShoutError, ShoutResult};
use crate::foundation::options::RenderOptions;
use crate::foundation::text::clean_text;
use crate::render::ascii::render_lines;
use crate::render::palette::{ColorScheme, paint_frame};
use crate::stream::admission::StreamAdmission;
use crate::stream::session::Animator;
use crate::stream::shutdown::Shutdown;

use self::http::{HeadOnFirstWrite, Request, head, read_request, write_response};
use self::metrics::{Metrics, MetricsSnapshot};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// How often the accept loop re-checks for shutdown while idle.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

const HELP: &str = "\
shout: block-letter text over HTTP

  GET /<text>            render once (add ?c=<scheme> for color)
  GET /party/<text>      stream a color-cycling animation
  GET /fonts             list loaded fonts
  GET /stats             request counters as JSON
  GET /health            liveness probe

query parameters:
  f, font     font name
  c, color    rainbow | fire | ocean | matrix | neon | mono
  w, width    wrap width in columns (0 = no wrap; also mw, maxwidth)
  t, timeout  stream length in seconds (capped by the server)
  s, speed    animation speed (clamped to the server range)
  a, align    left | center | right
  b, border   none | single | double | ascii

use + or _ for spaces, e.g. curl localhost:8080/party/hello+world?c=fire
";

/// Shared request-handling state. Cheap to clone; one clone per connection thread.
#[derive(Clone, Debug)]
pub struct Server {
    config: Arc<Config>,
    fonts: Arc<FontCache>,
    animator: Animator,
    metrics: Arc<Metrics>,
    shutdown: Shutdown,
}

impl Server {
    pub fn new(config: Config, fonts: Arc<FontCache>, shutdown: Shutdown) -> ShoutResult<Self> {
        config.validate()?;
        let admission = Arc::new(StreamAdmission::new(config.streaming.max_concurrent_streams));
        let animator = Animator::new(
            Arc::clone(&fonts),
            admission,
            config.stream_settings()?,
            shutdown.clone(),
        );
        Ok(Self {
            config: Arc::new(config),
            fonts,
            animator,
            metrics: Arc::new(Metrics::default()),
            shutdown,
        })
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        let admission = self.animator.admission();
        self.metrics
            .snapshot(admission.active_count(), admission.capacity())
    }

    /// Bind the configured `host:port`.
    pub fn bind(&self) -> ShoutResult<TcpListener> {
        let addr = (self.config.server.host.as_str(), self.config.server.port);
        TcpListener::bind(addr).map_err(|e| {
            ShoutError::config(format!(
                "bind {}:{}: {e}",
                self.config.server.host, self.config.server.port
            ))
        })
    }

    /// Accept connections until shutdown, then wait up to the grace period for open streams.
    ///
    /// Returns once draining finishes or the grace period elapses; streams still open at that
    /// point are abandoned to process exit.
    pub fn serve(&self, listener: TcpListener) -> ShoutResult<()> {
        listener.set_nonblocking(true)?;
        tracing::info!(
            addr = %listener.local_addr()?,
            fonts = self.fonts.len(),
            max_streams = self.animator.admission().capacity(),
            "listening"
        );

        while !self.shutdown.is_cancelled() {
            match listener.accept() {
                Ok((stream, peer)) => {
                    let server = self.clone();
                    let spawned = std::thread::Builder::new()
                        .name("shout-conn".to_string())
                        .spawn(move || server.handle_connection(stream, peer));
                    if let Err(e) = spawned {
                        tracing::error!(error = %e, %peer, "failed to spawn connection thread");
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.shutdown.wait_timeout(ACCEPT_POLL);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                    self.shutdown.wait_timeout(ACCEPT_POLL);
                }
            }
        }
        drop(listener);

        self.drain();
        Ok(())
    }

    /// Wait for active streams to observe cancellation. Returns `true` if all closed in time.
    pub fn drain(&self) -> bool {
        let grace = Duration::from_secs(self.config.server.shutdown_grace_secs);
        let admission = self.animator.admission();
        tracing::info!(
            active = admission.active_count(),
            grace_secs = grace.as_secs(),
            "draining streams"
        );
        if admission.wait_idle(grace) {
            tracing::info!("all streams closed");
            true
        } else {
            tracing::warn!(
                abandoned = admission.active_count(),
                "grace period elapsed with streams still open"
            );
            false
        }
    }

    fn handle_connection(&self, stream: TcpStream, peer: SocketAddr) {
        let span = tracing::debug_span!("conn", %peer);
        let _enter = span.enter();
        if let Err(e) = self.handle(&stream) {
            tracing::debug!(error = %e, "connection closed with error");
        }
    }

    fn handle(&self, stream: &TcpStream) -> io::Result<()> {
        stream.set_nonblocking(false)?;
        let timeout = Duration::from_secs(self.config.server.write_timeout_secs.max(1));
        stream.set_write_timeout(Some(timeout))?;
        stream.set_read_timeout(Some(timeout))?;

        let mut reader = BufReader::new(stream);
        let mut out = BufWriter::new(stream);
        let req = match read_request(&mut reader) {
            Ok(req) => req,
            Err(ShoutError::Io(e)) => return Err(e),
            Err(e) => return self.write_error(&mut out, &e),
        };
        tracing::debug!(method = %req.method, path = %req.path, "request");
        self.respond(&req, &mut out)?;
        out.flush()
    }

    /// Route one parsed request and write the full response to `out`.
    pub fn respond<W: Write>(&self, req: &Request, out: &mut W) -> io::Result<()> {
        if req.method != "GET" {
            return write_response(out, 405, TEXT_PLAIN, "only GET is supported\n");
        }

        match req.path.as_str() {
            "/" => write_response(out, 200, TEXT_PLAIN, HELP),
            "/health" => write_response(out, 200, TEXT_PLAIN, "ok\n"),
            "/favicon.ico" => write_response(out, 404, TEXT_PLAIN, "not found\n"),
            "/fonts" => {
                self.metrics.record_font_listing();
                let mut body = self.fonts.list().join("\n");
                body.push('\n');
                write_response(out, 200, TEXT_PLAIN, &body)
            }
            "/stats" => {
                let body = serde_json::to_string_pretty(&self.metrics())
                    .map_err(io::Error::other)?;
                write_response(out, 200, APPLICATION_JSON, &body)
            }
            path => match path.strip_prefix("/party") {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                    let raw = rest.strip_prefix('/').unwrap_or(rest);
                    self.serve_stream(req, raw, out)
                }
                _ => self.serve_static(req, path.strip_prefix('/').unwrap_or(path), out),
            },
        }
    }

    fn serve_static<W: Write>(&self, req: &Request, raw_text: &str, out: &mut W) -> io::Result<()> {
        self.metrics.record_static();
        match self.render_static(req, raw_text) {
            Ok(body) => write_response(out, 200, TEXT_PLAIN, &body),
            Err(e) => self.write_error(out, &e),
        }
    }

    fn render_static(&self, req: &Request, raw_text: &str) -> ShoutResult<String> {
        let (text, opts) = self.prepare(req, raw_text)?;
        opts.validate()?;
        let lines = render_lines(&text, &opts, Some(&*self.fonts))?;
        if req.param(&["c", "color"]).is_some() {
            Ok(paint_frame(&lines, ColorScheme::from_name(&opts.color), 0))
        } else {
            let mut body = lines.join("\n");
            body.push('\n');
            Ok(body)
        }
    }

    fn serve_stream<W: Write>(&self, req: &Request, raw_text: &str, out: &mut W) -> io::Result<()> {
        self.metrics.record_stream();
        let (text, opts) = match self.prepare(req, raw_text) {
            Ok(prepared) => prepared,
            Err(e) => return self.write_error(out, &e),
        };

        let mut body = HeadOnFirstWrite::new(out, head(200, TEXT_PLAIN, None));
        let result = self.animator.run_animated_stream(&text, &opts, &mut body);
        let started = body.head_written();
        drop(body);

        match result {
            Ok(_) => Ok(()),
            Err(e) if started => {
                tracing::error!(error = %e, "stream failed after output started");
                Ok(())
            }
            Err(e) => self.write_error(out, &e),
        }
    }

    fn prepare(&self, req: &Request, raw_text: &str) -> ShoutResult<(String, RenderOptions)> {
        let text = clean_text(raw_text, self.config.text.max_length)?;
        if text.is_empty() {
            return Err(ShoutError::invalid_option("no text to render"));
        }
        Ok((text, self.request_options(req)?))
    }

    /// Build render options from query parameters, filling gaps from configuration.
    pub fn request_options(&self, req: &Request) -> ShoutResult<RenderOptions> {
        let text = &self.config.text;
        Ok(RenderOptions {
            font: req.param(&["f", "font"]).unwrap_or_default().to_string(),
            color: req.param(&["c", "color"]).unwrap_or_default().to_string(),
            width: parse_param(req, &["w", "width", "mw", "maxwidth"])?
                .unwrap_or(text.default_width),
            timeout_secs: parse_param(req, &["t", "timeout"])?.unwrap_or(0),
            speed: parse_param(req, &["s", "speed"])?
                .unwrap_or(self.config.streaming.default_speed),
            align: parse_param(req, &["a", "align"])?.unwrap_or(text.default_align),
            border: parse_param(req, &["b", "border"])?.unwrap_or(text.default_border),
        })
    }

    fn write_error<W: Write>(&self, out: &mut W, err: &ShoutError) -> io::Result<()> {
        let status = status_for(err);
        let body = match status {
            503 => {
                self.metrics.record_rejected();
                format!("{err}\ntry again shortly\n")
            }
            400 => {
                self.metrics.record_error();
                format!("{err}\n")
            }
            _ => {
                self.metrics.record_error();
                tracing::error!(error = %err, "request failed");
                "internal server error\n".to_string()
            }
        };
        write_response(out, status, TEXT_PLAIN, &body)
    }
}

/// HTTP status for a failed request.
pub fn status_for(err: &ShoutError) -> u16 {
    match err {
        ShoutError::CapacityExceeded { .. } => 503,
        ShoutError::InvalidOption(_) => 400,
        _ => 500,
    }
}

fn parse_param<T>(req: &Request, keys: &[&str]) -> ShoutResult<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    req.param(keys)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<T>().map_err(|e| {
                let name = keys.get(1).or(keys.first()).copied().unwrap_or_default();
                ShoutError::invalid_option(format!("{name}={v:?}: {e}"))
            })
        })
        .transpose()
}
