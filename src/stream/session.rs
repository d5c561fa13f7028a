use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::fonts::cache::FontCache;
use crate::foundation::error::{ShoutError, ShoutResult};
use crate::foundation::options::{RenderOptions, SpeedRange};
use crate::render::ascii::render_lines;
use crate::render::palette::{
    CLEAR_SCREEN, CURSOR_HOME, ColorScheme, HIDE_CURSOR, RESET, SHOW_CURSOR, paint_frame,
};
use crate::stream::admission::{AdmissionPermit, StreamAdmission};
use crate::stream::shutdown::Shutdown;

/// Server-side limits applied to every animated stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamSettings {
    /// Used when a request asks for no particular timeout.
    pub default_timeout: Duration,
    /// Hard cap on any single stream, whatever the request says.
    pub max_duration: Duration,
    pub speeds: SpeedRange,
    /// Substituted by request parsers when no speed is given.
    pub default_speed: u32,
}

impl StreamSettings {
    /// `min(requested or default, max)`.
    pub fn effective_deadline(&self, requested_secs: u64) -> Duration {
        let requested = if requested_secs == 0 {
            self.default_timeout
        } else {
            Duration::from_secs(requested_secs)
        };
        requested.min(self.max_duration)
    }
}

/// Position in the per-stream state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Admitted,
    Rendering,
    Streaming,
    Draining,
    Closed,
}

/// Why a stream stopped emitting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamEnd {
    /// The effective deadline elapsed.
    Deadline,
    /// A write or flush failed; the client is gone.
    Disconnected,
    /// Server shutdown was requested.
    Cancelled,
}

/// Summary of one completed stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamReport {
    pub frames: u64,
    pub end: StreamEnd,
    pub deadline: Duration,
    pub cadence: Duration,
    pub elapsed: Duration,
}

/// Runs animated streams against shared fonts, admission and shutdown state.
///
/// Cheap to clone; every clone shares the same cache, admission counter and token.
#[derive(Clone, Debug)]
pub struct Animator {
    fonts: Arc<FontCache>,
    admission: Arc<StreamAdmission>,
    settings: StreamSettings,
    shutdown: Shutdown,
}

impl Animator {
    pub fn new(
        fonts: Arc<FontCache>,
        admission: Arc<StreamAdmission>,
        settings: StreamSettings,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            fonts,
            admission,
            settings,
            shutdown,
        }
    }

    pub fn admission(&self) -> &StreamAdmission {
        &self.admission
    }

    pub fn settings(&self) -> &StreamSettings {
        &self.settings
    }

    /// Stream `text` as a color-cycling animation into `out` until the deadline, a failed
    /// write, or shutdown.
    ///
    /// Returns [`ShoutError::CapacityExceeded`] immediately, without writing anything, when no
    /// slot is free. Render failures are returned before the first byte is written. Every
    /// admitted stream releases its slot exactly once before this returns.
    pub fn run_animated_stream<W: Write>(
        &self,
        text: &str,
        opts: &RenderOptions,
        out: &mut W,
    ) -> ShoutResult<StreamReport> {
        opts.validate()?;

        let Some(permit) = self.admission.try_admit() else {
            tracing::warn!(
                max = self.admission.capacity(),
                "rejecting stream: at capacity"
            );
            return Err(ShoutError::CapacityExceeded {
                max: self.admission.capacity(),
            });
        };

        let mut session = AnimationSession::admit(permit);
        let result = session.run(&self.fonts, &self.settings, &self.shutdown, text, opts, out);
        session.close();
        result
    }
}

/// Per-stream state. Holds the admission permit until [`AnimationSession::close`] or drop.
struct AnimationSession<'a> {
    permit: Option<AdmissionPermit<'a>>,
    state: SessionState,
    lines: Vec<String>,
    frame: u64,
}

impl<'a> AnimationSession<'a> {
    fn admit(permit: AdmissionPermit<'a>) -> Self {
        let session = Self {
            permit: Some(permit),
            state: SessionState::Admitted,
            lines: Vec::new(),
            frame: 0,
        };
        tracing::debug!(state = ?session.state, "stream session");
        session
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, frame = self.frame, "stream transition");
        self.state = next;
    }

    fn run<W: Write>(
        &mut self,
        fonts: &FontCache,
        settings: &StreamSettings,
        shutdown: &Shutdown,
        text: &str,
        opts: &RenderOptions,
        out: &mut W,
    ) -> ShoutResult<StreamReport> {
        self.transition(SessionState::Rendering);
        self.lines = render_lines(text, opts, Some(fonts)).inspect_err(|e| {
            tracing::error!(error = %e, "stream render failed");
        })?;

        let cadence = settings.speeds.cadence(opts.speed);
        let deadline = settings.effective_deadline(opts.timeout_secs);
        let scheme = ColorScheme::from_name(&opts.color);
        self.transition(SessionState::Streaming);

        let started = Instant::now();
        // `None` when the deadline lies past what `Instant` can represent.
        let deadline_at = started.checked_add(deadline);
        let end = self.stream_frames(out, scheme, cadence, deadline_at, shutdown);
        let elapsed = started.elapsed();

        self.transition(SessionState::Draining);
        if end != StreamEnd::Disconnected {
            let _ = writeln!(out, "{RESET}{SHOW_CURSOR}").and_then(|()| out.flush());
        }

        tracing::info!(
            frames = self.frame,
            ?end,
            elapsed_ms = elapsed.as_millis() as u64,
            "stream finished"
        );
        Ok(StreamReport {
            frames: self.frame,
            end,
            deadline,
            cadence,
            elapsed,
        })
    }

    /// Emit frames until one of deadline, disconnect or cancellation wins.
    fn stream_frames<W: Write>(
        &mut self,
        out: &mut W,
        scheme: ColorScheme,
        cadence: Duration,
        deadline_at: Option<Instant>,
        shutdown: &Shutdown,
    ) -> StreamEnd {
        if write!(out, "{HIDE_CURSOR}{CLEAR_SCREEN}").is_err() {
            return StreamEnd::Disconnected;
        }

        loop {
            if shutdown.is_cancelled() {
                return StreamEnd::Cancelled;
            }

            let frame = paint_frame(&self.lines, scheme, self.frame);
            let written = out
                .write_all(CURSOR_HOME.as_bytes())
                .and_then(|()| out.write_all(frame.as_bytes()))
                .and_then(|()| out.flush());
            if let Err(e) = written {
                tracing::debug!(error = %e, "client disconnected");
                return StreamEnd::Disconnected;
            }
            self.frame += 1;

            let pause = match deadline_at {
                Some(at) => {
                    let now = Instant::now();
                    if now >= at {
                        return StreamEnd::Deadline;
                    }
                    cadence.min(at - now)
                }
                None => cadence,
            };
            if shutdown.wait_timeout(pause) {
                return StreamEnd::Cancelled;
            }
            if deadline_at.is_some_and(|at| Instant::now() >= at) {
                return StreamEnd::Deadline;
            }
        }
    }

    /// Draining → Closed. Releases the admission slot; safe to call on every path.
    fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if self.state != SessionState::Draining {
            self.transition(SessionState::Draining);
        }
        if let Some(permit) = self.permit.take() {
            permit.release();
        }
        self.transition(SessionState::Closed);
    }
}

impl Drop for AnimationSession<'_> {
    fn drop(&mut self) {
        self.close();
    }
}
