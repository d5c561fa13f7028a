use std::sync::atomic::{AtomicU64, Ordering};

/// Request counters exposed on `/stats`.
#[derive(Debug, Default)]
pub struct Metrics {
    static_requests: AtomicU64,
    stream_requests: AtomicU64,
    font_requests: AtomicU64,
    rejected_streams: AtomicU64,
    errors: AtomicU64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub static_requests: u64,
    pub stream_requests: u64,
    pub font_requests: u64,
    pub rejected_streams: u64,
    pub errors: u64,
    pub active_streams: usize,
    pub max_streams: usize,
}

impl Metrics {
    pub fn record_static(&self) {
        self.static_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stream(&self) {
        self.stream_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_font_listing(&self) {
        self.font_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected_streams.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, active_streams: usize, max_streams: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            static_requests: self.static_requests.load(Ordering::Relaxed),
            stream_requests: self.stream_requests.load(Ordering::Relaxed),
            font_requests: self.font_requests.load(Ordering::Relaxed),
            rejected_streams: self.rejected_streams.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            active_streams,
            max_streams,
        }
    }
}
