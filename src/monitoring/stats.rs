use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Debug)]
pub struct SecurityStats {
    gated_request_count: AtomicUsize,
    report_request_count: AtomicUsize,
    rate_limited_count: AtomicUsize,
    rejected_report_count: AtomicUsize,
    violation_count: AtomicUsize,
    preview_granted_count: AtomicUsize,
    preview_denied_count: AtomicUsize,
    start_time: Instant,
}

impl Default for SecurityStats {
    fn default() -> Self {
        Self {
            gated_request_count: Default::default(),
            report_request_count: Default::default(),
            rate_limited_count: Default::default(),
            rejected_report_count: Default::default(),
            violation_count: Default::default(),
            preview_granted_count: Default::default(),
            preview_denied_count: Default::default(),
            start_time: Instant::now(),
        }
    }
}

impl SecurityStats {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigational requests that received a nonce and policy headers.
    #[inline]
    pub fn gated_request_count(&self) -> usize {
        self.gated_request_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn report_request_count(&self) -> usize {
        self.report_request_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rate_limited_count(&self) -> usize {
        self.rate_limited_count.load(Ordering::Relaxed)
    }

    /// Reports dropped for size or malformed JSON.
    #[inline]
    pub fn rejected_report_count(&self) -> usize {
        self.rejected_report_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn violation_count(&self) -> usize {
        self.violation_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn preview_granted_count(&self) -> usize {
        self.preview_granted_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn preview_denied_count(&self) -> usize {
        self.preview_denied_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    #[inline]
    pub(crate) fn increment_gated_request_count(&self) {
        self.gated_request_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_report_request_count(&self) {
        self.report_request_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_rate_limited_count(&self) {
        self.rate_limited_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_rejected_report_count(&self) {
        self.rejected_report_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_violations(&self, count: usize) {
        self.violation_count.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_preview_granted_count(&self) {
        self.preview_granted_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn increment_preview_denied_count(&self) {
        self.preview_denied_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.gated_request_count.store(0, Ordering::Relaxed);
        self.report_request_count.store(0, Ordering::Relaxed);
        self.rate_limited_count.store(0, Ordering::Relaxed);
        self.rejected_report_count.store(0, Ordering::Relaxed);
        self.violation_count.store(0, Ordering::Relaxed);
        self.preview_granted_count.store(0, Ordering::Relaxed);
        self.preview_denied_count.store(0, Ordering::Relaxed);
    }
}

impl fmt::Display for SecurityStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Site Security Statistics:")?;
        writeln!(f, "  Uptime: {} seconds", self.uptime_secs())?;
        writeln!(f, "  Gated navigations: {}", self.gated_request_count())?;
        writeln!(f, "  Report requests: {}", self.report_request_count())?;
        writeln!(f, "  Reports rate limited: {}", self.rate_limited_count())?;
        writeln!(f, "  Reports rejected: {}", self.rejected_report_count())?;
        writeln!(f, "  Violations logged: {}", self.violation_count())?;
        writeln!(f, "  Preview grants: {}", self.preview_granted_count())?;
        writeln!(f, "  Preview denials: {}", self.preview_denied_count())?;
        Ok(())
    }
}
