use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Point-in-time copy of the processor counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub submitted: usize,
    pub throttled: usize,
    pub rejected: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl StatsSnapshot {
    /// Frames that reached `process()` while the processor was running.
    pub fn delivered(&self) -> usize {
        self.submitted + self.throttled + self.rejected
    }
}

/// Lock-free counters shared between the capture and completion threads.
#[derive(Debug)]
pub struct ProcessorStats {
    submitted: AtomicUsize,
    throttled: AtomicUsize,
    rejected: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    start_time: Instant,
}

impl ProcessorStats {
    pub fn new() -> Self {
        Self {
            submitted: AtomicUsize::new(0),
            throttled: AtomicUsize::new(0),
            rejected: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_throttled(&self) {
        self.throttled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            throttled: self.throttled.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    /// Returns the formatted summary, or `None` if no frame was delivered.
    pub fn summary_string(&self) -> Option<String> {
        let s = self.snapshot();
        let delivered = s.delivered();
        if delivered == 0 {
            return None;
        }

        let elapsed = self.start_time.elapsed().as_secs_f64();
        let pct = |n: usize| n as f64 / delivered as f64 * 100.0;
        let mut lines = vec![
            format!("Recognition summary ({delivered} frames, {elapsed:.1}s):"),
            format!("  submitted: {:6}  ({:4.1}%)", s.submitted, pct(s.submitted)),
            format!("  throttled: {:6}  ({:4.1}%)", s.throttled, pct(s.throttled)),
            format!("  rejected : {:6}  ({:4.1}%)", s.rejected, pct(s.rejected)),
            format!("  succeeded: {:6}", s.succeeded),
            format!("  failed   : {:6}", s.failed),
        ];
        if elapsed > 0.0 {
            let rate = (s.succeeded + s.failed) as f64 / elapsed;
            lines.push(format!("  Throughput: {rate:.1} recognitions/s"));
        }
        Some(lines.join("\n"))
    }
}

impl Default for ProcessorStats {
    fn default() -> Self {
        Self::new()
    }
}
