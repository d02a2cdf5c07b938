use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-flight gate: at most one recognition request outstanding.
///
/// Acquired on the frame-delivery thread, released on whichever thread
/// completes the request. Frames that find the gate held are dropped,
/// never queued.
#[derive(Debug, Default)]
pub struct FrameThrottle {
    in_flight: AtomicBool,
}

impl FrameThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if a request is already outstanding; otherwise marks
    /// one outstanding and returns `true`.
    pub fn try_acquire(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn is_held(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Holds the throttle until dropped.
#[derive(Debug)]
pub struct ThrottlePermit {
    throttle: Arc<FrameThrottle>,
}

impl ThrottlePermit {
    pub fn try_acquire(throttle: &Arc<FrameThrottle>) -> Option<Self> {
        throttle.try_acquire().then(|| Self {
            throttle: throttle.clone(),
        })
    }
}

impl Drop for ThrottlePermit {
    fn drop(&mut self) {
        self.throttle.release();
    }
}
