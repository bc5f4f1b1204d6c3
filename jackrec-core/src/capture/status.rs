use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Flags shared between the real-time callback, the server's shutdown
/// notification and the control thread.
///
/// Races on these are tolerated: the worst case is a delayed or duplicated
/// report. None of the methods block or allocate.
#[derive(Debug)]
pub struct ClientStatus {
    active: AtomicBool,
    overflowed: AtomicBool,
    faulted: AtomicBool,
    overflows: AtomicU64,
}

impl ClientStatus {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            overflowed: AtomicBool::new(false),
            faulted: AtomicBool::new(false),
            overflows: AtomicU64::new(0),
        }
    }

    /// False once the audio server has shut down or the capture path faulted.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Record that the server is going away. Returns true only for the first call.
    pub fn mark_shutdown(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    /// Set by the producer when a block is dropped.
    pub fn note_overflow(&self) {
        self.overflows.fetch_add(1, Ordering::Relaxed);
        self.overflowed.store(true, Ordering::Release);
    }

    /// Clear the overflow flag, returning whether it was set.
    pub fn take_overflow(&self) -> bool {
        self.overflowed.swap(false, Ordering::AcqRel)
    }

    /// Total blocks dropped since the client was created.
    pub fn overflow_count(&self) -> u64 {
        self.overflows.load(Ordering::Relaxed)
    }

    /// A channel accepted fewer samples than it reported room for.
    pub fn mark_fault(&self) {
        self.faulted.store(true, Ordering::Release);
        self.active.store(false, Ordering::Release);
    }

    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::Acquire)
    }
}

impl Default for ClientStatus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_is_reported_once() {
        let status = ClientStatus::new();
        assert!(status.is_active());
        assert!(status.mark_shutdown());
        assert!(!status.mark_shutdown());
        assert!(!status.is_active());
    }

    #[test]
    fn overflow_flag_is_cleared_by_take() {
        let status = ClientStatus::new();
        assert!(!status.take_overflow());

        status.note_overflow();
        status.note_overflow();
        assert!(status.take_overflow());
        assert!(!status.take_overflow());
        assert_eq!(status.overflow_count(), 2);
    }

    #[test]
    fn fault_deactivates() {
        let status = ClientStatus::new();
        status.mark_fault();
        assert!(status.is_faulted());
        assert!(!status.is_active());
    }
}
