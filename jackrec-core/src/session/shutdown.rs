use std::sync::atomic::{AtomicBool, Ordering};

/// What a stop request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRequest {
    /// Recording was running; the controller will stop at its next iteration.
    Graceful,
    /// Nothing was running (before recording, or a repeated request during
    /// teardown). The caller should exit immediately.
    Forced,
}

/// Process-wide authority for graceful versus forced termination.
///
/// Signal handlers only call [`request_stop`](Self::request_stop); the
/// controller owns every other transition.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    running: AtomicBool,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
        }
    }

    /// Called by the controller on entering the recording loop.
    pub fn begin_recording(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the recording to stop.
    pub fn request_stop(&self) -> StopRequest {
        match self
            .running
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => StopRequest::Graceful,
            Err(_) => StopRequest::Forced,
        }
    }

    /// Called by the controller on entering teardown. Any later request is forced.
    pub fn end_recording(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn request_before_recording_is_forced() {
        let shutdown = ShutdownCoordinator::new();
        assert!(!shutdown.running());
        assert_eq!(shutdown.request_stop(), StopRequest::Forced);
    }

    #[test]
    fn first_request_is_graceful_second_is_forced() {
        let shutdown = ShutdownCoordinator::new();
        shutdown.begin_recording();
        assert!(shutdown.running());

        assert_eq!(shutdown.request_stop(), StopRequest::Graceful);
        assert!(!shutdown.running());
        assert_eq!(shutdown.request_stop(), StopRequest::Forced);
    }

    #[test]
    fn request_during_teardown_is_forced() {
        let shutdown = ShutdownCoordinator::new();
        shutdown.begin_recording();
        shutdown.end_recording();
        assert_eq!(shutdown.request_stop(), StopRequest::Forced);
    }

    #[test]
    fn concurrent_requests_yield_one_graceful_stop() {
        let shutdown = Arc::new(ShutdownCoordinator::new());
        shutdown.begin_recording();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let shutdown = Arc::clone(&shutdown);
                thread::spawn(move || shutdown.request_stop())
            })
            .collect();
        let graceful = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| *r == StopRequest::Graceful)
            .count();

        assert_eq!(graceful, 1);
    }
}
