// src/maneuver/takeover.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Driver-takeover notification. `notify` may be called from any thread;
/// the controller consumes the flag at its next tick.
#[derive(Debug, Clone, Default)]
pub struct TakeoverHandle {
    flag: Arc<AtomicBool>,
}

impl TakeoverHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once per notification.
    pub(crate) fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_consumed_once() {
        let handle = TakeoverHandle::new();
        let remote = handle.clone();

        std::thread::spawn(move || remote.notify()).join().unwrap();

        assert!(handle.take());
        assert!(!handle.take());
    }
}
