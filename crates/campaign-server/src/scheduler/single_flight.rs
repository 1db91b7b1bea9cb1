use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Tracks which trigger keys currently have a tick in progress.
#[derive(Debug, Clone, Default)]
pub struct SingleFlight {
    running: Arc<Mutex<HashSet<String>>>,
}

impl SingleFlight {
    /// Claims `key`, or returns `None` if a tick for it is still running.
    ///
    /// The claim is released when the returned guard drops.
    pub fn try_acquire(&self, key: &str) -> Option<FlightGuard> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if !running.insert(key.to_string()) {
            return None;
        }
        Some(FlightGuard {
            running: Arc::clone(&self.running),
            key: key.to_string(),
        })
    }

    #[cfg(test)]
    pub fn is_running(&self, key: &str) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

#[derive(Debug)]
pub struct FlightGuard {
    running: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_for_same_key_is_refused() {
        let flights = SingleFlight::default();
        let _guard = flights.try_acquire("standard-08").expect("first claim");
        assert!(flights.try_acquire("standard-08").is_none());
    }

    #[test]
    fn different_keys_run_independently() {
        let flights = SingleFlight::default();
        let _a = flights.try_acquire("standard-08").expect("claim a");
        assert!(flights.try_acquire("standard-09").is_some());
    }

    #[test]
    fn dropping_guard_releases_key() {
        let flights = SingleFlight::default();
        let guard = flights.try_acquire("test-interval").expect("claim");
        assert!(flights.is_running("test-interval"));
        drop(guard);
        assert!(!flights.is_running("test-interval"));
        assert!(flights.try_acquire("test-interval").is_some());
    }
}
