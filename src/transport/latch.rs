//! First-writer-wins flag for warnings that should appear once per process.

use std::sync::atomic::{AtomicBool, Ordering};

/// A one-shot latch shared across workers.
#[derive(Debug)]
pub struct WarnOnce {
    fired: AtomicBool,
}

impl WarnOnce {
    /// Create an unfired latch.
    pub const fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
        }
    }

    /// Returns `true` for exactly one caller, `false` for every later one.
    pub fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::AcqRel)
    }

    /// Whether the latch has been fired.
    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

impl Default for WarnOnce {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fires_once() {
        let latch = WarnOnce::new();
        assert!(!latch.is_fired());
        assert!(latch.fire());
        assert!(!latch.fire());
        assert!(!latch.fire());
        assert!(latch.is_fired());
    }

    #[test]
    fn test_single_winner_across_threads() {
        let latch = Arc::new(WarnOnce::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let latch = Arc::clone(&latch);
                std::thread::spawn(move || latch.fire())
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(winners, 1);
    }
}
