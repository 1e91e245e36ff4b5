use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Call counter with an injectable failure flag
#[derive(Debug, Default)]
pub struct FaultSwitch {
    failing: AtomicBool,
    calls: AtomicU32,
}

impl FaultSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent calls fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }

    /// Record a call; returns `true` if it should fail
    pub fn hit(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.is_failing()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_counts_and_reports() {
        let switch = FaultSwitch::new();
        assert!(!switch.hit());
        switch.set_failing(true);
        assert!(switch.hit());
        assert_eq!(switch.calls(), 2);
    }
}
