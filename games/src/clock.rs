use std::cell::Cell;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Millisecond time source for engine ticks. Injectable so the real-time
/// games can be simulated against a fixed clock in tests.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time since the Unix epoch.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_millis() as u64
    }
}

/// Manually advanced clock for deterministic tests.
pub struct VirtualClock {
    now: Cell<u64>,
}

impl VirtualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_monotonic_enough() {
        let clock = SystemClock;
        let first = clock.now_ms();
        std::thread::sleep(Duration::from_millis(1));
        let second = clock.now_ms();
        assert!(second > first);
    }

    #[test]
    fn test_virtual_clock_advance() {
        let clock = VirtualClock::new(1000);
        assert_eq!(clock.now_ms(), 1000);
        clock.advance(150);
        assert_eq!(clock.now_ms(), 1150);
        clock.advance(0);
        assert_eq!(clock.now_ms(), 1150);
    }
}
